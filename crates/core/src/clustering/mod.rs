pub mod adaptive_clusterer;
pub mod cluster_labeling;
pub mod dbscan;
pub mod distance_matrix;
pub mod neighborhood;
pub mod similarity_matrix;
