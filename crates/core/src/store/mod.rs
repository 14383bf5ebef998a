pub mod face_record;
pub mod feature_snapshot;
pub mod feature_store;
pub mod flat_index;
pub mod partitioned_index;
pub mod similarity_index;
