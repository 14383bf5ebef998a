pub mod clustering;
pub mod detection;
pub mod grouping;
pub mod pipeline;
pub mod quality;
pub mod shared;
pub mod store;
