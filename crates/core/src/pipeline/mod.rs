pub mod batch_logger;
pub mod config;
pub mod extraction_executor;
pub mod group_batch_use_case;
pub mod image_loader;
pub mod infrastructure;
