pub mod image_file_loader;
pub mod sequential_extraction_executor;
pub mod threaded_extraction_executor;
