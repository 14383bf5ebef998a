pub mod face_quality_assessor;
pub mod image_metrics;
pub mod quality_assessment;
