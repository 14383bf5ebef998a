pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Caller similarity threshold used when none is supplied.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.55;

/// Faces narrower or shorter than this (pixels) are penalized as too small.
pub const MIN_FACE_SIZE: i32 = 80;
/// Laplacian variance below which a face crop counts as blurry.
pub const BLUR_THRESHOLD: f64 = 100.0;
pub const MIN_BRIGHTNESS: f64 = 40.0;
pub const MAX_BRIGHTNESS: f64 = 220.0;
/// Eye-line angle (degrees) above which a face counts as tilted.
pub const MAX_TILT_DEGREES: f64 = 20.0;
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.6;

pub const SMALL_FACE_PENALTY: f64 = 0.5;
pub const BLUR_PENALTY: f64 = 0.7;
pub const LIGHTING_PENALTY: f64 = 0.8;
pub const TILT_PENALTY: f64 = 0.9;

/// Typical number of distinct people in a personal photo batch.
pub const DEFAULT_TARGET_CLUSTERS: usize = 8;
pub const DEFAULT_RADIUS_MIN: f64 = 0.3;
pub const DEFAULT_RADIUS_MAX: f64 = 0.8;
pub const DEFAULT_RADIUS_STEPS: usize = 10;
pub const DEFAULT_MIN_SAMPLES: usize = 3;
/// Above this many faces, neighborhoods come from the similarity index
/// instead of the full pairwise matrix.
pub const DEFAULT_EXACT_PAIR_LIMIT: usize = 4096;
pub const DEFAULT_CANDIDATE_NEIGHBORS: usize = 32;

/// Stores smaller than this use the exact index.
pub const EXACT_INDEX_CUTOFF: usize = 10;
pub const RECORDS_PER_PARTITION: usize = 10;
pub const MAX_PARTITIONS: usize = 100;
pub const INDEX_TRAINING_ITERATIONS: usize = 20;
pub const INDEX_TRAINING_SEED: u64 = 42;
pub const INDEX_PROBES: usize = 8;

/// Quality recorded for snapshot entries that predate quality scoring.
pub const LEGACY_QUALITY_SCORE: f64 = 1.0;
