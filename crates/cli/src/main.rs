use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use facegroup_core::detection::infrastructure::precomputed_face_detector::PrecomputedFaceDetector;
use facegroup_core::pipeline::batch_logger::LogBatchLogger;
use facegroup_core::pipeline::config::GroupingConfig;
use facegroup_core::pipeline::extraction_executor::ExtractionExecutor;
use facegroup_core::pipeline::group_batch_use_case::{GroupBatchUseCase, GroupingReport};
use facegroup_core::pipeline::infrastructure::image_file_loader::ImageFileLoader;
use facegroup_core::pipeline::infrastructure::sequential_extraction_executor::SequentialExtractionExecutor;
use facegroup_core::pipeline::infrastructure::threaded_extraction_executor::ThreadedExtractionExecutor;
use facegroup_core::shared::constants::{DEFAULT_SIMILARITY_THRESHOLD, IMAGE_EXTENSIONS};
use facegroup_core::store::feature_snapshot::FeatureSnapshot;
use facegroup_core::store::feature_store::FeatureStore;

/// Group photos by the people in them.
///
/// Image ids are the image paths as given on the command line (or found
/// inside a directory); the detections file must use the same keys.
#[derive(Parser)]
#[command(name = "facegroup")]
struct Cli {
    /// Image files or directories of images.
    inputs: Vec<PathBuf>,

    /// JSON file mapping image ids to detector output.
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Similarity threshold (0.0-1.0), used as the clustering radius when
    /// the adaptive search is off.
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    threshold: f64,

    /// JSON config file (defaults to FaceGroup/config.json in the user
    /// config directory when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum quality score for a face to be clustered (0.0-1.0).
    #[arg(long)]
    quality_threshold: Option<f64>,

    /// Minimum face width and height in pixels.
    #[arg(long)]
    min_face_size: Option<i32>,

    /// Number of clusters the radius search aims for.
    #[arg(long)]
    target_clusters: Option<usize>,

    /// Minimum neighborhood size for a core face.
    #[arg(long)]
    min_samples: Option<usize>,

    #[arg(long)]
    radius_min: Option<f64>,

    #[arg(long)]
    radius_max: Option<f64>,

    #[arg(long)]
    radius_steps: Option<usize>,

    /// Cluster once at 1 - threshold instead of searching the radius.
    #[arg(long)]
    no_adaptive: bool,

    /// Never build the similarity index, even for large batches.
    #[arg(long)]
    no_index: bool,

    /// Extraction worker threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Keep only the first N detections of each image.
    #[arg(long)]
    max_faces: Option<usize>,

    /// Write the accumulated faces to this snapshot file.
    #[arg(long)]
    save_snapshot: Option<PathBuf>,

    /// Regroup faces from a snapshot instead of extracting them.
    #[arg(long)]
    restore: Option<PathBuf>,

    /// Write the groups to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&cli, &mut config);
    config.validate()?;

    let image_ids = collect_images(&cli.inputs)?;
    log::info!("Found {} images", image_ids.len());

    let report = match &cli.restore {
        Some(snapshot_path) => {
            let snapshot = FeatureSnapshot::load(snapshot_path)?;
            let store = FeatureStore::restore(snapshot, config.index.clone())?;
            let detector = PrecomputedFaceDetector::new(Arc::default());
            build_use_case(detector, config).group_store(store, &image_ids, cli.threshold)?
        }
        None => {
            let path = cli
                .detections
                .as_deref()
                .ok_or("--detections is required unless --restore is used")?;
            let detector = PrecomputedFaceDetector::from_json_file(path)?;
            build_use_case(detector, config).execute(&image_ids, cli.threshold)?
        }
    };

    if let Some(path) = &cli.save_snapshot {
        report.store.snapshot().save(path)?;
    }

    let json = serde_json::to_string_pretty(&render(&report))?;
    match &cli.output {
        Some(path) => {
            fs::write(path, json)?;
            log::info!("Wrote {} groups to {}", report.groups.len(), path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn build_use_case(detector: PrecomputedFaceDetector, config: GroupingConfig) -> GroupBatchUseCase {
    let executor: Box<dyn ExtractionExecutor> = if config.workers > 1 {
        Box::new(ThreadedExtractionExecutor::new(config.workers))
    } else {
        Box::new(SequentialExtractionExecutor)
    };
    GroupBatchUseCase::new(
        Arc::new(ImageFileLoader::new()),
        Arc::new(detector),
        executor,
        config,
        Box::new(LogBatchLogger::default()),
    )
}

fn render(report: &GroupingReport) -> serde_json::Value {
    let skipped: Vec<String> = report.skipped.iter().map(|e| e.to_string()).collect();
    serde_json::json!({
        "groups": report.groups,
        "skipped": skipped,
        "faces_accepted": report.faces_accepted,
        "faces_rejected": report.faces_rejected,
        "radius": report.radius,
        "sweep": report.sweep,
    })
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("FaceGroup").join("config.json"))
}

fn load_config(explicit: Option<&Path>) -> Result<GroupingConfig, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        return Ok(GroupingConfig::load(path)?);
    }
    match config_path().filter(|p| p.exists()) {
        Some(path) => {
            log::info!("Using config {}", path.display());
            Ok(GroupingConfig::load(&path)?)
        }
        None => Ok(GroupingConfig::default()),
    }
}

fn apply_overrides(cli: &Cli, config: &mut GroupingConfig) {
    if let Some(v) = cli.quality_threshold {
        config.quality.acceptance_threshold = v;
    }
    if let Some(v) = cli.min_face_size {
        config.quality.min_face_size = v;
    }
    if let Some(v) = cli.target_clusters {
        config.clustering.target_clusters = v;
    }
    if let Some(v) = cli.min_samples {
        config.clustering.min_samples = v;
    }
    if let Some(v) = cli.radius_min {
        config.clustering.radius_min = v;
    }
    if let Some(v) = cli.radius_max {
        config.clustering.radius_max = v;
    }
    if let Some(v) = cli.radius_steps {
        config.clustering.radius_steps = v;
    }
    if cli.no_adaptive {
        config.clustering.adaptive = false;
    }
    if cli.no_index {
        config.index.enabled = false;
    }
    if let Some(v) = cli.workers {
        config.workers = v;
    }
    if cli.max_faces.is_some() {
        config.max_faces_per_image = cli.max_faces;
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&cli.threshold) {
        return Err(format!("Threshold must be between 0.0 and 1.0, got {}", cli.threshold).into());
    }
    if cli.restore.is_none() && cli.inputs.is_empty() {
        return Err("At least one input image or directory is required".into());
    }
    for input in &cli.inputs {
        if !input.exists() {
            return Err(format!("Input not found: {}", input.display()).into());
        }
    }
    if let Some(path) = &cli.detections {
        if !path.is_file() {
            return Err(format!("Detections file not found: {}", path.display()).into());
        }
    }
    Ok(())
}

/// Expands directories into their image files (sorted, non-recursive);
/// files are taken as given.
fn collect_images(inputs: &[PathBuf]) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut ids = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_image(path))
                .collect();
            found.sort();
            ids.extend(found.iter().map(|p| p.to_string_lossy().into_owned()));
        } else {
            ids.push(input.to_string_lossy().into_owned());
        }
    }
    Ok(ids)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
