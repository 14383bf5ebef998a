use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::clustering::adaptive_clusterer::{AdaptiveClusterer, SweepStep};
use crate::detection::domain::face_detector::FaceDetector;
use crate::grouping::group::Group;
use crate::grouping::group_assembler::GroupAssembler;
use crate::pipeline::batch_logger::BatchLogger;
use crate::pipeline::config::GroupingConfig;
use crate::pipeline::extraction_executor::{ExtractionExecutor, ImageFaces};
use crate::pipeline::image_loader::ImageLoader;
use crate::quality::face_quality_assessor::FaceQualityAssessor;
use crate::shared::error::GroupingError;
use crate::store::feature_store::FeatureStore;
use crate::store::similarity_index::IndexKind;

/// Everything a grouping request produced.
pub struct GroupingReport {
    pub groups: Vec<Group>,
    /// Images that failed to load or detect, in batch order.
    pub skipped: Vec<GroupingError>,
    pub faces_accepted: usize,
    pub faces_rejected: usize,
    /// Radius of the final clustering pass, `None` when nothing was clustered.
    pub radius: Option<f64>,
    pub sweep: Vec<SweepStep>,
    pub index: Option<IndexKind>,
    /// The request's store, handed back so the caller can snapshot it.
    pub store: FeatureStore,
}

/// Groups a batch of images by the people in them:
/// extract → assess → accumulate → cluster → assemble.
///
/// Every call works on a fresh [`FeatureStore`]; nothing accumulates across
/// requests.
pub struct GroupBatchUseCase {
    loader: Arc<dyn ImageLoader>,
    detector: Arc<dyn FaceDetector>,
    executor: Box<dyn ExtractionExecutor>,
    assessor: FaceQualityAssessor,
    clusterer: AdaptiveClusterer,
    config: GroupingConfig,
    logger: Box<dyn BatchLogger>,
    cancelled: Arc<AtomicBool>,
}

impl GroupBatchUseCase {
    pub fn new(
        loader: Arc<dyn ImageLoader>,
        detector: Arc<dyn FaceDetector>,
        executor: Box<dyn ExtractionExecutor>,
        config: GroupingConfig,
        logger: Box<dyn BatchLogger>,
    ) -> Self {
        Self {
            loader,
            detector,
            executor,
            assessor: FaceQualityAssessor::new(config.quality.clone()),
            clusterer: AdaptiveClusterer::new(config.clustering.clone()),
            config,
            logger,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that aborts the running request when set. Partial work is
    /// dropped and the request returns [`GroupingError::Cancelled`]. The
    /// flag is cleared when the request returns, so it never carries over
    /// to the next one.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Groups `image_ids`.
    ///
    /// `similarity_threshold` only sets the clustering radius
    /// (`1 - threshold`) when the adaptive search is disabled. Images that
    /// fail to load or detect are reported in `skipped` and land in the
    /// residual group; embedding inconsistencies fail the whole request.
    pub fn execute(
        &mut self,
        image_ids: &[String],
        similarity_threshold: f64,
    ) -> Result<GroupingReport, GroupingError> {
        self.logger.begin();
        let result = self.group_batch(image_ids, similarity_threshold);
        self.cancelled.store(false, Ordering::Relaxed);
        result
    }

    /// Clusters an already populated store, e.g. one restored from a
    /// snapshot, without running extraction.
    ///
    /// `image_ids` lists images that should appear in the result even if
    /// they contributed no face.
    pub fn group_store(
        &mut self,
        store: FeatureStore,
        image_ids: &[String],
        similarity_threshold: f64,
    ) -> Result<GroupingReport, GroupingError> {
        self.logger.begin();
        let result = self.cluster_store(store, image_ids, similarity_threshold);
        self.cancelled.store(false, Ordering::Relaxed);
        let report = result?;
        self.logger.summary();
        Ok(report)
    }

    fn group_batch(
        &mut self,
        image_ids: &[String],
        similarity_threshold: f64,
    ) -> Result<GroupingReport, GroupingError> {
        let mut store = FeatureStore::new(self.config.index.clone());
        if image_ids.is_empty() {
            return Ok(GroupingReport::empty(store));
        }

        let started = Instant::now();
        let mut extracted = self.extract(image_ids);
        self.check_cancelled()?;
        extracted.sort_by_key(|(position, _)| *position);

        let mut skipped = Vec::new();
        let mut faces_rejected = 0;
        for (_, result) in extracted {
            match result {
                Ok(faces) => {
                    faces_rejected += faces.rejected;
                    for (detection, assessment) in &faces.accepted {
                        store.add_face(detection, assessment, faces.image_id.as_str());
                    }
                }
                Err(e) => {
                    log::warn!("Skipping image: {e}");
                    skipped.push(e);
                }
            }
        }
        self.logger.timing("extract", elapsed_ms(started));
        self.logger.info(&format!(
            "Accepted {} faces, rejected {faces_rejected}, skipped {} images",
            store.len(),
            skipped.len()
        ));

        let mut report = self.cluster_store(store, image_ids, similarity_threshold)?;
        report.skipped = skipped;
        report.faces_rejected = faces_rejected;
        self.logger.metric("faces_rejected", faces_rejected as f64);
        self.logger.metric("images_skipped", report.skipped.len() as f64);
        self.logger.summary();
        Ok(report)
    }

    fn extract(&mut self, image_ids: &[String]) -> Vec<(usize, Result<ImageFaces, GroupingError>)> {
        let loader = &*self.loader;
        let detector = &*self.detector;
        let assessor = &self.assessor;
        let max_faces = self.config.max_faces_per_image;
        let logger = &mut self.logger;

        let job = move |image_id: &str| {
            extract_faces(loader, detector, assessor, max_faces, image_id)
        };
        self.executor.run(
            image_ids,
            &job,
            &self.cancelled,
            &mut |done, total| logger.progress(done, total),
        )
    }

    fn cluster_store(
        &mut self,
        mut store: FeatureStore,
        image_ids: &[String],
        similarity_threshold: f64,
    ) -> Result<GroupingReport, GroupingError> {
        self.check_cancelled()?;
        let faces_accepted = store.len();
        self.logger.metric("faces_accepted", faces_accepted as f64);

        let started = Instant::now();
        let index = if store.len() > self.clusterer.config().exact_pair_limit {
            store.build_index()?
        } else {
            None
        };
        self.logger.timing("index", elapsed_ms(started));

        let started = Instant::now();
        let fixed_radius = (1.0 - similarity_threshold).max(0.0);
        let outcome = self
            .clusterer
            .cluster(store.records(), fixed_radius, store.index())?;
        self.logger.timing("cluster", elapsed_ms(started));
        self.check_cancelled()?;

        let started = Instant::now();
        let groups = GroupAssembler::assemble(
            store.records(),
            &outcome.labeling,
            &outcome.similarity,
            image_ids,
        );
        self.logger.timing("assemble", elapsed_ms(started));
        self.logger
            .metric("clusters", outcome.labeling.cluster_count() as f64);
        self.logger
            .metric("noise_faces", outcome.labeling.noise_count() as f64);

        Ok(GroupingReport {
            groups,
            skipped: Vec::new(),
            faces_accepted,
            faces_rejected: 0,
            radius: (faces_accepted > 0).then_some(outcome.radius),
            sweep: outcome.sweep,
            index,
            store,
        })
    }

    fn check_cancelled(&self) -> Result<(), GroupingError> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(GroupingError::Cancelled);
        }
        Ok(())
    }
}

impl GroupingReport {
    fn empty(store: FeatureStore) -> Self {
        Self {
            groups: Vec::new(),
            skipped: Vec::new(),
            faces_accepted: 0,
            faces_rejected: 0,
            radius: None,
            sweep: Vec::new(),
            index: None,
            store,
        }
    }
}

/// Load, detect and quality-gate the faces of one image.
fn extract_faces(
    loader: &dyn ImageLoader,
    detector: &dyn FaceDetector,
    assessor: &FaceQualityAssessor,
    max_faces: Option<usize>,
    image_id: &str,
) -> Result<ImageFaces, GroupingError> {
    let frame = loader
        .load(image_id)
        .map_err(|e| GroupingError::InvalidImage {
            image_id: image_id.to_string(),
            reason: e.to_string(),
        })?;
    let mut detections = detector
        .detect(&frame)
        .map_err(|e| GroupingError::ModelUnavailable {
            image_id: image_id.to_string(),
            reason: e.to_string(),
        })?;
    if let Some(max) = max_faces {
        detections.truncate(max);
    }

    let mut accepted = Vec::with_capacity(detections.len());
    let mut rejected = 0;
    for detection in detections {
        let (ok, assessment) = assessor.accept(&frame, &detection);
        if ok {
            accepted.push((detection, assessment));
        } else {
            log::debug!(
                "Rejected face in {image_id}: score {:.3} {:?}",
                assessment.score(),
                assessment.issues()
            );
            rejected += 1;
        }
    }

    Ok(ImageFaces {
        image_id: image_id.to_string(),
        accepted,
        rejected,
    })
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
