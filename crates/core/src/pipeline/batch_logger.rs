use std::collections::HashMap;
use std::time::Instant;

/// Observer for grouping-request events.
///
/// Keeps the use case free of any particular output mechanism; the CLI logs,
/// tests discard.
pub trait BatchLogger: Send {
    /// A new request starts; anything recorded for the previous one is
    /// discarded. Default: no-op.
    fn begin(&mut self) {}

    /// Images processed so far during extraction.
    fn progress(&mut self, done: usize, total: usize);

    /// Wall time of one stage (`extract`, `index`, `cluster`, `assemble`).
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Point-in-time count such as accepted faces or clusters.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-request report. Default: no-op.
    fn summary(&self) {}
}

pub struct NullBatchLogger;

impl BatchLogger for NullBatchLogger {
    fn progress(&mut self, _done: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger backed by the `log` facade.
///
/// Progress is reported every `throttle_images` images and once more at the
/// end; stage timings and metrics are aggregated for [`BatchLogger::summary`].
pub struct LogBatchLogger {
    throttle_images: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, f64>,
    started: Instant,
    total_images: usize,
}

impl LogBatchLogger {
    pub fn new(throttle_images: usize) -> Self {
        Self {
            throttle_images: throttle_images.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            started: Instant::now(),
            total_images: 0,
        }
    }

    /// Formatted report, `None` until something was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let images = self.total_images;
        let mut lines = vec![format!(
            "Grouping summary ({images} images, {:.2}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.iter().collect();
        stages.sort_by(|a, b| a.0.cmp(b.0));
        for (stage, durations) in stages {
            let total_ms: f64 = durations.iter().sum();
            lines.push(format!("  {stage:10}: {total_ms:8.1}ms"));
        }

        let mut metrics: Vec<_> = self.metrics.iter().collect();
        metrics.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in metrics {
            lines.push(format!("  {name}: {value}"));
        }

        if images > 0 && elapsed_ms > 0.0 {
            let rate = images as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {rate:.1} images/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    /// Last value recorded under `name`.
    pub fn metric_value(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

impl Default for LogBatchLogger {
    fn default() -> Self {
        Self::new(25)
    }
}

impl BatchLogger for LogBatchLogger {
    fn begin(&mut self) {
        self.timings.clear();
        self.metrics.clear();
        self.started = Instant::now();
        self.total_images = 0;
    }

    fn progress(&mut self, done: usize, total: usize) {
        self.total_images = total;
        if total > 0 && (done % self.throttle_images == 0 || done == total) {
            let pct = done as f64 / total as f64 * 100.0;
            log::info!("Extracting faces: {done}/{total} images ({pct:.0}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.insert(name.to_string(), value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullBatchLogger;
        logger.progress(1, 10);
        logger.timing("extract", 5.0);
        logger.metric("faces_accepted", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timings_accumulate_per_stage() {
        let mut logger = LogBatchLogger::new(10);
        logger.timing("cluster", 20.0);
        logger.timing("cluster", 30.0);
        logger.timing("assemble", 5.0);

        assert_eq!(logger.timings_for("cluster"), Some(&[20.0, 30.0][..]));
        assert_eq!(logger.timings_for("assemble"), Some(&[5.0][..]));
        assert_eq!(logger.timings_for("index"), None);
    }

    #[test]
    fn test_metric_keeps_latest_value() {
        let mut logger = LogBatchLogger::new(10);
        logger.metric("clusters", 2.0);
        logger.metric("clusters", 3.0);
        assert_relative_eq!(logger.metric_value("clusters").unwrap(), 3.0);
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = LogBatchLogger::new(10);
        logger.progress(4, 4);
        logger.timing("extract", 12.0);
        logger.metric("faces_accepted", 7.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Grouping summary (4 images"));
        assert!(summary.contains("extract"));
        assert!(summary.contains("faces_accepted: 7"));
    }

    #[test]
    fn test_begin_discards_previous_request() {
        let mut logger = LogBatchLogger::new(10);
        logger.progress(8, 8);
        logger.timing("extract", 40.0);
        logger.metric("clusters", 3.0);

        logger.begin();
        logger.progress(2, 2);
        logger.timing("extract", 5.0);

        assert_eq!(logger.timings_for("extract"), Some(&[5.0][..]));
        assert_eq!(logger.metric_value("clusters"), None);
        assert!(logger
            .summary_string()
            .unwrap()
            .contains("Grouping summary (2 images"));
    }

    #[test]
    fn test_empty_summary_is_none() {
        assert!(LogBatchLogger::default().summary_string().is_none());
    }

    #[test]
    fn test_zero_throttle_is_clamped() {
        let logger = LogBatchLogger::new(0);
        assert_eq!(logger.throttle_images, 1);
    }
}
