use std::sync::atomic::{AtomicBool, Ordering};

use crate::pipeline::extraction_executor::{ExtractionExecutor, ExtractionJob, ExtractionResult};

const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Fans extraction jobs out to a fixed pool of worker threads and gathers
/// the results on the calling thread.
///
/// Layout: `feeder → [worker × N] → caller`
pub struct ThreadedExtractionExecutor {
    workers: usize,
    channel_capacity: usize,
}

impl ThreadedExtractionExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ExtractionExecutor for ThreadedExtractionExecutor {
    fn run(
        &self,
        image_ids: &[String],
        job: &ExtractionJob<'_>,
        cancelled: &AtomicBool,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Vec<ExtractionResult> {
        let total = image_ids.len();
        if total == 0 {
            return Vec::new();
        }
        let workers = self.workers.min(total);

        let (work_tx, work_rx) = crossbeam_channel::bounded::<usize>(self.channel_capacity);
        let (result_tx, result_rx) =
            crossbeam_channel::bounded::<ExtractionResult>(self.channel_capacity);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for position in work_rx {
                        if cancelled.load(Ordering::Relaxed) {
                            break;
                        }
                        let result = job(&image_ids[position]);
                        if result_tx.send((position, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(work_rx);
            drop(result_tx);

            scope.spawn(move || {
                for position in 0..total {
                    if cancelled.load(Ordering::Relaxed) || work_tx.send(position).is_err() {
                        break;
                    }
                }
            });

            let mut results = Vec::with_capacity(total);
            for result in result_rx {
                results.push(result);
                progress(results.len(), total);
            }
            results
        })
    }
}
