use crate::criteria::CompiledCriteria;
use crate::error::AppError;
use crate::loader::MetadataLoader;
use crate::matcher;
use crate::metadata::MediaItem;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Drains the candidate channel, then loads and evaluates every candidate
/// on a bounded worker pool. Matches go to the collector channel; per-item
/// failures are logged and skipped.
pub fn start_processing(
    loader: Arc<MetadataLoader>,
    criteria: Arc<CompiledCriteria>,
    num_workers: usize,
    paths_rx: crossbeam_channel::Receiver<PathBuf>,
    results_tx: crossbeam_channel::Sender<MediaItem>,
) -> Result<(), AppError> {
    log::info!("Starting evaluation with {} workers", num_workers);

    let paths: Vec<PathBuf> = paths_rx.iter().collect();
    log::info!("Received {} candidate files for evaluation.", paths.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_workers)
        .build()?;

    pool.install(|| {
        paths.into_par_iter().try_for_each(|path| {
            match loader.load(&path) {
                Ok(mut item) => {
                    if matcher::evaluate(&mut item, &criteria) {
                        log::debug!("Matched {:?}", item.path);
                        results_tx.send(item)?;
                    } else {
                        log::trace!("No match for {:?}", path);
                    }
                    Ok::<(), AppError>(())
                }
                Err(e) => {
                    log::warn!("Failed to load {:?}: {}", path, e);
                    // Continue with the remaining candidates.
                    Ok::<(), AppError>(())
                }
            }
        })
    })?;

    log::info!("All candidates evaluated.");
    Ok(())
}
