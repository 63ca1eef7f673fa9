use crate::criteria::FilterCriteria;
use crate::error::AppError;
use crate::loader::MetadataLoader;
use crate::metadata::MediaItem;
use crate::sidecar::{CompanionFileStore, SidecarStore};
use crate::{processor, walker};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Ambient search parameters, populated once by the caller.
#[derive(Debug, Clone)]
pub struct SearchContext {
    /// Directories to scan for candidate images.
    pub directories: Vec<PathBuf>,
    /// Explicit file paths joining the scan stream.
    pub files: Vec<PathBuf>,
    /// Preferred description language; `None` means the default sidecar.
    pub language: Option<String>,
    pub recursive: bool,
    pub allowed_extensions: HashSet<String>,
    pub num_workers: usize,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            files: Vec::new(),
            language: None,
            recursive: true,
            allowed_extensions: walker::default_extensions(),
            num_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

/// The search engine: discovery, parallel load + evaluate, and
/// deduplicated result assembly.
pub struct ImageSearch {
    context: SearchContext,
    store: Arc<dyn SidecarStore>,
}

impl ImageSearch {
    /// Engine over the default companion-file sidecar store.
    pub fn new(context: SearchContext) -> Self {
        Self::with_store(context, Arc::new(CompanionFileStore))
    }

    pub fn with_store(context: SearchContext, store: Arc<dyn SidecarStore>) -> Self {
        Self { context, store }
    }

    /// Runs the search and returns the matched items, deduplicated by
    /// canonical path and sorted by path.
    pub fn run(&self, criteria: &FilterCriteria) -> Result<Vec<MediaItem>, AppError> {
        self.run_append(criteria, Vec::new())
    }

    /// Like [`run`](Self::run), but re-emits `previous` results verbatim
    /// first. The passthrough stream is not re-filtered and not
    /// deduplicated against the scan stream.
    pub fn run_append(
        &self,
        criteria: &FilterCriteria,
        previous: Vec<MediaItem>,
    ) -> Result<Vec<MediaItem>, AppError> {
        // Criteria validation errors surface before any scanning starts.
        let compiled = Arc::new(criteria.compile()?);
        let loader = Arc::new(MetadataLoader::new(
            self.store.clone(),
            self.context.language.clone(),
        ));

        let (paths_tx, paths_rx) = crossbeam_channel::unbounded();
        let (results_tx, results_rx) = crossbeam_channel::unbounded();

        let mut scanned = Vec::new();
        std::thread::scope(|scope| {
            let context = &self.context;
            scope.spawn(move || {
                if let Err(e) = walker::start_walking(
                    &context.directories,
                    &context.files,
                    context.recursive,
                    &context.allowed_extensions,
                    paths_tx,
                ) {
                    log::error!("Walker error: {}", e);
                }
            });

            let num_workers = context.num_workers;
            scope.spawn(move || {
                if let Err(e) =
                    processor::start_processing(loader, compiled, num_workers, paths_rx, results_tx)
                {
                    log::error!("Processor error: {}", e);
                }
            });

            // Single-writer collector: the seen-set is the only shared
            // mutable state, and only this loop touches it.
            let mut seen: HashSet<PathBuf> = HashSet::new();
            for item in results_rx {
                if seen.insert(item.path.clone()) {
                    scanned.push(item);
                } else {
                    log::debug!("Suppressing duplicate result: {:?}", item.path);
                }
            }
        });

        // Parallel completion order is nondeterministic; sort for a
        // stable output order.
        scanned.sort_by(|a, b| a.path.cmp(&b.path));

        let mut results = previous;
        results.extend(scanned);
        log::info!("Search complete: {} result(s).", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn duplicate_input_channels_yield_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("only.jpg");
        fs::write(&image, b"fake").unwrap();

        let context = SearchContext {
            directories: vec![dir.path().to_path_buf()],
            files: vec![image],
            ..SearchContext::default()
        };
        let results = ImageSearch::new(context)
            .run(&FilterCriteria::default())
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn append_mode_re_emits_previous_results_first() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("new.jpg");
        fs::write(&image, b"fake").unwrap();

        let earlier = MediaItem::new(PathBuf::from("/elsewhere/old.jpg"));
        let context = SearchContext {
            directories: vec![dir.path().to_path_buf()],
            ..SearchContext::default()
        };
        let results = ImageSearch::new(context)
            .run_append(&FilterCriteria::default(), vec![earlier])
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, PathBuf::from("/elsewhere/old.jpg"));
        assert!(results[1].path.ends_with("new.jpg"));
    }

    #[test]
    fn invalid_criteria_fail_before_scanning() {
        let context = SearchContext::default();
        let criteria = FilterCriteria {
            min_confidence: Some(2.0),
            ..FilterCriteria::default()
        };
        let result = ImageSearch::new(context).run(&criteria);
        assert!(matches!(result, Err(AppError::InvalidCriteria(_))));
    }

    #[test]
    fn results_are_sorted_by_path() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zebra.jpg", "apple.jpg", "mango.jpg"] {
            fs::write(dir.path().join(name), b"fake").unwrap();
        }

        let context = SearchContext {
            directories: vec![dir.path().to_path_buf()],
            ..SearchContext::default()
        };
        let results = ImageSearch::new(context)
            .run(&FilterCriteria::default())
            .unwrap();
        let names: Vec<_> = results
            .iter()
            .map(|i| i.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["apple.jpg", "mango.jpg", "zebra.jpg"]);
    }
}
