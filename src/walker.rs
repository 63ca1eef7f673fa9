use crate::error::AppError;
use std::collections::HashSet;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Streams candidate image paths from the input directories and explicit
/// file arguments into the processing channel. Missing inputs log a
/// warning and are skipped; they never abort the run.
pub fn start_walking(
    directories: &[PathBuf],
    files: &[PathBuf],
    recursive: bool,
    allowed_extensions: &HashSet<String>,
    paths_tx: crossbeam_channel::Sender<PathBuf>,
) -> Result<(), AppError> {
    for file in files {
        if file.is_file() {
            log::debug!("Sending explicit file to processor: {:?}", file);
            paths_tx.send(file.clone())?;
        } else {
            log::warn!("Input file does not exist, skipping: {:?}", file);
        }
    }

    for directory in directories {
        if !directory.is_dir() {
            log::warn!("Input directory does not exist, skipping: {:?}", directory);
            continue;
        }
        log::info!("Starting file discovery in {:?}", directory);

        let walker = if recursive {
            WalkDir::new(directory)
        } else {
            WalkDir::new(directory).max_depth(1)
        };

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                let path = entry.path();
                log::trace!("Discovered file: {:?}", path);
                if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
                    if allowed_extensions.contains(&ext.to_lowercase()) {
                        log::debug!("Sending image file to processor: {:?}", path);
                        paths_tx.send(path.to_path_buf())?;
                    } else {
                        log::trace!("Skipping file due to unsupported extension: {:?}", path);
                    }
                } else {
                    log::trace!("Skipping file with no extension: {:?}", path);
                }
            }
        }
    }

    log::info!("File discovery complete.");
    Ok(())
}

/// Extensions scanned when the caller does not configure their own set.
pub fn default_extensions() -> HashSet<String> {
    ["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn collect(
        directories: &[PathBuf],
        files: &[PathBuf],
        recursive: bool,
    ) -> Vec<PathBuf> {
        let (tx, rx) = crossbeam_channel::unbounded();
        start_walking(directories, files, recursive, &default_extensions(), tx).unwrap();
        rx.into_iter().collect()
    }

    #[test]
    fn walks_only_allowed_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        fs::write(dir.path().join("b.txt"), b"x").unwrap();
        fs::write(dir.path().join("c.PNG"), b"x").unwrap();

        let mut found = collect(&[dir.path().to_path_buf()], &[], true);
        found.sort();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "c.PNG"]);
    }

    #[test]
    fn non_recursive_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("top.jpg"), b"x").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("nested.jpg"), b"x").unwrap();

        let found = collect(&[dir.path().to_path_buf()], &[], false);
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("top.jpg"));

        let found = collect(&[dir.path().to_path_buf()], &[], true);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn missing_directory_is_skipped_not_fatal() {
        let found = collect(&[PathBuf::from("/no/such/directory")], &[], true);
        assert!(found.is_empty());
    }

    #[test]
    fn explicit_files_bypass_the_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join("raw.dng");
        fs::write(&odd, b"x").unwrap();

        let found = collect(&[], &[odd.clone(), PathBuf::from("/missing.jpg")], true);
        assert_eq!(found, vec![odd]);
    }
}
