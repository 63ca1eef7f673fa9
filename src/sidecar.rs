use crate::error::AppError;
use std::path::{Path, PathBuf};

/// Sidecar metadata categories, one JSON document per category per image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Description,
    People,
    Objects,
    Scenes,
    Exif,
}

impl Category {
    pub fn file_stem(self) -> &'static str {
        match self {
            Category::Description => "description",
            Category::People => "people",
            Category::Objects => "objects",
            Category::Scenes => "scenes",
            Category::Exif => "EXIF",
        }
    }
}

/// Storage abstraction for per-image sidecar metadata, keyed by
/// `(image path, category, optional language tag)`. The filter engine
/// only talks to this trait; whether the bytes live in companion files,
/// alternate data streams or an index is up to the implementation.
pub trait SidecarStore: Send + Sync {
    /// Returns the raw JSON payload, or `Ok(None)` when the sidecar does
    /// not exist.
    fn read(
        &self,
        image: &Path,
        category: Category,
        language: Option<&str>,
    ) -> Result<Option<String>, AppError>;

    /// Overwrites the sidecar payload. Last-writer-wins; callers treat
    /// failures as non-fatal.
    fn write(
        &self,
        image: &Path,
        category: Category,
        language: Option<&str>,
        payload: &str,
    ) -> Result<(), AppError>;
}

/// Stores sidecars as `<image>.<category>[.<lang>].json` next to the image.
#[derive(Debug, Default, Clone)]
pub struct CompanionFileStore;

impl CompanionFileStore {
    fn sidecar_path(image: &Path, category: Category, language: Option<&str>) -> PathBuf {
        let mut name = image.as_os_str().to_os_string();
        name.push(".");
        name.push(category.file_stem());
        if let Some(lang) = language {
            name.push(".");
            name.push(lang);
        }
        name.push(".json");
        PathBuf::from(name)
    }
}

impl SidecarStore for CompanionFileStore {
    fn read(
        &self,
        image: &Path,
        category: Category,
        language: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        let path = Self::sidecar_path(image, category, language);
        if !path.is_file() {
            return Ok(None);
        }
        log::trace!("Reading sidecar {:?}", path);
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn write(
        &self,
        image: &Path,
        category: Category,
        language: Option<&str>,
        payload: &str,
    ) -> Result<(), AppError> {
        let path = Self::sidecar_path(image, category, language);
        log::trace!("Writing sidecar {:?}", path);
        std::fs::write(&path, payload)?;
        Ok(())
    }
}
