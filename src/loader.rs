use crate::error::AppError;
use crate::exif;
use crate::metadata::{ExifInfo, MediaItem, ObjectsInfo, PeopleInfo, SceneInfo};
use crate::sidecar::{Category, SidecarStore};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Loads best-effort metadata for one image file. Each sidecar category
/// is read independently; a missing or malformed sidecar degrades to the
/// category default and never fails the item.
pub struct MetadataLoader {
    store: Arc<dyn SidecarStore>,
    language: Option<String>,
}

impl MetadataLoader {
    pub fn new(store: Arc<dyn SidecarStore>, language: Option<String>) -> Self {
        Self { store, language }
    }

    /// Builds a [`MediaItem`] for `path`. Only an unreachable path is an
    /// error; the item is then skipped, not the run.
    pub fn load(&self, path: &Path) -> Result<MediaItem, AppError> {
        // Canonical path doubles as the deduplication key downstream.
        let canonical = path.canonicalize()?;
        log::trace!("Loading metadata for {:?}", canonical);
        let mut item = MediaItem::new(canonical);

        item.description = self.load_description(&item.path);
        item.people = self
            .read_category::<PeopleInfo>(&item.path, Category::People)
            .unwrap_or_default();
        item.objects = self
            .read_category::<ObjectsInfo>(&item.path, Category::Objects)
            .unwrap_or_default();
        item.scenes = self
            .read_category::<SceneInfo>(&item.path, Category::Scenes)
            .unwrap_or_default();
        item.exif = self.load_exif(&item.path);

        match &item.exif {
            Some(exif) => {
                item.width = exif.basic.width;
                item.height = exif.basic.height;
            }
            None => {
                // Extraction failed entirely; a plain header decode may
                // still give us dimensions.
                if let Ok((width, height)) = image::image_dimensions(&item.path) {
                    item.width = Some(width);
                    item.height = Some(height);
                }
            }
        }

        Ok(item)
    }

    /// Language-suffixed description sidecar first, default-language
    /// sidecar as fallback, `None` when neither exists.
    fn load_description(&self, path: &Path) -> Option<crate::metadata::ImageDescription> {
        if let Some(lang) = self.language.as_deref() {
            if let Some(desc) = self.read_json(path, Category::Description, Some(lang)) {
                return Some(desc);
            }
            log::debug!(
                "No {:?} description sidecar for {:?}, falling back to default",
                lang,
                path
            );
        }
        self.read_json(path, Category::Description, None)
    }

    /// EXIF comes from the cache sidecar when parseable, else fresh
    /// extraction with a best-effort cache write-back.
    fn load_exif(&self, path: &Path) -> Option<ExifInfo> {
        if let Some(cached) = self.read_json::<ExifInfo>(path, Category::Exif, None) {
            return Some(cached);
        }

        match exif::extract(path) {
            Ok(info) => {
                match serde_json::to_string(&info) {
                    Ok(payload) => {
                        if let Err(e) = self.store.write(path, Category::Exif, None, &payload) {
                            log::debug!("Could not write EXIF cache for {:?}: {}", path, e);
                        }
                    }
                    Err(e) => log::debug!("Could not serialize EXIF cache for {:?}: {}", path, e),
                }
                Some(info)
            }
            Err(e) => {
                log::warn!("EXIF extraction failed for {:?}: {}", path, e);
                None
            }
        }
    }

    fn read_category<T: DeserializeOwned>(&self, path: &Path, category: Category) -> Option<T> {
        self.read_json(path, category, None)
    }

    fn read_json<T: DeserializeOwned>(
        &self,
        path: &Path,
        category: Category,
        language: Option<&str>,
    ) -> Option<T> {
        match self.store.read(path, category, language) {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::debug!(
                        "Malformed {} sidecar for {:?}: {}",
                        category.file_stem(),
                        path,
                        e
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!(
                    "Could not read {} sidecar for {:?}: {}",
                    category.file_stem(),
                    path,
                    e
                );
                None
            }
        }
    }
}
