//! Image metadata search engine.
//!
//! Scans directories for images, loads per-image sidecar JSON metadata
//! (description, people, objects, scenes, EXIF) through a pluggable
//! [`sidecar::SidecarStore`], evaluates multi-criteria AND/OR filters
//! (keyword wildcards, detection labels, confidence thresholds, EXIF
//! ranges, GPS proximity) and returns a deduplicated, ordered result set.

pub mod config;
pub mod criteria;
pub mod error;
pub mod exif;
pub mod geo;
pub mod loader;
pub mod matcher;
pub mod metadata;
pub mod processor;
pub mod search;
pub mod sidecar;
pub mod walker;

pub use crate::criteria::{FilterCriteria, GeoPoint, RangeFilter};
pub use crate::error::AppError;
pub use crate::metadata::MediaItem;
pub use crate::search::{ImageSearch, SearchContext};
