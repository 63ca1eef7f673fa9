// src/metadata.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Scene label assigned when classification failed or never ran.
pub const UNKNOWN_SCENE: &str = "unknown";

/// One discovered image file with its best-effort sidecar metadata.
///
/// Field names serialize in PascalCase because the sidecar JSON format
/// (produced by the external description/detection services) uses it.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct MediaItem {
    pub path: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub description: Option<ImageDescription>,
    #[serde(default)]
    pub people: PeopleInfo,
    #[serde(default)]
    pub objects: ObjectsInfo,
    #[serde(default)]
    pub scenes: SceneInfo,
    pub exif: Option<ExifInfo>,
}

impl MediaItem {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            width: None,
            height: None,
            description: None,
            people: PeopleInfo::default(),
            objects: ObjectsInfo::default(),
            scenes: SceneInfo::default(),
            exif: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct ImageDescription {
    pub short_description: String,
    pub long_description: String,
    pub keywords: Vec<String>,
    pub picture_type: String,
    pub style_type: String,
    pub overall_mood: String,
    pub has_nudity: bool,
    pub has_explicit_content: bool,
}

/// A labeled detection with model confidence in [0, 1].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct PeopleInfo {
    pub count: u32,
    pub faces: Vec<String>,
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct ObjectsInfo {
    pub count: u32,
    pub objects: Vec<Prediction>,
    pub object_counts: BTreeMap<String, u32>,
}

impl ObjectsInfo {
    /// Recomputes `count` and `object_counts` from the `objects` list.
    pub fn recount(&mut self) {
        self.count = self.objects.len() as u32;
        self.object_counts.clear();
        for det in &self.objects {
            *self.object_counts.entry(det.label.clone()).or_insert(0) += 1;
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct SceneInfo {
    pub success: bool,
    pub scene: String,
    pub confidence: f64,
}

impl Default for SceneInfo {
    fn default() -> Self {
        Self {
            success: false,
            scene: UNKNOWN_SCENE.to_string(),
            confidence: 0.0,
        }
    }
}

impl SceneInfo {
    pub fn is_unknown(&self) -> bool {
        self.scene.eq_ignore_ascii_case(UNKNOWN_SCENE)
    }
}

/// Cached or freshly extracted EXIF record.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExifInfo {
    pub basic: BasicFileInfo,
    pub camera: CameraInfo,
    #[serde(rename = "GPS")]
    pub gps: Option<GpsInfo>,
    pub other: OtherInfo,
    pub exposure_time: Option<f64>,
    pub f_number: Option<f64>,
    #[serde(rename = "ISO")]
    pub iso: Option<u32>,
    pub focal_length: Option<f64>,
    pub date_taken: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct BasicFileInfo {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_name: String,
    pub format: String,
    pub file_extension: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct CameraInfo {
    pub make: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct GpsInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct OtherInfo {
    pub software: Option<String>,
}
