use crate::error::AppError;
use chrono::NaiveDateTime;
use globset::{GlobBuilder, GlobMatcher};

pub const DEFAULT_GEO_DISTANCE_METERS: f64 = 1000.0;

/// Exact-or-range constraint over one numeric/date field.
///
/// One supplied value means exact equality, two mean an inclusive
/// `[min, max]` range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeFilter<T> {
    Exact(T),
    Between(T, T),
}

impl<T: PartialOrd + Copy> RangeFilter<T> {
    pub fn from_values(name: &str, values: &[T]) -> Result<Self, AppError> {
        match values {
            [value] => Ok(RangeFilter::Exact(*value)),
            [min, max] => {
                if min > max {
                    return Err(AppError::InvalidCriteria(format!(
                        "{}: min must not exceed max",
                        name
                    )));
                }
                Ok(RangeFilter::Between(*min, *max))
            }
            _ => Err(AppError::InvalidCriteria(format!(
                "{}: supply one exact value or [min, max]",
                name
            ))),
        }
    }

    pub fn matches(&self, value: T) -> bool {
        match self {
            RangeFilter::Exact(exact) => value == *exact,
            RangeFilter::Between(min, max) => value >= *min && value <= *max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Raw filter inputs for one search run. Constructed by the caller,
/// compiled once, then consumed read-only during evaluation.
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    pub keywords: Vec<String>,
    pub people: Vec<String>,
    pub objects: Vec<String>,
    pub scenes: Vec<String>,
    pub picture_types: Vec<String>,
    pub style_types: Vec<String>,
    pub moods: Vec<String>,
    pub description_search: Vec<String>,
    /// Aggregate "match anywhere" terms; bare terms are auto-wrapped as
    /// `*term*` at compile time.
    pub any: Vec<String>,
    pub has_nudity: bool,
    pub no_nudity: bool,
    pub has_explicit_content: bool,
    pub no_explicit_content: bool,
    pub width: Option<RangeFilter<f64>>,
    pub height: Option<RangeFilter<f64>>,
    pub exposure_time: Option<RangeFilter<f64>>,
    pub f_number: Option<RangeFilter<f64>>,
    pub iso: Option<RangeFilter<f64>>,
    pub focal_length: Option<RangeFilter<f64>>,
    pub date_taken: Option<RangeFilter<NaiveDateTime>>,
    pub gps_latitude: Option<RangeFilter<f64>>,
    pub gps_longitude: Option<RangeFilter<f64>>,
    pub gps_altitude: Option<RangeFilter<f64>>,
    pub geo_location: Option<GeoPoint>,
    pub geo_distance_meters: f64,
    pub camera_make: Vec<String>,
    pub camera_model: Vec<String>,
    pub min_confidence: Option<f64>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            people: Vec::new(),
            objects: Vec::new(),
            scenes: Vec::new(),
            picture_types: Vec::new(),
            style_types: Vec::new(),
            moods: Vec::new(),
            description_search: Vec::new(),
            any: Vec::new(),
            has_nudity: false,
            no_nudity: false,
            has_explicit_content: false,
            no_explicit_content: false,
            width: None,
            height: None,
            exposure_time: None,
            f_number: None,
            iso: None,
            focal_length: None,
            date_taken: None,
            gps_latitude: None,
            gps_longitude: None,
            gps_altitude: None,
            geo_location: None,
            geo_distance_meters: DEFAULT_GEO_DISTANCE_METERS,
            camera_make: Vec::new(),
            camera_model: Vec::new(),
            min_confidence: None,
        }
    }
}

impl FilterCriteria {
    fn any_exif_criterion(&self) -> bool {
        self.width.is_some()
            || self.height.is_some()
            || self.exposure_time.is_some()
            || self.f_number.is_some()
            || self.iso.is_some()
            || self.focal_length.is_some()
            || self.date_taken.is_some()
            || self.gps_latitude.is_some()
            || self.gps_longitude.is_some()
            || self.gps_altitude.is_some()
            || self.geo_location.is_some()
            || !self.camera_make.is_empty()
            || !self.camera_model.is_empty()
    }

    fn any_content_flag(&self) -> bool {
        self.has_nudity || self.no_nudity || self.has_explicit_content || self.no_explicit_content
    }

    /// Validates the criteria and pre-compiles all wildcard patterns.
    pub fn compile(&self) -> Result<CompiledCriteria, AppError> {
        if let Some(ratio) = self.min_confidence {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(AppError::InvalidCriteria(format!(
                    "min confidence ratio must be within [0, 1], got {}",
                    ratio
                )));
            }
        }
        if self.geo_location.is_some() && self.geo_distance_meters <= 0.0 {
            return Err(AppError::InvalidCriteria(format!(
                "geo distance must be positive, got {}",
                self.geo_distance_meters
            )));
        }
        if let Some(point) = self.geo_location {
            if !(-90.0..=90.0).contains(&point.latitude)
                || !(-180.0..=180.0).contains(&point.longitude)
            {
                return Err(AppError::InvalidCriteria(format!(
                    "geo location out of range: {}, {}",
                    point.latitude, point.longitude
                )));
            }
        }

        let has_search_criteria = !self.keywords.is_empty()
            || !self.people.is_empty()
            || !self.objects.is_empty()
            || !self.scenes.is_empty()
            || !self.picture_types.is_empty()
            || !self.style_types.is_empty()
            || !self.moods.is_empty()
            || !self.description_search.is_empty()
            || !self.any.is_empty()
            || self.any_content_flag()
            || self.any_exif_criterion()
            || self.min_confidence.is_some();

        // Confidence filtering only decides inclusion on its own when no
        // other criterion is active.
        let confidence_only = self.min_confidence.is_some()
            && self.keywords.is_empty()
            && self.people.is_empty()
            && self.objects.is_empty()
            && self.scenes.is_empty()
            && self.picture_types.is_empty()
            && self.style_types.is_empty()
            && self.moods.is_empty()
            && self.description_search.is_empty()
            && self.any.is_empty()
            && !self.any_content_flag()
            && !self.any_exif_criterion();

        Ok(CompiledCriteria {
            keywords: compile_patterns(&self.keywords)?,
            people: compile_patterns(&self.people)?,
            objects: compile_patterns(&self.objects)?,
            scenes: compile_patterns(&self.scenes)?,
            picture_types: compile_patterns(&self.picture_types)?,
            style_types: compile_patterns(&self.style_types)?,
            moods: compile_patterns(&self.moods)?,
            description_search: compile_patterns(&self.description_search)?,
            any: compile_any_patterns(&self.any)?,
            camera_make: compile_patterns(&self.camera_make)?,
            camera_model: compile_patterns(&self.camera_model)?,
            has_search_criteria,
            confidence_only,
            raw: self.clone(),
        })
    }
}

/// Criteria with every term list compiled to case-insensitive glob
/// matchers, ready for evaluation.
#[derive(Debug)]
pub struct CompiledCriteria {
    pub keywords: Vec<GlobMatcher>,
    pub people: Vec<GlobMatcher>,
    pub objects: Vec<GlobMatcher>,
    pub scenes: Vec<GlobMatcher>,
    pub picture_types: Vec<GlobMatcher>,
    pub style_types: Vec<GlobMatcher>,
    pub moods: Vec<GlobMatcher>,
    pub description_search: Vec<GlobMatcher>,
    pub any: Vec<GlobMatcher>,
    pub camera_make: Vec<GlobMatcher>,
    pub camera_model: Vec<GlobMatcher>,
    pub has_search_criteria: bool,
    pub confidence_only: bool,
    pub raw: FilterCriteria,
}

fn compile_pattern(term: &str) -> Result<GlobMatcher, AppError> {
    let glob = GlobBuilder::new(term)
        .case_insensitive(true)
        .backslash_escape(false)
        .build()?;
    Ok(glob.compile_matcher())
}

/// Per-category terms are used as supplied; exact match unless the caller
/// included `*` or `?` themselves.
fn compile_patterns(terms: &[String]) -> Result<Vec<GlobMatcher>, AppError> {
    terms.iter().map(|t| compile_pattern(t)).collect()
}

/// The "any field" aggregate auto-wraps bare terms for substring matching.
fn compile_any_patterns(terms: &[String]) -> Result<Vec<GlobMatcher>, AppError> {
    terms
        .iter()
        .map(|t| {
            if t.contains('*') || t.contains('?') {
                compile_pattern(t)
            } else {
                compile_pattern(&format!("*{}*", t))
            }
        })
        .collect()
}
