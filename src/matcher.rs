//! Inclusion logic: OR within a category's value list, AND across the
//! categories that were actually specified. Unspecified categories are
//! vacuously true.

use crate::criteria::CompiledCriteria;
use crate::geo::haversine_meters;
use crate::metadata::{MediaItem, SceneInfo};
use globset::GlobMatcher;

/// Decides whether `item` satisfies the compiled criteria. Confidence
/// filtering mutates the item's scene/people/object data in place, so the
/// item must be evaluated before it is emitted.
pub fn evaluate(item: &mut MediaItem, criteria: &CompiledCriteria) -> bool {
    if !criteria.has_search_criteria {
        return true;
    }

    let confidence_ok = apply_confidence(item, criteria);

    confidence_ok
        && keywords_match(item, &criteria.keywords)
        && people_match(item, &criteria.people)
        && objects_match(item, &criteria.objects)
        && scenes_match(item, &criteria.scenes)
        && description_field_match(item, &criteria.picture_types, |d| &d.picture_type)
        && description_field_match(item, &criteria.style_types, |d| &d.style_type)
        && description_field_match(item, &criteria.moods, |d| &d.overall_mood)
        && description_text_match(item, &criteria.description_search)
        && content_match(item, criteria)
        && exif_match(item, criteria)
        && any_match(item, &criteria.any)
}

fn any_of(patterns: &[GlobMatcher], haystack: &str) -> bool {
    patterns.iter().any(|p| p.is_match(haystack))
}

fn keywords_match(item: &MediaItem, patterns: &[GlobMatcher]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    item.description.as_ref().is_some_and(|d| {
        d.keywords.iter().any(|keyword| any_of(patterns, keyword))
    })
}

fn people_match(item: &MediaItem, patterns: &[GlobMatcher]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    item.people.faces.iter().any(|face| any_of(patterns, face))
}

fn objects_match(item: &MediaItem, patterns: &[GlobMatcher]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    item.objects
        .objects
        .iter()
        .any(|det| any_of(patterns, &det.label))
}

/// The `unknown` sentinel never matches a scene filter, wildcards included.
fn scenes_match(item: &MediaItem, patterns: &[GlobMatcher]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    if item.scenes.is_unknown() {
        return false;
    }
    any_of(patterns, &item.scenes.scene)
}

fn description_field_match(
    item: &MediaItem,
    patterns: &[GlobMatcher],
    field: impl Fn(&crate::metadata::ImageDescription) -> &String,
) -> bool {
    if patterns.is_empty() {
        return true;
    }
    item.description
        .as_ref()
        .is_some_and(|d| any_of(patterns, field(d)))
}

fn description_text_match(item: &MediaItem, patterns: &[GlobMatcher]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    item.description.as_ref().is_some_and(|d| {
        any_of(patterns, &d.short_description) || any_of(patterns, &d.long_description)
    })
}

/// Multiple content flags are OR'd together when set simultaneously.
fn content_match(item: &MediaItem, criteria: &CompiledCriteria) -> bool {
    let raw = &criteria.raw;
    if !raw.has_nudity && !raw.no_nudity && !raw.has_explicit_content && !raw.no_explicit_content {
        return true;
    }
    let (nudity, explicit) = item
        .description
        .as_ref()
        .map(|d| (d.has_nudity, d.has_explicit_content))
        .unwrap_or((false, false));

    (raw.has_nudity && nudity)
        || (raw.no_nudity && !nudity)
        || (raw.has_explicit_content && explicit)
        || (raw.no_explicit_content && !explicit)
}

/// Aggregate "match anywhere": path, filename, description texts,
/// keywords, face and object labels, scene, description classifiers, and
/// the EXIF camera/software/basic-file fields.
fn any_match(item: &MediaItem, patterns: &[GlobMatcher]) -> bool {
    if patterns.is_empty() {
        return true;
    }

    let path = item.path.to_string_lossy();
    if any_of(patterns, &path) {
        return true;
    }
    if let Some(name) = item.path.file_name().and_then(|n| n.to_str()) {
        if any_of(patterns, name) {
            return true;
        }
    }
    if let Some(desc) = &item.description {
        if any_of(patterns, &desc.short_description)
            || any_of(patterns, &desc.long_description)
            || any_of(patterns, &desc.picture_type)
            || any_of(patterns, &desc.style_type)
            || any_of(patterns, &desc.overall_mood)
            || desc.keywords.iter().any(|k| any_of(patterns, k))
        {
            return true;
        }
    }
    if item.people.faces.iter().any(|f| any_of(patterns, f)) {
        return true;
    }
    if item.objects.objects.iter().any(|o| any_of(patterns, &o.label)) {
        return true;
    }
    if any_of(patterns, &item.scenes.scene) {
        return true;
    }
    if let Some(exif) = &item.exif {
        let fields = [
            exif.camera.make.as_deref(),
            exif.camera.model.as_deref(),
            exif.other.software.as_deref(),
            Some(exif.basic.file_name.as_str()),
            Some(exif.basic.format.as_str()),
            Some(exif.basic.file_extension.as_str()),
        ];
        if fields
            .iter()
            .flatten()
            .any(|value| any_of(patterns, value))
        {
            return true;
        }
    }
    false
}

/// Filters scene/people/object data down to entries at or above the
/// minimum confidence ratio, recomputing the derived count fields.
///
/// Returns the confidence gate: exclusion happens only when no entry in
/// any confidence-bearing category met the threshold and confidence
/// filtering is the only active criterion.
fn apply_confidence(item: &mut MediaItem, criteria: &CompiledCriteria) -> bool {
    let Some(ratio) = criteria.raw.min_confidence else {
        return true;
    };

    let mut any_pass = false;

    if item.scenes.success {
        if item.scenes.confidence >= ratio {
            any_pass = true;
        } else {
            log::trace!(
                "Scene {:?} below confidence ratio {} for {:?}",
                item.scenes.scene,
                ratio,
                item.path
            );
            item.scenes = SceneInfo::default();
        }
    }

    if !item.people.predictions.is_empty() {
        item.people.predictions.retain(|p| p.confidence >= ratio);
        item.people.faces = item
            .people
            .predictions
            .iter()
            .map(|p| p.label.clone())
            .collect();
        item.people.count = item.people.predictions.len() as u32;
        any_pass |= !item.people.predictions.is_empty();
    }

    if !item.objects.objects.is_empty() {
        item.objects.objects.retain(|o| o.confidence >= ratio);
        item.objects.recount();
        any_pass |= !item.objects.objects.is_empty();
    }

    if criteria.confidence_only {
        any_pass
    } else {
        true
    }
}

/// Numeric range, GPS and camera filters, AND'd into one verdict. Once any
/// EXIF-derived criterion is requested, an item without the corresponding
/// data fails it rather than passing vacuously.
fn exif_match(item: &MediaItem, criteria: &CompiledCriteria) -> bool {
    let raw = &criteria.raw;

    // Dimensions come from the item level (EXIF or decode fallback).
    if let Some(filter) = &raw.width {
        match item.width {
            Some(width) if filter.matches(width as f64) => {}
            _ => return false,
        }
    }
    if let Some(filter) = &raw.height {
        match item.height {
            Some(height) if filter.matches(height as f64) => {}
            _ => return false,
        }
    }

    let needs_exif = raw.exposure_time.is_some()
        || raw.f_number.is_some()
        || raw.iso.is_some()
        || raw.focal_length.is_some()
        || raw.date_taken.is_some()
        || raw.gps_latitude.is_some()
        || raw.gps_longitude.is_some()
        || raw.gps_altitude.is_some()
        || raw.geo_location.is_some()
        || !criteria.camera_make.is_empty()
        || !criteria.camera_model.is_empty();
    if !needs_exif {
        return true;
    }
    let Some(exif) = &item.exif else {
        return false;
    };

    if let Some(filter) = &raw.exposure_time {
        match exif.exposure_time {
            Some(value) if filter.matches(value) => {}
            _ => return false,
        }
    }
    if let Some(filter) = &raw.f_number {
        match exif.f_number {
            Some(value) if filter.matches(value) => {}
            _ => return false,
        }
    }
    if let Some(filter) = &raw.iso {
        match exif.iso {
            Some(value) if filter.matches(value as f64) => {}
            _ => return false,
        }
    }
    if let Some(filter) = &raw.focal_length {
        match exif.focal_length {
            Some(value) if filter.matches(value) => {}
            _ => return false,
        }
    }
    if let Some(filter) = &raw.date_taken {
        match exif.date_taken {
            Some(value) if filter.matches(value) => {}
            _ => return false,
        }
    }

    if !criteria.camera_make.is_empty() {
        match exif.camera.make.as_deref() {
            Some(make) if any_of(&criteria.camera_make, make) => {}
            _ => return false,
        }
    }
    if !criteria.camera_model.is_empty() {
        match exif.camera.model.as_deref() {
            Some(model) if any_of(&criteria.camera_model, model) => {}
            _ => return false,
        }
    }

    // GPS-based filters: an item without GPS data fails, never passes.
    let needs_gps = raw.gps_latitude.is_some()
        || raw.gps_longitude.is_some()
        || raw.gps_altitude.is_some()
        || raw.geo_location.is_some();
    if needs_gps {
        let Some(gps) = &exif.gps else {
            return false;
        };
        if let Some(filter) = &raw.gps_latitude {
            if !filter.matches(gps.latitude) {
                return false;
            }
        }
        if let Some(filter) = &raw.gps_longitude {
            if !filter.matches(gps.longitude) {
                return false;
            }
        }
        if let Some(filter) = &raw.gps_altitude {
            match gps.altitude {
                Some(altitude) if filter.matches(altitude) => {}
                _ => return false,
            }
        }
        if let Some(point) = &raw.geo_location {
            let distance = haversine_meters(
                point.latitude,
                point.longitude,
                gps.latitude,
                gps.longitude,
            );
            if distance > raw.geo_distance_meters {
                return false;
            }
        }
    }

    true
}
