use crate::error::AppError;
use crate::metadata::{BasicFileInfo, CameraInfo, ExifInfo, GpsInfo};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Extracts an [`ExifInfo`] record from an image file.
///
/// The EXIF container is optional; an image without one still yields a
/// record with the basic file fields and decoder-derived dimensions.
/// Only an unreadable file is an error.
pub fn extract(path: &Path) -> Result<ExifInfo, AppError> {
    log::trace!("Extracting EXIF data for image: {:?}", path);
    let file = File::open(path)?;
    let mut buf_reader = BufReader::new(file);
    let parsed = Reader::new().read_from_container(&mut buf_reader).ok();

    let mut info = ExifInfo {
        basic: basic_info(path),
        ..ExifInfo::default()
    };

    if let Some(exif) = parsed {
        parse_fields(&exif, &mut info);
    } else {
        log::debug!("No EXIF container found in {:?}", path);
    }

    // Dimensions missing from EXIF fall back to decoding the header.
    if info.basic.width.is_none() || info.basic.height.is_none() {
        match image::image_dimensions(path) {
            Ok((width, height)) => {
                info.basic.width = Some(width);
                info.basic.height = Some(height);
            }
            Err(e) => {
                log::debug!("Could not decode dimensions for {:?}: {}", path, e);
            }
        }
    }

    Ok(info)
}

fn basic_info(path: &Path) -> BasicFileInfo {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    BasicFileInfo {
        width: None,
        height: None,
        file_name: path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default(),
        format: image::ImageFormat::from_extension(&extension)
            .map(|f| format!("{:?}", f).to_uppercase())
            .unwrap_or_default(),
        file_extension: extension,
    }
}

fn parse_fields(exif: &exif::Exif, info: &mut ExifInfo) {
    if let Some(field) = exif.get_field(Tag::PixelXDimension, In::PRIMARY) {
        info.basic.width = get_u32(&field.value);
    }
    if let Some(field) = exif.get_field(Tag::PixelYDimension, In::PRIMARY) {
        info.basic.height = get_u32(&field.value);
    }
    if info.basic.width.is_none() {
        if let Some(field) = exif.get_field(Tag::ImageWidth, In::PRIMARY) {
            info.basic.width = get_u32(&field.value);
        }
    }
    if info.basic.height.is_none() {
        if let Some(field) = exif.get_field(Tag::ImageLength, In::PRIMARY) {
            info.basic.height = get_u32(&field.value);
        }
    }

    info.camera = CameraInfo {
        make: get_string(exif, Tag::Make),
        model: get_string(exif, Tag::Model),
    };
    info.other.software = get_string(exif, Tag::Software);

    if let Some(field) = exif.get_field(Tag::ExposureTime, In::PRIMARY) {
        info.exposure_time = get_rational(&field.value);
    }
    if let Some(field) = exif.get_field(Tag::FNumber, In::PRIMARY) {
        info.f_number = get_rational(&field.value);
    }
    if let Some(field) = exif.get_field(Tag::PhotographicSensitivity, In::PRIMARY) {
        info.iso = get_u32(&field.value);
    }
    if let Some(field) = exif.get_field(Tag::FocalLength, In::PRIMARY) {
        info.focal_length = get_rational(&field.value);
    }

    if let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
        info.date_taken = parse_datetime(&field.display_value().to_string());
    } else if let Some(field) = exif.get_field(Tag::DateTime, In::PRIMARY) {
        info.date_taken = parse_datetime(&field.display_value().to_string());
    }

    let latitude = get_gps_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef);
    let longitude = get_gps_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef);
    if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
        info.gps = Some(GpsInfo {
            latitude,
            longitude,
            altitude: exif
                .get_field(Tag::GPSAltitude, In::PRIMARY)
                .and_then(|f| get_rational(&f.value)),
        });
    }
}

fn get_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Short(v) if !v.is_empty() => Some(v[0] as u32),
        Value::Long(v) if !v.is_empty() => Some(v[0]),
        _ => None,
    }
}

fn get_rational(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(v) if !v.is_empty() => {
            let r = &v[0];
            if r.denom != 0 {
                Some(r.num as f64 / r.denom as f64)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn get_string(exif: &exif::Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .map(|f| f.display_value().to_string().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
}

/// Parses the EXIF "YYYY:MM:DD HH:MM:SS" timestamp format.
pub(crate) fn parse_datetime(dt_str: &str) -> Option<NaiveDateTime> {
    let dt_str = dt_str.trim_matches('"').trim();
    NaiveDateTime::parse_from_str(dt_str, "%Y:%m:%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(dt_str, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Degrees/minutes/seconds rationals to a signed decimal coordinate.
/// South latitudes and west longitudes are negative.
fn get_gps_coordinate(exif: &exif::Exif, coord_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let coord_field = exif.get_field(coord_tag, In::PRIMARY)?;
    let ref_field = exif.get_field(ref_tag, In::PRIMARY)?;

    let degrees = match &coord_field.value {
        Value::Rational(v) if v.len() >= 3 => {
            let d = v[0].to_f64();
            let m = v[1].to_f64();
            let s = v[2].to_f64();
            d + m / 60.0 + s / 3600.0
        }
        _ => return None,
    };

    let ref_str = ref_field.display_value().to_string();
    let ref_str = ref_str.trim_matches('"');
    let sign = if ref_str == "S" || ref_str == "W" { -1.0 } else { 1.0 };

    Some(degrees * sign)
}
