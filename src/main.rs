use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, ValueEnum};
use image_finder::config::AppConfig;
use image_finder::criteria::{FilterCriteria, GeoPoint, RangeFilter};
use image_finder::search::{ImageSearch, SearchContext};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "image-finder",
    about = "Search images by sidecar metadata, EXIF and GPS criteria"
)]
struct Cli {
    /// Directories to scan for images
    directories: Vec<PathBuf>,

    /// Explicit image files to include in the scan
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Keyword to match against the description keywords (repeatable)
    #[arg(long = "keyword")]
    keywords: Vec<String>,

    /// Person name to match against recognized faces (repeatable)
    #[arg(long = "person")]
    people: Vec<String>,

    /// Object label to match against detections (repeatable)
    #[arg(long = "object")]
    objects: Vec<String>,

    /// Scene label to match (repeatable)
    #[arg(long = "scene")]
    scenes: Vec<String>,

    #[arg(long = "picture-type")]
    picture_types: Vec<String>,

    #[arg(long = "style-type")]
    style_types: Vec<String>,

    #[arg(long = "mood")]
    moods: Vec<String>,

    /// Phrase to match against the short or long description (repeatable)
    #[arg(long = "description-search")]
    description_search: Vec<String>,

    /// Term matched against any metadata field; bare terms match as
    /// substrings (repeatable)
    #[arg(long = "any")]
    any: Vec<String>,

    #[arg(long)]
    has_nudity: bool,
    #[arg(long)]
    no_nudity: bool,
    #[arg(long)]
    has_explicit_content: bool,
    #[arg(long)]
    no_explicit_content: bool,

    /// Pixel width: one exact value or MIN MAX
    #[arg(long, num_args = 1..=2)]
    width: Option<Vec<f64>>,
    /// Pixel height: one exact value or MIN MAX
    #[arg(long, num_args = 1..=2)]
    height: Option<Vec<f64>>,
    /// Exposure time in seconds: one exact value or MIN MAX
    #[arg(long, num_args = 1..=2)]
    exposure_time: Option<Vec<f64>>,
    /// Aperture f-number: one exact value or MIN MAX
    #[arg(long, num_args = 1..=2)]
    f_number: Option<Vec<f64>>,
    /// ISO sensitivity: one exact value or MIN MAX
    #[arg(long, num_args = 1..=2)]
    iso: Option<Vec<f64>>,
    /// Focal length in millimeters: one exact value or MIN MAX
    #[arg(long, num_args = 1..=2)]
    focal_length: Option<Vec<f64>>,

    /// Only images taken at or after this date(-time)
    #[arg(long = "taken-after", value_name = "DATETIME")]
    taken_after: Option<String>,
    /// Only images taken at or before this date(-time)
    #[arg(long = "taken-before", value_name = "DATETIME")]
    taken_before: Option<String>,

    /// GPS latitude: one exact value or MIN MAX
    #[arg(long, num_args = 1..=2)]
    latitude: Option<Vec<f64>>,
    /// GPS longitude: one exact value or MIN MAX
    #[arg(long, num_args = 1..=2)]
    longitude: Option<Vec<f64>>,
    /// GPS altitude in meters: one exact value or MIN MAX
    #[arg(long, num_args = 1..=2)]
    altitude: Option<Vec<f64>>,

    /// Center point for proximity filtering, as LAT,LON
    #[arg(long = "geo-location", value_name = "LAT,LON")]
    geo_location: Option<String>,
    /// Proximity radius in meters around --geo-location
    #[arg(long = "geo-distance", default_value_t = 1000.0, value_name = "METERS")]
    geo_distance: f64,

    /// Camera make pattern (repeatable)
    #[arg(long = "camera-make")]
    camera_make: Vec<String>,
    /// Camera model pattern (repeatable)
    #[arg(long = "camera-model")]
    camera_model: Vec<String>,

    /// Minimum detection confidence ratio in [0, 1]
    #[arg(long = "min-confidence")]
    min_confidence: Option<f64>,

    /// Preferred description language tag, e.g. "nl"
    #[arg(long)]
    language: Option<String>,

    /// Scan input directories non-recursively
    #[arg(long)]
    no_recurse: bool,

    /// Worker threads; defaults to the configured or detected CPU count
    #[arg(long)]
    workers: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Paths)]
    output: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
enum OutputFormat {
    Paths,
    Json,
}

fn parse_datetime_arg(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .with_context(|| format!("unrecognized date-time: {:?}", value))
}

fn parse_geo_location(value: &str) -> Result<GeoPoint> {
    let (lat, lon) = value
        .split_once(',')
        .with_context(|| format!("expected LAT,LON, got {:?}", value))?;
    Ok(GeoPoint {
        latitude: lat.trim().parse().context("invalid latitude")?,
        longitude: lon.trim().parse().context("invalid longitude")?,
    })
}

fn range(name: &str, values: &Option<Vec<f64>>) -> Result<Option<RangeFilter<f64>>> {
    values
        .as_deref()
        .map(|v| RangeFilter::from_values(name, v))
        .transpose()
        .map_err(Into::into)
}

fn build_criteria(cli: &Cli) -> Result<FilterCriteria> {
    let date_taken = match (&cli.taken_after, &cli.taken_before) {
        (None, None) => None,
        (after, before) => {
            let min = after
                .as_deref()
                .map(parse_datetime_arg)
                .transpose()?
                .unwrap_or(NaiveDateTime::MIN);
            let max = before
                .as_deref()
                .map(parse_datetime_arg)
                .transpose()?
                .unwrap_or(NaiveDateTime::MAX);
            Some(RangeFilter::Between(min, max))
        }
    };

    Ok(FilterCriteria {
        keywords: cli.keywords.clone(),
        people: cli.people.clone(),
        objects: cli.objects.clone(),
        scenes: cli.scenes.clone(),
        picture_types: cli.picture_types.clone(),
        style_types: cli.style_types.clone(),
        moods: cli.moods.clone(),
        description_search: cli.description_search.clone(),
        any: cli.any.clone(),
        has_nudity: cli.has_nudity,
        no_nudity: cli.no_nudity,
        has_explicit_content: cli.has_explicit_content,
        no_explicit_content: cli.no_explicit_content,
        width: range("width", &cli.width)?,
        height: range("height", &cli.height)?,
        exposure_time: range("exposure-time", &cli.exposure_time)?,
        f_number: range("f-number", &cli.f_number)?,
        iso: range("iso", &cli.iso)?,
        focal_length: range("focal-length", &cli.focal_length)?,
        date_taken,
        gps_latitude: range("latitude", &cli.latitude)?,
        gps_longitude: range("longitude", &cli.longitude)?,
        gps_altitude: range("altitude", &cli.altitude)?,
        geo_location: cli
            .geo_location
            .as_deref()
            .map(parse_geo_location)
            .transpose()?,
        geo_distance_meters: cli.geo_distance,
        camera_make: cli.camera_make.clone(),
        camera_model: cli.camera_model.clone(),
        min_confidence: cli.min_confidence,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::new()?;

    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    info!("Starting image-finder");

    let mut directories = cli.directories.clone();
    if directories.is_empty() {
        directories = config.image_directories.iter().map(PathBuf::from).collect();
    }
    if directories.is_empty() && cli.files.is_empty() {
        bail!("no input: supply at least one directory or --file");
    }

    let defaults = SearchContext::default();
    let num_workers = cli.workers.unwrap_or(if config.num_workers > 0 {
        config.num_workers
    } else {
        defaults.num_workers
    });

    let context = SearchContext {
        directories,
        files: cli.files.clone(),
        language: cli.language.clone(),
        recursive: !cli.no_recurse && config.recursive,
        allowed_extensions: config.allowed_extensions.clone(),
        num_workers,
    };

    let criteria = build_criteria(&cli)?;
    let results = ImageSearch::new(context).run(&criteria)?;

    match cli.output {
        OutputFormat::Paths => {
            for item in &results {
                println!("{}", item.path.display());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    info!("image-finder finished: {} result(s)", results.len());
    Ok(())
}
