use image_finder::criteria::{FilterCriteria, RangeFilter};
use image_finder::search::{ImageSearch, SearchContext};
use std::fs;
use std::path::Path;

fn write_image(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"not a real image, sidecars carry the metadata").unwrap();
    path
}

fn write_sidecar(image: &Path, suffix: &str, payload: &str) {
    let mut name = image.as_os_str().to_os_string();
    name.push(suffix);
    fs::write(std::path::PathBuf::from(name), payload).unwrap();
}

fn context_for(dir: &Path) -> SearchContext {
    SearchContext {
        directories: vec![dir.to_path_buf()],
        ..SearchContext::default()
    }
}

#[test]
fn keyword_scenario_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let sunset = write_image(dir.path(), "sunset.jpg");
    write_sidecar(
        &sunset,
        ".description.json",
        r#"{"ShortDescription":"Evening sky","Keywords":["Sunset","sky"]}"#,
    );
    let lunch = write_image(dir.path(), "lunch.jpg");
    write_sidecar(
        &lunch,
        ".description.json",
        r#"{"ShortDescription":"Food","Keywords":["pasta"]}"#,
    );

    let criteria = FilterCriteria {
        keywords: vec!["sunset".into()],
        ..FilterCriteria::default()
    };
    let results = ImageSearch::new(context_for(dir.path()))
        .run(&criteria)
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].path.ends_with("sunset.jpg"));
}

#[test]
fn no_criteria_returns_every_image() {
    let dir = tempfile::tempdir().unwrap();
    write_image(dir.path(), "a.jpg");
    write_image(dir.path(), "b.png");
    write_image(dir.path(), "notes.txt");

    let results = ImageSearch::new(context_for(dir.path()))
        .run(&FilterCriteria::default())
        .unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn duplicate_inputs_are_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "once.jpg");

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
fn corrupt_sidecar_degrades_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "party.jpg");
    write_sidecar(&image, ".people.json", "{broken json");
    write_sidecar(
        &image,
        ".description.json",
        r#"{"Keywords":["party","friends"]}"#,
    );

    let criteria = FilterCriteria {
        keywords: vec!["party".into()],
        ..FilterCriteria::default()
    };
    let results = ImageSearch::new(context_for(dir.path()))
        .run(&criteria)
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].people.count, 0);
    assert!(results[0].people.faces.is_empty());
}

#[test]
fn people_and_keywords_combine_with_and() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "beach_day.jpg");
    write_sidecar(
        &image,
        ".description.json",
        r#"{"Keywords":["beach"]}"#,
    );
    write_sidecar(
        &image,
        ".people.json",
        r#"{"Count":1,"Faces":["Alice"],"Predictions":[{"Label":"Alice","Confidence":0.92}]}"#,
    );

    let matching = FilterCriteria {
        keywords: vec!["beach".into()],
        people: vec!["Alice".into()],
        ..FilterCriteria::default()
    };
    let results = ImageSearch::new(context_for(dir.path()))
        .run(&matching)
        .unwrap();
    assert_eq!(results.len(), 1);

    let conflicting = FilterCriteria {
        keywords: vec!["beach".into()],
        people: vec!["Bob".into()],
        ..FilterCriteria::default()
    };
    let results = ImageSearch::new(context_for(dir.path()))
        .run(&conflicting)
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn confidence_filter_mutates_emitted_results() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "street.jpg");
    write_sidecar(
        &image,
        ".objects.json",
        r#"{"Count":2,"Objects":[{"Label":"car","Confidence":0.9},{"Label":"bike","Confidence":0.3}],"ObjectCounts":{"car":1,"bike":1}}"#,
    );

    let criteria = FilterCriteria {
        min_confidence: Some(0.5),
        ..FilterCriteria::default()
    };
    let results = ImageSearch::new(context_for(dir.path()))
        .run(&criteria)
        .unwrap();

    assert_eq!(results.len(), 1);
    let objects = &results[0].objects;
    assert_eq!(objects.count, 1);
    assert_eq!(objects.objects[0].label, "car");
    assert!(objects.object_counts.get("bike").is_none());
}

#[test]
fn exif_cache_sidecar_feeds_range_filters() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "lowlight.jpg");
    write_sidecar(
        &image,
        ".EXIF.json",
        r#"{"ISO":1600,"FNumber":1.8,"Camera":{"Make":"Sony","Model":"A7 IV"}}"#,
    );
    let other = write_image(dir.path(), "daylight.jpg");
    write_sidecar(&other, ".EXIF.json", r#"{"ISO":100,"FNumber":8.0}"#);

    let criteria = FilterCriteria {
        iso: Some(RangeFilter::Between(800.0, 3200.0)),
        camera_make: vec!["Sony".into()],
        ..FilterCriteria::default()
    };
    let results = ImageSearch::new(context_for(dir.path()))
        .run(&criteria)
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].path.ends_with("lowlight.jpg"));
}

#[test]
fn scene_filter_excludes_unclassified_images() {
    let dir = tempfile::tempdir().unwrap();
    let beach = write_image(dir.path(), "shore.jpg");
    write_sidecar(
        &beach,
        ".scenes.json",
        r#"{"Success":true,"Scene":"beach","Confidence":0.88}"#,
    );
    // No scenes sidecar at all: defaults to the unknown sentinel.
    write_image(dir.path(), "mystery.jpg");

    let criteria = FilterCriteria {
        scenes: vec!["*".into()],
        ..FilterCriteria::default()
    };
    let results = ImageSearch::new(context_for(dir.path()))
        .run(&criteria)
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].path.ends_with("shore.jpg"));
}

#[test]
fn language_specific_descriptions_are_preferred() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(dir.path(), "molen.jpg");
    write_sidecar(
        &image,
        ".description.json",
        r#"{"Keywords":["windmill"]}"#,
    );
    write_sidecar(
        &image,
        ".description.nl.json",
        r#"{"Keywords":["molen"]}"#,
    );

    let context = SearchContext {
        directories: vec![dir.path().to_path_buf()],
        language: Some("nl".into()),
        ..SearchContext::default()
    };
    let criteria = FilterCriteria {
        keywords: vec!["molen".into()],
        ..FilterCriteria::default()
    };
    let results = ImageSearch::new(context).run(&criteria).unwrap();
    assert_eq!(results.len(), 1);
}
