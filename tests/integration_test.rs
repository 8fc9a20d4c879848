//! Integration tests for asclepius.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use asclepius::classifier::{ImageClassifier, OnnxClassifier, PreparedImage};
use asclepius::config::AsclepiusConfig;
use asclepius::observability::{self, LoggingConfig};
use asclepius::storage::SCHEMA_VERSION;
use asclepius::{
    ClassificationResult, ClassifierOptions, Error, ImageClassifierHelper, ResultService,
    ResultStore, ServiceContainer, SqliteResultStore,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

#[test]
fn test_error_types() {
    let err = Error::InvalidInput("test message".to_string());
    let display = format!("{err}");
    assert!(display.contains("invalid input"));
    assert!(display.contains("test message"));

    let err = Error::OperationFailed {
        operation: "read".to_string(),
        cause: "file not found".to_string(),
    };
    let display = format!("{err}");
    assert!(display.contains("read"));
    assert!(display.contains("file not found"));

    let err = Error::NewsFetch("Failed to fetch news".to_string());
    assert!(format!("{err}").contains("Failed to fetch news"));

    let err = Error::FeatureNotEnabled("onnx".to_string());
    assert!(format!("{err}").contains("--features onnx"));
}

#[test]
fn test_store_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db_asclepius.sqlite");

    let id = {
        let store = SqliteResultStore::open(&path).unwrap();
        let record =
            ClassificationResult::new(1_700_000_000_000, "file:///skin.jpg", "Cancer", 0.73)
                .unwrap();
        store.insert(&[record]).unwrap()[0]
    };

    let store = SqliteResultStore::open(&path).unwrap();
    assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);

    let stored = store.get(id).unwrap().unwrap();
    assert_eq!(stored.label, "Cancer");
    assert_eq!(stored.score.to_bits(), 0.73_f32.to_bits());
    assert_eq!(stored.image_uri, "file:///skin.jpg");
    assert_eq!(stored.timestamp, 1_700_000_000_000);

    let listed = store.list_all().unwrap();
    assert_eq!(listed.first().and_then(|r| r.id), Some(id));

    assert!(store.delete(id).unwrap());
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn test_logging_initializes_once() {
    let first = observability::init(LoggingConfig::from_lookup(None, false, |_| None));
    assert!(first.is_ok());
    assert!(observability::is_initialized());

    let second = observability::init(LoggingConfig::from_lookup(None, true, |_| None));
    assert!(second.is_err());
}

/// Scores the mean red intensity as the cancer probability.
struct RednessClassifier;

impl ImageClassifier for RednessClassifier {
    fn name(&self) -> &'static str {
        "redness"
    }

    fn classify(&self, image: &PreparedImage) -> asclepius::Result<Vec<f32>> {
        let reds: Vec<f32> = image.data.iter().step_by(3).copied().collect();
        #[allow(clippy::cast_precision_loss)]
        let mean = reds.iter().sum::<f32>() / reds.len() as f32 / 255.0;
        Ok(vec![mean, 1.0 - mean])
    }
}

fn solid_png(dir: &tempfile::TempDir, name: &str, color: [u8; 3]) -> String {
    let image = RgbImage::from_pixel(16, 16, Rgb(color));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, buf.into_inner()).unwrap();
    format!("file://{}", path.display())
}

#[tokio::test]
async fn test_classify_save_and_browse() {
    let dir = tempfile::tempdir().unwrap();
    let config = AsclepiusConfig::default().with_data_dir(dir.path().join("data"));
    let container = ServiceContainer::from_config(config);
    let store = container.store().unwrap();

    let options = ClassifierOptions {
        input_size: 8,
        ..ClassifierOptions::default()
    };
    let service = ResultService::new(
        ImageClassifierHelper::new(RednessClassifier, options),
        Arc::clone(&store),
    );

    let red = solid_png(&dir, "red.png", [255, 0, 0]);
    let outcome = service.classify(red.clone(), None).await.unwrap();
    let top = outcome.top().unwrap();
    assert_eq!(top.label, "Cancer");
    assert!((top.score - 1.0).abs() < f32::EPSILON);
    let saved = service.save().await.unwrap();

    let blue = solid_png(&dir, "blue.png", [0, 0, 255]);
    let outcome = service.classify(blue, None).await.unwrap();
    assert_eq!(outcome.top().unwrap().label, "Non Cancer");

    let history = container.history().unwrap();
    let results = history.refresh().await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, Some(saved));
    assert_eq!(results[0].image_uri, red);
}

#[tokio::test]
async fn test_missing_model_reports_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AsclepiusConfig::default().with_data_dir(dir.path());
    config.classifier.model_path = dir.path().join("missing.onnx");
    let container = ServiceContainer::from_config(config);
    let service = container.result_service();

    let image = solid_png(&dir, "photo.png", [10, 20, 30]);
    let err = service.classify(image, None).await.unwrap_err();

    if cfg!(feature = "onnx") {
        assert!(matches!(err, Error::ModelUnavailable(_)), "{err}");
    } else {
        assert!(matches!(err, Error::FeatureNotEnabled(_)), "{err}");
    }
    assert!(service.pending().is_none());
}

#[cfg(feature = "onnx")]
#[test]
fn test_fixture_model_ranks_by_color() {
    let dir = tempfile::tempdir().unwrap();
    let options = ClassifierOptions {
        input_size: 8,
        ..ClassifierOptions::default()
    }
    .with_model_path(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/mean_color.onnx"
    ));
    let helper = ImageClassifierHelper::new(OnnxClassifier::new(&options), options);

    let red = helper
        .classify_with_crop(&solid_png(&dir, "red.png", [255, 0, 0]), None)
        .unwrap();
    let ranked: Vec<&str> = red
        .classifications
        .categories
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(ranked, ["Cancer"]);
    assert!(red.top().unwrap().score > 0.99);

    let blue = helper
        .classify_with_crop(&solid_png(&dir, "blue.png", [0, 0, 255]), None)
        .unwrap();
    assert_eq!(blue.top().unwrap().label, "Non Cancer");
}
