//! Classify CLI command.
//!
//! # Usage
//!
//! ```bash
//! asclepius classify photo.jpg
//! asclepius classify file:///tmp/photo.png --save
//! asclepius classify photo.jpg --threshold 0.5 --max-results 1 --format json
//! ```

#![allow(clippy::print_stdout)]
#![allow(clippy::needless_pass_by_value)]

use crate::Result;
use crate::classifier::CropRect;
use crate::config::AsclepiusConfig;
use crate::rendering::{OutputFormat, render_outcome};
use crate::services::ServiceContainer;
use clap::Args;
use std::path::PathBuf;

/// Arguments of `asclepius classify`.
#[derive(Debug, Clone, Args)]
pub struct ClassifyArgs {
    /// Image path or `file://` URI.
    pub image: String,

    /// Save the top result to the history.
    #[arg(long)]
    pub save: bool,

    /// Classify only this region of the image.
    #[arg(long, value_name = "X,Y,W,H")]
    pub crop: Option<CropRect>,

    /// Minimum confidence for a category to be reported.
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Maximum number of categories to report (0 for all).
    #[arg(long)]
    pub max_results: Option<usize>,

    /// ONNX model file.
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl ClassifyArgs {
    /// Applies the command-line overrides to `config`.
    #[must_use]
    pub fn apply_to(&self, mut config: AsclepiusConfig) -> AsclepiusConfig {
        if let Some(threshold) = self.threshold {
            config.classifier.threshold = threshold;
        }
        if let Some(max_results) = self.max_results {
            config.classifier.max_results = max_results;
        }
        if let Some(model) = &self.model {
            config.classifier.model_path.clone_from(model);
        }
        config
    }
}

/// Classify command.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded, the model cannot run,
/// or the result cannot be saved.
pub async fn cmd_classify(config: AsclepiusConfig, args: ClassifyArgs) -> Result<()> {
    let config = args.apply_to(config);
    config.classifier.validate()?;

    let container = ServiceContainer::from_config(config);
    let service = container.result_service();

    let outcome = service.classify(args.image.clone(), args.crop).await?;
    print!("{}", render_outcome(&outcome, args.format)?);

    if args.save {
        if service.pending().is_some() {
            let id = service.save().await?;
            if args.format == OutputFormat::Table {
                println!();
                println!("Saved as result {id}");
            }
        } else {
            tracing::warn!("No category passed the threshold; nothing saved");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use clap::Parser;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    const FIXTURE_MODEL: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/mean_color.onnx");

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ClassifyArgs,
    }

    #[test]
    fn test_parse_full() {
        let cli = TestCli::try_parse_from([
            "test",
            "photo.jpg",
            "--save",
            "--crop",
            "1,2,30,40",
            "--threshold",
            "0.5",
            "--max-results",
            "1",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.args.image, "photo.jpg");
        assert!(cli.args.save);
        assert_eq!(
            cli.args.crop,
            Some(CropRect {
                x: 1,
                y: 2,
                width: 30,
                height: 40
            })
        );
        assert_eq!(cli.args.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_rejects_bad_crop() {
        assert!(TestCli::try_parse_from(["test", "photo.jpg", "--crop", "1,2,0,4"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = TestCli::try_parse_from([
            "test",
            "photo.jpg",
            "--threshold",
            "0.5",
            "--model",
            "/models/other.onnx",
        ])
        .unwrap();

        let config = cli.args.apply_to(AsclepiusConfig::default());
        assert!((config.classifier.threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.classifier.max_results, 2);
        assert_eq!(
            config.classifier.model_path,
            PathBuf::from("/models/other.onnx")
        );
    }

    fn red_png(dir: &tempfile::TempDir) -> String {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([255, 0, 0])))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        let path = dir.path().join("red.png");
        std::fs::write(&path, buf.into_inner()).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_classify_without_save_ignores_unusable_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let mut config = AsclepiusConfig::default().with_data_dir(blocker.join("data"));
        config.classifier.input_size = 8;

        let cli = TestCli::try_parse_from([
            "test",
            red_png(&dir).as_str(),
            "--model",
            FIXTURE_MODEL,
            "--format",
            "json",
        ])
        .unwrap();
        let result = cmd_classify(config, cli.args).await;

        if cfg!(feature = "onnx") {
            assert!(result.is_ok(), "{result:?}");
        } else {
            assert!(matches!(result, Err(Error::FeatureNotEnabled(_))), "{result:?}");
        }
    }
}
