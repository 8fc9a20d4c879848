//! ONNX classifier backed by `tract`.
//!
//! When the `onnx` feature is enabled the model file is loaded lazily on the
//! first classification and cached for the lifetime of the classifier. A
//! failed load is not cached, so the next call tries again. Without the
//! feature every classification fails with [`Error::FeatureNotEnabled`].

use super::{ClassifierOptions, ImageClassifier, PreparedImage};
use crate::{Error, Result};

// ============================================================================
// Native tract implementation (with feature)
// ============================================================================

#[cfg(feature = "onnx")]
mod native {
    use super::super::to_probabilities;
    use super::{ClassifierOptions, Error, ImageClassifier, PreparedImage, Result};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::path::PathBuf;
    use std::sync::OnceLock;
    use std::time::Instant;
    use tract_onnx::prelude::*;

    /// A runnable plan, boxed so the concrete plan type stays internal to tract.
    type Runner = Box<dyn Fn(Tensor) -> TractResult<TVec<TValue>> + Send + Sync>;

    /// Image classifier running an ONNX model on the CPU.
    pub struct OnnxClassifier {
        model_path: PathBuf,
        input_size: u32,
        runner: OnceLock<Runner>,
    }

    impl OnnxClassifier {
        /// Creates a classifier for the model named in `options`.
        ///
        /// The model is not read until the first call to `classify`.
        #[must_use]
        pub fn new(options: &ClassifierOptions) -> Self {
            Self {
                model_path: options.model_path.clone(),
                input_size: options.input_size,
                runner: OnceLock::new(),
            }
        }

        /// Whether the model has been loaded.
        #[must_use]
        pub fn is_loaded(&self) -> bool {
            self.runner.get().is_some()
        }

        fn runner(&self) -> Result<&Runner> {
            if let Some(runner) = self.runner.get() {
                return Ok(runner);
            }

            tracing::info!(model = %self.model_path.display(), "Loading classification model");
            let start = Instant::now();

            let runner = self.load().map_err(|e| {
                tracing::error!(
                    model = %self.model_path.display(),
                    error = %e,
                    "Image classifier failed to load"
                );
                Error::ModelUnavailable(format!("{}: {e}", self.model_path.display()))
            })?;

            tracing::info!(
                elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                "Classification model loaded"
            );

            // Another thread may have won the race; either plan is equivalent.
            let _ = self.runner.set(runner);
            self.runner
                .get()
                .ok_or_else(|| Error::ModelUnavailable("model initialization race".to_string()))
        }

        fn load(&self) -> TractResult<Runner> {
            let size = self.input_size as usize;
            let plan = tract_onnx::onnx()
                .model_for_path(&self.model_path)?
                .with_input_fact(0, f32::fact([1, size, size, 3]).into())?
                .into_optimized()?
                .into_runnable()?;
            Ok(Box::new(move |input: Tensor| plan.run(tvec!(input.into()))))
        }
    }

    impl ImageClassifier for OnnxClassifier {
        fn name(&self) -> &'static str {
            "onnx"
        }

        fn classify(&self, image: &PreparedImage) -> Result<Vec<f32>> {
            if image.size != self.input_size {
                return Err(Error::InvalidInput(format!(
                    "image is {0}x{0}, model expects {1}x{1}",
                    image.size, self.input_size
                )));
            }

            let runner = self.runner()?;
            let input = tract_ndarray::Array4::from_shape_vec(image.shape(), image.data.clone())
                .map_err(|e| Error::InvalidInput(format!("tensor shape mismatch: {e}")))?;
            let tensor = Tensor::from(input);

            // tract can panic on malformed graphs; surface that as an error.
            let outputs = catch_unwind(AssertUnwindSafe(|| runner(tensor)))
                .map_err(|_| Error::ModelUnavailable("inference panicked".to_string()))?
                .map_err(|e| Error::ModelUnavailable(e.to_string()))?;

            let first = outputs
                .first()
                .ok_or_else(|| Error::ModelUnavailable("model produced no outputs".to_string()))?;
            let view = first
                .to_array_view::<f32>()
                .map_err(|e| Error::ModelUnavailable(e.to_string()))?;
            let raw: Vec<f32> = view.iter().copied().collect();

            Ok(to_probabilities(&raw))
        }
    }
}

// ============================================================================
// Fallback implementation (without feature)
// ============================================================================

#[cfg(not(feature = "onnx"))]
mod fallback {
    use super::{ClassifierOptions, Error, ImageClassifier, PreparedImage, Result};

    /// Placeholder classifier used when the `onnx` feature is disabled.
    pub struct OnnxClassifier {
        _private: (),
    }

    impl OnnxClassifier {
        /// Creates the placeholder.
        #[must_use]
        pub const fn new(_options: &ClassifierOptions) -> Self {
            Self { _private: () }
        }

        /// Always `false`: no model can be loaded.
        #[must_use]
        pub const fn is_loaded(&self) -> bool {
            false
        }
    }

    impl ImageClassifier for OnnxClassifier {
        fn name(&self) -> &'static str {
            "onnx"
        }

        fn classify(&self, _image: &PreparedImage) -> Result<Vec<f32>> {
            tracing::debug!("Classification requested without the onnx feature");
            Err(Error::FeatureNotEnabled("onnx".to_string()))
        }
    }
}

#[cfg(feature = "onnx")]
pub use native::OnnxClassifier;

#[cfg(not(feature = "onnx"))]
pub use fallback::OnnxClassifier;
