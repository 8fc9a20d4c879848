//! Image loading and tensor preparation.
//!
//! Images are decoded with the `image` crate, optionally cropped, resized
//! with nearest-neighbour sampling to a square input, and flattened into an
//! NHWC `f32` buffer holding raw `0..=255` channel values.

use crate::{Error, Result};
use image::DynamicImage;
use image::imageops::FilterType;
use std::path::Path;
use std::str::FromStr;

/// Number of colour channels fed to the model.
pub const CHANNELS: usize = 3;

/// Prefix accepted on image references.
const FILE_URI_PREFIX: &str = "file://";

/// A crop rectangle in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width of the region.
    pub width: u32,
    /// Height of the region.
    pub height: u32,
}

impl FromStr for CropRect {
    type Err = Error;

    /// Parses `X,Y,WIDTH,HEIGHT`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::InvalidInput(format!("invalid crop '{s}': {e}")))?;

        let [x, y, width, height] = parts.as_slice() else {
            return Err(Error::InvalidInput(format!(
                "invalid crop '{s}': expected X,Y,WIDTH,HEIGHT"
            )));
        };
        if *width == 0 || *height == 0 {
            return Err(Error::InvalidInput(format!(
                "invalid crop '{s}': width and height must be non-zero"
            )));
        }

        Ok(Self {
            x: *x,
            y: *y,
            width: *width,
            height: *height,
        })
    }
}

/// A decoded image resized to the model input.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    /// Edge length of the square image.
    pub size: u32,
    /// Pixel data, row-major NHWC with [`CHANNELS`] channels.
    pub data: Vec<f32>,
}

impl PreparedImage {
    /// Tensor shape `[1, size, size, CHANNELS]`.
    #[must_use]
    pub const fn shape(&self) -> [usize; 4] {
        let size = self.size as usize;
        [1, size, size, CHANNELS]
    }
}

/// Reads the bytes behind an image reference.
///
/// Accepts plain filesystem paths and `file://` URIs.
///
/// # Errors
///
/// Returns [`Error::ImageDecode`] if the reference cannot be read.
pub fn load_image(reference: &str) -> Result<Vec<u8>> {
    let path = reference
        .strip_prefix(FILE_URI_PREFIX)
        .unwrap_or(reference);

    std::fs::read(Path::new(path)).map_err(|e| {
        tracing::error!(reference, error = %e, "Failed to read image");
        Error::ImageDecode(format!("{reference}: {e}"))
    })
}

/// Decodes, crops, and resizes image bytes into a model input.
///
/// # Errors
///
/// Returns [`Error::ImageDecode`] if the bytes are not a supported image, or
/// [`Error::InvalidInput`] if the crop rectangle falls outside the image.
pub fn prepare_image(bytes: &[u8], crop: Option<CropRect>, size: u32) -> Result<PreparedImage> {
    let image = image::load_from_memory(bytes).map_err(|e| {
        tracing::error!(error = %e, "Failed to decode image");
        Error::ImageDecode(e.to_string())
    })?;

    let image = match crop {
        Some(rect) => crop_image(&image, rect)?,
        None => image,
    };

    let resized = image.resize_exact(size, size, FilterType::Nearest).to_rgb8();
    let data = resized.into_raw().into_iter().map(f32::from).collect();

    Ok(PreparedImage { size, data })
}

fn crop_image(image: &DynamicImage, rect: CropRect) -> Result<DynamicImage> {
    let fits_x = rect
        .x
        .checked_add(rect.width)
        .is_some_and(|right| right <= image.width());
    let fits_y = rect
        .y
        .checked_add(rect.height)
        .is_some_and(|bottom| bottom <= image.height());

    if !(fits_x && fits_y) {
        return Err(Error::InvalidInput(format!(
            "crop {}x{}+{}+{} exceeds image bounds {}x{}",
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            image.width(),
            image.height()
        )));
    }

    Ok(image.crop_imm(rect.x, rect.y, rect.width, rect.height))
}
