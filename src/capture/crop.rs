//! Pixel-space cropping — pure functions from screenshot to PNG bytes.
//!
//! No infrastructure dependencies: pixel data in, pixel data out.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::geom::Rect;

/// Margin added around the element box so shadows and raised edges survive
/// the crop, in CSS pixels.
pub const EDGE_MARGIN: f64 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("crop rectangle has zero width or height")]
    ZeroDimension,

    #[error("crop rectangle lies outside the {width}x{height} screenshot")]
    OutsideImage { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Map an element box in screen coordinates onto a screenshot.
///
/// Scales by the device pixel ratio, widens by [`EDGE_MARGIN`], and clamps
/// the result to the image bounds. Returns `(x, y, width, height)` in
/// physical pixels.
pub fn clamped_crop_region(
    image_width: u32,
    image_height: u32,
    rect: Rect,
    scale: f64,
) -> Result<(u32, u32, u32, u32), CropError> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Err(CropError::ZeroDimension);
    }
    let scale = if scale > 0.0 { scale } else { 1.0 };

    let x0 = ((rect.left - EDGE_MARGIN) * scale).floor().max(0.0) as u32;
    let y0 = ((rect.top - EDGE_MARGIN) * scale).floor().max(0.0) as u32;
    let x1 = (((rect.right() + EDGE_MARGIN) * scale).ceil().max(0.0) as u32).min(image_width);
    let y1 = (((rect.bottom() + EDGE_MARGIN) * scale).ceil().max(0.0) as u32).min(image_height);

    if x0 >= x1 || y0 >= y1 {
        return Err(CropError::OutsideImage {
            width: image_width,
            height: image_height,
        });
    }

    Ok((x0, y0, x1 - x0, y1 - y0))
}

/// Crop a screenshot to the given rectangle and return PNG bytes.
pub fn crop_to_png_bytes(
    image: &DynamicImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, CropError> {
    if width == 0 || height == 0 {
        return Err(CropError::ZeroDimension);
    }

    let (img_width, img_height) = (image.width(), image.height());
    if x + width > img_width || y + height > img_height {
        return Err(CropError::OutsideImage {
            width: img_width,
            height: img_height,
        });
    }

    let cropped = image.crop_imm(x, y, width, height);

    let mut png_bytes: Vec<u8> = Vec::new();
    cropped
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| CropError::EncodingFailed(e.to_string()))?;

    Ok(png_bytes)
}
