//! Screen-crop backend — screenshot the primary monitor with `xcap`, then
//! crop the element's box out of it.
//!
//! This is the infrastructure layer; the cropping math lives in
//! [`super::crop`] where it can be tested without a display.

use std::time::Instant;

use image::DynamicImage;
use xcap::Monitor;

use crate::capture::{crop, CaptureBackend, CaptureError, CaptureMode, CaptureRequest};

pub struct ScreenCropBackend;

/// Capture the primary monitor as a `DynamicImage`. If no monitor reports
/// as primary, the first one is used.
fn capture_primary_monitor() -> Result<DynamicImage, CaptureError> {
    let monitors =
        Monitor::all().map_err(|e| CaptureError::Screen(format!("monitor enumeration: {e}")))?;

    let primary = monitors
        .into_iter()
        .find(|m| m.is_primary().unwrap_or(false))
        .or_else(|| {
            let all = Monitor::all().ok()?;
            all.into_iter().next()
        })
        .ok_or_else(|| CaptureError::Screen("no monitor found".to_string()))?;

    let image = primary
        .capture_image()
        .map_err(|e| CaptureError::Screen(e.to_string()))?;

    Ok(DynamicImage::ImageRgba8(image))
}

impl CaptureBackend for ScreenCropBackend {
    fn mode(&self) -> CaptureMode {
        CaptureMode::Screen
    }

    fn capture(&self, request: &CaptureRequest) -> Result<Vec<u8>, CaptureError> {
        let start = Instant::now();
        let screenshot = capture_primary_monitor()?;
        log::info!(
            "screen captured ({}x{}) in {}ms",
            screenshot.width(),
            screenshot.height(),
            start.elapsed().as_millis()
        );

        let (x, y, width, height) = crop::clamped_crop_region(
            screenshot.width(),
            screenshot.height(),
            request.screen_rect,
            request.device_pixel_ratio,
        )?;

        let png = crop::crop_to_png_bytes(&screenshot, x, y, width, height)?;
        log::info!(
            "cropped {}x{} at {},{} — {} bytes in {}ms",
            width,
            height,
            x,
            y,
            png.len(),
            start.elapsed().as_millis()
        );
        Ok(png)
    }
}
