//! Capture domain — turning a confirmed selection into PNG bytes.
//!
//! Backends are swappable strategies behind [`CaptureBackend`]. The
//! pipeline tries the preferred strategy first, then walks a fixed fallback
//! chain (chosen → vector renderer → raster renderer), surfacing a notice
//! at each transition.

mod crop;
mod screen;
mod webview;

pub use crop::{clamped_crop_region, crop_to_png_bytes, CropError, EDGE_MARGIN};
pub use screen::ScreenCropBackend;
pub use webview::{decode_png_data_url, RenderBridge, RenderJob, WebviewRenderer, RENDER_TIMEOUT};

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::geom::Rect;
use crate::page::{NodeDescriptor, NodeId};

/// The three capture strategies, in wire form (`"screen"`, `"vector"`,
/// `"raster"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Screenshot the monitor, crop the element's box out of it.
    Screen,
    /// DOM-serialization renderer running in the webview.
    Vector,
    /// Canvas rasterization renderer running in the webview.
    Raster,
}

impl CaptureMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CaptureMode::Screen => "screen",
            CaptureMode::Vector => "vector",
            CaptureMode::Raster => "raster",
        }
    }

    /// Attempt order for this preference: the chosen strategy first, then
    /// the DOM renderers in fixed order.
    pub fn fallback_chain(self) -> Vec<CaptureMode> {
        let mut chain = vec![self];
        for mode in [CaptureMode::Vector, CaptureMode::Raster] {
            if mode != self {
                chain.push(mode);
            }
        }
        chain
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a backend needs about one confirmed selection. Produced once
/// per confirmation, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub node: NodeId,
    pub descriptor: NodeDescriptor,
    /// Element box in viewport coordinates.
    pub viewport_rect: Rect,
    /// Element box in page coordinates (viewport + scroll offsets).
    pub page_rect: Rect,
    /// Element box in screen coordinates (viewport + window origin), used
    /// by the screen-crop backend.
    pub screen_rect: Rect,
    pub device_pixel_ratio: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("capture target has degenerate size {width:.0}x{height:.0}")]
    DegenerateTarget { width: f64, height: f64 },

    #[error("no backend registered for mode '{0}'")]
    BackendUnavailable(CaptureMode),

    #[error("screen capture failed: {0}")]
    Screen(String),

    #[error("renderer did not answer within {}s", .0.as_secs())]
    RendererTimeout(Duration),

    #[error("renderer failed: {0}")]
    Renderer(String),

    #[error("renderer returned invalid image data: {0}")]
    InvalidImageData(String),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error("all capture backends failed, last error: {0}")]
    Exhausted(String),
}

/// One interchangeable capture strategy.
pub trait CaptureBackend: Send + Sync {
    fn mode(&self) -> CaptureMode;

    fn capture(&self, request: &CaptureRequest) -> Result<Vec<u8>, CaptureError>;
}

pub struct CaptureOutcome {
    pub png: Vec<u8>,
    /// The strategy that actually produced the image.
    pub mode: CaptureMode,
}

/// Run the fallback chain for `preferred` over the given backends.
///
/// Degenerate geometry is rejected before any backend runs. Every time an
/// attempt fails and another strategy remains, `on_fallback` is called with
/// the strategy about to be tried and the error that forced the switch.
pub fn run_with_fallback(
    backends: &[&dyn CaptureBackend],
    preferred: CaptureMode,
    request: &CaptureRequest,
    on_fallback: &mut dyn FnMut(CaptureMode, &CaptureError),
) -> Result<CaptureOutcome, CaptureError> {
    if request.viewport_rect.is_degenerate() {
        return Err(CaptureError::DegenerateTarget {
            width: request.viewport_rect.width,
            height: request.viewport_rect.height,
        });
    }

    let chain = preferred.fallback_chain();
    let mut last_error: Option<CaptureError> = None;

    for (position, mode) in chain.iter().enumerate() {
        let attempt = match backends.iter().find(|b| b.mode() == *mode) {
            Some(backend) => {
                let start = Instant::now();
                let result = backend.capture(request);
                if result.is_ok() {
                    log::info!(
                        "captured {} via '{}' in {}ms",
                        request.descriptor.label(),
                        mode,
                        start.elapsed().as_millis()
                    );
                }
                result
            }
            None => Err(CaptureError::BackendUnavailable(*mode)),
        };

        match attempt {
            Ok(png) => return Ok(CaptureOutcome { png, mode: *mode }),
            Err(err) => {
                log::warn!("capture via '{}' failed: {}", mode, err);
                if let Some(next) = chain.get(position + 1) {
                    on_fallback(*next, &err);
                }
                last_error = Some(err);
            }
        }
    }

    let reason = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no backends configured".to_string());
    Err(CaptureError::Exhausted(reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBackend {
        mode: CaptureMode,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FixedBackend {
        fn ok(mode: CaptureMode) -> Self {
            Self {
                mode,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(mode: CaptureMode) -> Self {
            Self {
                fail: true,
                ..Self::ok(mode)
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CaptureBackend for FixedBackend {
        fn mode(&self) -> CaptureMode {
            self.mode
        }

        fn capture(&self, _request: &CaptureRequest) -> Result<Vec<u8>, CaptureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(CaptureError::Renderer("boom".into()))
            } else {
                Ok(vec![1, 2, 3])
            }
        }
    }

    fn request() -> CaptureRequest {
        CaptureRequest {
            node: NodeId(3),
            descriptor: NodeDescriptor {
                tag: "div".into(),
                id: None,
                first_class: None,
            },
            viewport_rect: Rect::new(10.0, 10.0, 100.0, 80.0),
            page_rect: Rect::new(10.0, 10.0, 100.0, 80.0),
            screen_rect: Rect::new(10.0, 10.0, 100.0, 80.0),
            device_pixel_ratio: 1.0,
        }
    }

    #[test]
    fn fallback_chain_orders() {
        assert_eq!(
            CaptureMode::Screen.fallback_chain(),
            vec![CaptureMode::Screen, CaptureMode::Vector, CaptureMode::Raster]
        );
        assert_eq!(
            CaptureMode::Raster.fallback_chain(),
            vec![CaptureMode::Raster, CaptureMode::Vector]
        );
    }

    #[test]
    fn preferred_backend_wins_without_fallback() {
        let vector = FixedBackend::ok(CaptureMode::Vector);
        let raster = FixedBackend::ok(CaptureMode::Raster);
        let backends: [&dyn CaptureBackend; 2] = [&vector, &raster];

        let mut fallbacks = Vec::new();
        let outcome = run_with_fallback(&backends, CaptureMode::Vector, &request(), &mut |m, _| {
            fallbacks.push(m)
        })
        .unwrap();

        assert_eq!(outcome.mode, CaptureMode::Vector);
        assert!(fallbacks.is_empty());
        assert_eq!(vector.call_count(), 1);
        assert_eq!(raster.call_count(), 0);
    }

    #[test]
    fn failing_primary_invokes_fallback_exactly_once() {
        let vector = FixedBackend::failing(CaptureMode::Vector);
        let raster = FixedBackend::ok(CaptureMode::Raster);
        let backends: [&dyn CaptureBackend; 2] = [&vector, &raster];

        let mut fallbacks = Vec::new();
        let outcome = run_with_fallback(&backends, CaptureMode::Vector, &request(), &mut |m, _| {
            fallbacks.push(m)
        })
        .unwrap();

        assert_eq!(outcome.mode, CaptureMode::Raster);
        assert_eq!(fallbacks, vec![CaptureMode::Raster]);
        assert_eq!(vector.call_count(), 1);
        assert_eq!(raster.call_count(), 1);
    }

    #[test]
    fn missing_backend_counts_as_failed_attempt() {
        let raster = FixedBackend::ok(CaptureMode::Raster);
        let backends: [&dyn CaptureBackend; 1] = [&raster];

        let mut fallbacks = Vec::new();
        let outcome = run_with_fallback(&backends, CaptureMode::Screen, &request(), &mut |m, _| {
            fallbacks.push(m)
        })
        .unwrap();

        assert_eq!(outcome.mode, CaptureMode::Raster);
        assert_eq!(fallbacks, vec![CaptureMode::Vector, CaptureMode::Raster]);
    }

    #[test]
    fn exhausted_chain_reports_last_error() {
        let vector = FixedBackend::failing(CaptureMode::Vector);
        let raster = FixedBackend::failing(CaptureMode::Raster);
        let backends: [&dyn CaptureBackend; 2] = [&vector, &raster];

        let err = run_with_fallback(&backends, CaptureMode::Vector, &request(), &mut |_, _| {})
            .unwrap_err();
        assert!(matches!(err, CaptureError::Exhausted(_)));
    }

    #[test]
    fn degenerate_target_rejected_before_backends_run() {
        let vector = FixedBackend::ok(CaptureMode::Vector);
        let backends: [&dyn CaptureBackend; 1] = [&vector];

        let mut bad = request();
        bad.viewport_rect = Rect::new(0.0, 0.0, 0.0, 40.0);
        let err =
            run_with_fallback(&backends, CaptureMode::Vector, &bad, &mut |_, _| {}).unwrap_err();
        assert!(matches!(err, CaptureError::DegenerateTarget { .. }));
        assert_eq!(vector.call_count(), 0);
    }
}
