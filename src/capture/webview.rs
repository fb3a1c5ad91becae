//! Webview-delegated renderers.
//!
//! The `vector` and `raster` strategies cannot run outside the page: the
//! overlay layer renders the selected element (DOM serialization or canvas
//! rasterization) and posts the result back as a PNG data URL. This module
//! owns that round trip — job ids, the reply channel, the timeout, and
//! decoding the data URL into raw PNG bytes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::capture::{CaptureBackend, CaptureError, CaptureMode, CaptureRequest};
use crate::page::NodeId;

/// How long a renderer may take before the pipeline moves on.
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(8);

const DATA_URL_PREFIX: &str = "data:image/png;base64,";
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// A render request as sent to the overlay layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub job: u64,
    pub mode: CaptureMode,
    pub node: NodeId,
    pub device_pixel_ratio: f64,
}

type RenderReply = Result<String, String>;
type Dispatcher = Box<dyn Fn(&RenderJob) -> Result<(), String> + Send + Sync>;

/// Pending render jobs and the channel back from the webview.
///
/// `capture()` blocks on the reply (it runs on a blocking task); the reply
/// arrives through a Tauri command that calls [`RenderBridge::resolve`].
pub struct RenderBridge {
    next_job: AtomicU64,
    pending: Mutex<HashMap<u64, SyncSender<RenderReply>>>,
    dispatcher: RwLock<Option<Dispatcher>>,
}

impl RenderBridge {
    pub fn new() -> Self {
        Self {
            next_job: AtomicU64::new(0),
            pending: Mutex::new(HashMap::new()),
            dispatcher: RwLock::new(None),
        }
    }

    /// Install the function that carries a job into the webview. Called once
    /// at app setup, when the app handle exists.
    pub fn set_dispatcher<F>(&self, dispatcher: F)
    where
        F: Fn(&RenderJob) -> Result<(), String> + Send + Sync + 'static,
    {
        *self.dispatcher.write().unwrap() = Some(Box::new(dispatcher));
    }

    /// Resolve a job from the webview. Unknown ids are ignored — a reply
    /// that arrives after its timeout has already fallen through.
    pub fn resolve(&self, job: u64, reply: RenderReply) {
        let sender = self.pending.lock().unwrap().remove(&job);
        match sender {
            Some(tx) => {
                let _ = tx.send(reply);
            }
            None => log::warn!("render reply for unknown job {job} dropped"),
        }
    }

    fn request(&self, job: RenderJob, timeout: Duration) -> Result<String, CaptureError> {
        let (tx, rx) = sync_channel(1);
        self.pending.lock().unwrap().insert(job.job, tx);

        let dispatched = match self.dispatcher.read().unwrap().as_ref() {
            Some(dispatch) => dispatch(&job),
            None => Err("no render dispatcher installed".to_string()),
        };
        if let Err(reason) = dispatched {
            self.pending.lock().unwrap().remove(&job.job);
            return Err(CaptureError::Renderer(reason));
        }

        match rx.recv_timeout(timeout) {
            Ok(Ok(data_url)) => Ok(data_url),
            Ok(Err(reason)) => Err(CaptureError::Renderer(reason)),
            Err(_) => {
                self.pending.lock().unwrap().remove(&job.job);
                Err(CaptureError::RendererTimeout(timeout))
            }
        }
    }

    fn next_job_id(&self) -> u64 {
        self.next_job.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for RenderBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// One webview-delegated strategy (`vector` or `raster`).
pub struct WebviewRenderer {
    mode: CaptureMode,
    bridge: Arc<RenderBridge>,
    timeout: Duration,
}

impl WebviewRenderer {
    pub fn new(mode: CaptureMode, bridge: Arc<RenderBridge>) -> Self {
        debug_assert!(mode != CaptureMode::Screen, "screen mode never renders in the webview");
        Self {
            mode,
            bridge,
            timeout: RENDER_TIMEOUT,
        }
    }
}

impl CaptureBackend for WebviewRenderer {
    fn mode(&self) -> CaptureMode {
        self.mode
    }

    fn capture(&self, request: &CaptureRequest) -> Result<Vec<u8>, CaptureError> {
        let job = RenderJob {
            job: self.bridge.next_job_id(),
            mode: self.mode,
            node: request.node,
            device_pixel_ratio: request.device_pixel_ratio,
        };
        log::info!("render job {} ('{}') for {}", job.job, self.mode, request.descriptor.label());
        let data_url = self.bridge.request(job, self.timeout)?;
        decode_png_data_url(&data_url)
    }
}

/// Strip the `data:image/png;base64,` prefix and decode the payload,
/// verifying the PNG signature so a renderer cannot hand back junk.
pub fn decode_png_data_url(data_url: &str) -> Result<Vec<u8>, CaptureError> {
    let payload = data_url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| CaptureError::InvalidImageData("not a PNG data URL".to_string()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| CaptureError::InvalidImageData(format!("base64: {e}")))?;

    if bytes.len() < PNG_MAGIC.len() || bytes[..PNG_MAGIC.len()] != PNG_MAGIC {
        return Err(CaptureError::InvalidImageData(
            "missing PNG signature".to_string(),
        ));
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn png_data_url() -> String {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 13]);
        format!("{DATA_URL_PREFIX}{}", STANDARD.encode(bytes))
    }

    #[test]
    fn decodes_valid_data_url() {
        let bytes = decode_png_data_url(&png_data_url()).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);
    }

    #[test]
    fn rejects_wrong_prefix() {
        let err = decode_png_data_url("data:image/jpeg;base64,AAAA").unwrap_err();
        assert!(matches!(err, CaptureError::InvalidImageData(_)));
    }

    #[test]
    fn rejects_non_png_payload() {
        let url = format!("{DATA_URL_PREFIX}{}", STANDARD.encode(b"not a png"));
        let err = decode_png_data_url(&url).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidImageData(_)));
    }

    #[test]
    fn round_trip_through_the_bridge() {
        let bridge = Arc::new(RenderBridge::new());
        bridge.set_dispatcher({
            let bridge = Arc::downgrade(&bridge);
            move |job: &RenderJob| {
                // Answer from another thread, like the webview would.
                let bridge = bridge.clone();
                let job_id = job.job;
                thread::spawn(move || {
                    if let Some(bridge) = bridge.upgrade() {
                        bridge.resolve(job_id, Ok(png_data_url()));
                    }
                });
                Ok(())
            }
        });

        let renderer = WebviewRenderer::new(CaptureMode::Vector, bridge);
        let request = CaptureRequest {
            node: NodeId(1),
            descriptor: crate::page::NodeDescriptor {
                tag: "div".into(),
                id: None,
                first_class: None,
            },
            viewport_rect: crate::geom::Rect::new(0.0, 0.0, 10.0, 10.0),
            page_rect: crate::geom::Rect::new(0.0, 0.0, 10.0, 10.0),
            screen_rect: crate::geom::Rect::new(0.0, 0.0, 10.0, 10.0),
            device_pixel_ratio: 1.0,
        };
        let bytes = renderer.capture(&request).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);
    }

    #[test]
    fn renderer_error_propagates() {
        let bridge = Arc::new(RenderBridge::new());
        bridge.set_dispatcher({
            let bridge = Arc::downgrade(&bridge);
            move |job: &RenderJob| {
                let bridge = bridge.clone();
                let job_id = job.job;
                thread::spawn(move || {
                    if let Some(bridge) = bridge.upgrade() {
                        bridge.resolve(job_id, Err("canvas tainted".to_string()));
                    }
                });
                Ok(())
            }
        });

        let renderer = WebviewRenderer::new(CaptureMode::Raster, bridge);
        let request = CaptureRequest {
            node: NodeId(1),
            descriptor: crate::page::NodeDescriptor {
                tag: "div".into(),
                id: None,
                first_class: None,
            },
            viewport_rect: crate::geom::Rect::new(0.0, 0.0, 10.0, 10.0),
            page_rect: crate::geom::Rect::new(0.0, 0.0, 10.0, 10.0),
            screen_rect: crate::geom::Rect::new(0.0, 0.0, 10.0, 10.0),
            device_pixel_ratio: 1.0,
        };
        let err = renderer.capture(&request).unwrap_err();
        assert!(matches!(err, CaptureError::Renderer(_)));
    }

    #[test]
    fn missing_dispatcher_is_a_renderer_error() {
        let bridge = RenderBridge::new();
        let job = RenderJob {
            job: bridge.next_job_id(),
            mode: CaptureMode::Vector,
            node: NodeId(0),
            device_pixel_ratio: 1.0,
        };
        let err = bridge.request(job, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, CaptureError::Renderer(_)));
    }

    #[test]
    fn late_reply_is_ignored() {
        let bridge = RenderBridge::new();
        // No such job pending; must not panic.
        bridge.resolve(42, Ok(png_data_url()));
    }
}
