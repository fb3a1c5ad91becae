//! Tauri command surface and effect application.
//!
//! The control commands arrive as one tagged union dispatched by a single
//! handler and acknowledged with a success flag. High-rate input events
//! (pointer, wheel, click, key) and page-snapshot sync are separate
//! commands feeding the same session.

use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Manager, State};

use crate::capture::{
    self, CaptureBackend, CaptureMode, CaptureRequest, ScreenCropBackend, WebviewRenderer,
};
use crate::download;
use crate::geom::Point;
use crate::i18n::Notice;
use crate::overlay;
use crate::page::PageSnapshot;
use crate::selection::{Effect, UiEffect, WheelDirection};
use crate::session::Session;
use crate::settings::{self, Settings};

/// Control commands, mirrored by the overlay layer and the tray.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    StartCapture {
        #[serde(default)]
        mode: Option<CaptureMode>,
    },
    StopCapture,
    SetCaptureMode {
        mode: CaptureMode,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<CaptureMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    fn ok(mode: Option<CaptureMode>) -> Self {
        Self {
            success: true,
            mode,
            error: None,
        }
    }

    fn fail(error: String) -> Self {
        Self {
            success: false,
            mode: None,
            error: Some(error),
        }
    }
}

#[tauri::command]
pub fn dispatch(app: AppHandle, session: State<'_, Session>, command: Command) -> Ack {
    log::info!("command: {:?}", command);
    match command {
        Command::StartCapture { mode } => {
            let mode = match mode {
                Some(mode) => mode,
                None => match session.settings.lock() {
                    Ok(s) => s.default_capture_mode,
                    Err(e) => return Ack::fail(e.to_string()),
                },
            };
            let effects = match session.controller.lock() {
                Ok(mut controller) => controller.start(mode),
                Err(e) => return Ack::fail(e.to_string()),
            };
            apply_effects(&app, effects);
            Ack::ok(Some(mode))
        }
        Command::StopCapture => {
            let effects = match session.controller.lock() {
                Ok(mut controller) => controller.stop(),
                Err(e) => return Ack::fail(e.to_string()),
            };
            apply_effects(&app, effects);
            Ack::ok(None)
        }
        Command::SetCaptureMode { mode } => {
            match session.controller.lock() {
                Ok(mut controller) => controller.set_mode(mode),
                Err(e) => return Ack::fail(e.to_string()),
            }
            Ack::ok(Some(mode))
        }
    }
}

/// The webview posts a fresh layout snapshot whenever the page settles
/// (load, scroll, mutation).
#[tauri::command]
pub fn sync_page(session: State<'_, Session>, snapshot: PageSnapshot) -> Result<(), String> {
    log::debug!("page snapshot: {} nodes", snapshot.len());
    *session.page.lock().map_err(|e| e.to_string())? = Some(snapshot);
    Ok(())
}

#[tauri::command]
pub fn pointer_moved(
    app: AppHandle,
    session: State<'_, Session>,
    x: f64,
    y: f64,
) -> Result<(), String> {
    let effects = {
        let page = session.page.lock().map_err(|e| e.to_string())?;
        let Some(snapshot) = page.as_ref() else {
            return Ok(());
        };
        let mut controller = session.controller.lock().map_err(|e| e.to_string())?;
        controller.pointer_moved(Point::new(x, y), snapshot)
    };
    apply_effects(&app, effects);
    Ok(())
}

#[tauri::command]
pub fn wheel_input(
    app: AppHandle,
    session: State<'_, Session>,
    delta_y: f64,
) -> Result<(), String> {
    let effects = {
        let page = session.page.lock().map_err(|e| e.to_string())?;
        let Some(snapshot) = page.as_ref() else {
            return Ok(());
        };
        let mut controller = session.controller.lock().map_err(|e| e.to_string())?;
        controller.wheel(WheelDirection::from_delta_y(delta_y), snapshot)
    };
    apply_effects(&app, effects);
    Ok(())
}

#[tauri::command]
pub fn click_input(app: AppHandle, session: State<'_, Session>) -> Result<(), String> {
    let effects = {
        let page = session.page.lock().map_err(|e| e.to_string())?;
        let Some(snapshot) = page.as_ref() else {
            return Ok(());
        };
        let mut controller = session.controller.lock().map_err(|e| e.to_string())?;
        controller.click(snapshot)
    };
    apply_effects(&app, effects);
    Ok(())
}

#[tauri::command]
pub fn key_input(app: AppHandle, session: State<'_, Session>, key: String) -> Result<(), String> {
    if key != "Escape" {
        return Ok(());
    }
    let effects = {
        let mut controller = session.controller.lock().map_err(|e| e.to_string())?;
        controller.escape_pressed()
    };
    apply_effects(&app, effects);
    Ok(())
}

/// The overlay layer answers a render job with a PNG data URL or an error.
#[tauri::command]
pub fn submit_render(
    session: State<'_, Session>,
    job: u64,
    data_url: Option<String>,
    error: Option<String>,
) -> Result<(), String> {
    let reply = match data_url {
        Some(url) => Ok(url),
        None => Err(error.unwrap_or_else(|| "renderer returned no data".to_string())),
    };
    session.render_bridge.resolve(job, reply);
    Ok(())
}

#[tauri::command]
pub fn get_settings(session: State<'_, Session>) -> Result<Settings, String> {
    session
        .settings
        .lock()
        .map(|s| *s)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn update_settings(session: State<'_, Session>, updated: Settings) -> Result<(), String> {
    *session.settings.lock().map_err(|e| e.to_string())? = updated;
    settings::save(&updated).map_err(|e| e.to_string())
}

/// Apply a handler's effects: UI effects go to the overlay layer, rebuild
/// timers are armed on the async runtime, a confirmation starts the capture
/// pipeline on a blocking task.
pub fn apply_effects(app: &AppHandle, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::Ui(ui) => {
                let lang = app.state::<Session>().language();
                overlay::emit_effect(app, &ui, lang);
            }
            Effect::ScheduleRebuild { seq, delay } => {
                let app = app.clone();
                tauri::async_runtime::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let effects = {
                        let session = app.state::<Session>();
                        let page = match session.page.lock() {
                            Ok(page) => page,
                            Err(_) => return,
                        };
                        let Some(snapshot) = page.as_ref() else {
                            return;
                        };
                        let mut controller = match session.controller.lock() {
                            Ok(c) => c,
                            Err(_) => return,
                        };
                        controller.rebuild_due(seq, snapshot)
                    };
                    apply_effects(&app, effects);
                });
            }
            Effect::Confirm(request) => spawn_capture(app, request),
        }
    }
}

/// Run the capture pipeline for one confirmed selection. The controller is
/// already Inactive by the time this is scheduled; selection teardown never
/// waits for the capture.
fn spawn_capture(app: &AppHandle, request: CaptureRequest) {
    let app = app.clone();
    tauri::async_runtime::spawn_blocking(move || {
        let session = app.state::<Session>();
        let lang = session.language();
        let (mode, toast_ttl) = match session.controller.lock() {
            Ok(controller) => (controller.mode(), controller.config().toast_ttl),
            Err(e) => {
                log::error!("capture aborted: {e}");
                return;
            }
        };

        let toast = |notice: Notice| {
            overlay::emit_effect(
                &app,
                &UiEffect::Toast {
                    notice,
                    ttl: toast_ttl,
                },
                lang,
            );
        };

        // Advisory only: an element taller or wider than the viewport still
        // captures, but the screen crop will clip it.
        if let Ok(page) = session.page.lock() {
            if let Some(snapshot) = page.as_ref() {
                let oversized = (snapshot.viewport_width > 0.0
                    && request.viewport_rect.width > snapshot.viewport_width)
                    || (snapshot.viewport_height > 0.0
                        && request.viewport_rect.height > snapshot.viewport_height);
                if oversized {
                    toast(Notice::ElementTooLarge);
                }
            }
        }

        let screen = ScreenCropBackend;
        let vector = WebviewRenderer::new(CaptureMode::Vector, session.render_bridge.clone());
        let raster = WebviewRenderer::new(CaptureMode::Raster, session.render_bridge.clone());
        let backends: [&dyn CaptureBackend; 3] = [&screen, &vector, &raster];

        let mut on_fallback = |to: CaptureMode, err: &capture::CaptureError| {
            log::warn!("falling back to '{to}' after: {err}");
            toast(Notice::FallingBack { to });
        };

        match capture::run_with_fallback(&backends, mode, &request, &mut on_fallback) {
            Ok(outcome) => match download::save_png(&outcome.png, &request.descriptor) {
                Ok((_path, filename)) => toast(Notice::Saved { filename }),
                Err(e) => {
                    log::error!("download failed: {e}");
                    toast(Notice::SaveFailed {
                        reason: e.to_string(),
                    });
                }
            },
            Err(e) => {
                log::error!("capture failed: {e}");
                toast(Notice::CaptureFailed {
                    reason: e.to_string(),
                });
            }
        }
    });
}
