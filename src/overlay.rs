//! Delivery of UI effects and render jobs to the overlay layer running in
//! the main webview.
//!
//! If the window is gone there is no receiving end. Mirroring the
//! original's one-shot re-injection, delivery then recreates the window,
//! waits briefly for it to load, and retries the event exactly once.

use std::time::Duration;

use serde_json::json;
use tauri::{AppHandle, Emitter, Manager};

use crate::capture::RenderJob;
use crate::i18n::Language;
use crate::selection::UiEffect;

pub const MAIN_WINDOW: &str = "main";

/// How long a recreated window gets to load before the retry.
const REINJECT_DELAY: Duration = Duration::from_millis(500);

/// Emit one UI effect to the overlay layer, localized for the session
/// language.
pub fn emit_effect(app: &AppHandle, effect: &UiEffect, lang: Language) {
    let (event, payload) = encode_effect(effect, lang);
    deliver(app, event, payload);
}

/// Carry a render job into the webview; used as the render bridge's
/// dispatcher.
pub fn dispatch_render_job(app: &AppHandle, job: &RenderJob) -> Result<(), String> {
    let window = app
        .get_webview_window(MAIN_WINDOW)
        .ok_or_else(|| "main window is gone".to_string())?;
    window
        .emit("capture:render", job)
        .map_err(|e| e.to_string())
}

fn encode_effect(effect: &UiEffect, lang: Language) -> (&'static str, serde_json::Value) {
    match effect {
        UiEffect::SessionStarted => ("selection:start", json!({})),
        UiEffect::ShowHover { rect } => ("selection:hover", json!({ "rect": rect })),
        UiEffect::HideHover => ("selection:hover-hide", json!({})),
        UiEffect::ShowHighlight { rect } => ("selection:highlight", json!({ "rect": rect })),
        UiEffect::ShowInfo {
            label,
            level,
            total,
            width,
            height,
            ttl,
        } => (
            "selection:info",
            json!({
                "label": label,
                "level": level,
                "total": total,
                "width": width,
                "height": height,
                "ttlMs": ttl.as_millis() as u64,
            }),
        ),
        UiEffect::Toast { notice, ttl } => (
            "selection:toast",
            json!({
                "text": notice.localize(lang),
                "ttlMs": ttl.as_millis() as u64,
            }),
        ),
        UiEffect::ClearOverlays => ("selection:clear", json!({})),
    }
}

fn deliver(app: &AppHandle, event: &'static str, payload: serde_json::Value) {
    if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
        if let Err(e) = window.emit(event, payload) {
            log::error!("failed to deliver '{event}': {e}");
        }
        return;
    }

    log::warn!("main window missing, recreating it before retrying '{event}'");
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        if let Err(e) = recreate_main_window(&app) {
            log::error!("could not recreate main window: {e}");
            return;
        }
        tokio::time::sleep(REINJECT_DELAY).await;
        match app.get_webview_window(MAIN_WINDOW) {
            Some(window) => {
                if let Err(e) = window.emit(event, payload) {
                    log::error!("retry delivery of '{event}' failed: {e}");
                }
            }
            None => log::error!("main window still missing, dropping '{event}'"),
        }
    });
}

fn recreate_main_window(app: &AppHandle) -> tauri::Result<()> {
    tauri::WebviewWindowBuilder::new(app, MAIN_WINDOW, tauri::WebviewUrl::App("index.html".into()))
        .title("domsnap")
        .build()?;
    Ok(())
}
