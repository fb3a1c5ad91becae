//! The per-app session object — sole owner of selection state, the current
//! page snapshot, settings, and the render bridge.
//!
//! The original guarded itself with a page-global "already initialized"
//! flag; here the session is explicit state constructed once and managed by
//! Tauri, and every handler reaches it by reference.

use std::sync::{Arc, Mutex};

use crate::capture::RenderBridge;
use crate::i18n::Language;
use crate::page::PageSnapshot;
use crate::selection::{SelectionConfig, SelectionController};
use crate::settings::{self, Settings};

pub struct Session {
    pub controller: Mutex<SelectionController>,
    /// Latest layout snapshot from the webview; `None` until the first sync.
    pub page: Mutex<Option<PageSnapshot>>,
    pub settings: Mutex<Settings>,
    pub render_bridge: Arc<RenderBridge>,
}

impl Session {
    pub fn new() -> Self {
        let settings = settings::load();
        log::info!(
            "session created (default mode '{}', language {})",
            settings.default_capture_mode,
            settings.language.code()
        );
        Self {
            controller: Mutex::new(SelectionController::new(SelectionConfig::default())),
            page: Mutex::new(None),
            settings: Mutex::new(settings),
            render_bridge: Arc::new(RenderBridge::new()),
        }
    }

    pub fn language(&self) -> Language {
        self.settings
            .lock()
            .map(|s| s.language)
            .unwrap_or_default()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
