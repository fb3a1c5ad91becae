//! System tray setup and click handler.
//!
//! The tray icon is the desktop stand-in for the original's toolbar button
//! and context-menu entry: clicking it toggles a selection session with the
//! stored default capture mode.

use tauri::{
    menu::{MenuBuilder, MenuItemBuilder},
    tray::TrayIconBuilder,
    AppHandle, Manager,
};

use crate::commands;
use crate::session::Session;

/// Left-click: toggle element selection. Right-click: context menu.
pub fn setup_tray(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    let toggle_item = MenuItemBuilder::with_id("toggle", "Start element capture").build(app)?;
    let quit_item = MenuItemBuilder::with_id("quit", "Quit domsnap").build(app)?;
    let menu = MenuBuilder::new(app)
        .item(&toggle_item)
        .item(&quit_item)
        .build()?;

    let mut builder = TrayIconBuilder::new()
        .tooltip("domsnap — click to pick an element")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray_icon, event| {
            if let tauri::tray::TrayIconEvent::Click {
                button: tauri::tray::MouseButton::Left,
                ..
            } = event
            {
                log::info!("tray icon clicked — toggling selection");
                toggle_selection(tray_icon.app_handle());
            }
        })
        .on_menu_event(|app, event| {
            if event.id() == "toggle" {
                toggle_selection(app);
            } else if event.id() == "quit" {
                log::info!("quit requested from tray menu");
                app.exit(0);
            }
        });

    if let Some(icon) = app.default_window_icon() {
        builder = builder.icon(icon.clone());
    }
    let _tray = builder.build(app)?;

    Ok(())
}

/// Start a session with the stored default mode, or stop the running one.
pub fn toggle_selection(app: &AppHandle) {
    let session = app.state::<Session>();
    let effects = {
        let mut controller = match session.controller.lock() {
            Ok(c) => c,
            Err(e) => {
                log::error!("session lock poisoned: {e}");
                return;
            }
        };
        if controller.is_selecting() {
            controller.stop()
        } else {
            let mode = session
                .settings
                .lock()
                .map(|s| s.default_capture_mode)
                .unwrap_or(crate::capture::CaptureMode::Vector);
            controller.start(mode)
        }
    };
    commands::apply_effects(app, effects);
}
