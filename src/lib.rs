//! domsnap — Tauri application entry point.
//!
//! This is the app shell that wires together:
//! - System tray and global shortcut (tray.rs)
//! - Selection engine (selection/, page/)
//! - Capture pipeline and render bridge (capture/)
//! - Tauri command surface (commands.rs)

pub mod capture;
pub mod commands;
pub mod download;
pub mod geom;
pub mod i18n;
pub mod overlay;
pub mod page;
pub mod selection;
pub mod session;
pub mod settings;
mod tray;

use tauri::Manager;

use session::Session;

/// Entry point — called by the Tauri runtime.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::init();

    tauri::Builder::default()
        .manage(Session::new())
        .invoke_handler(tauri::generate_handler![
            commands::dispatch,
            commands::sync_page,
            commands::pointer_moved,
            commands::wheel_input,
            commands::click_input,
            commands::key_input,
            commands::submit_render,
            commands::get_settings,
            commands::update_settings,
        ])
        .setup(|app| {
            log::info!("domsnap starting up");

            tray::setup_tray(app.handle())?;

            // Route render jobs from the capture pipeline into the webview.
            let handle = app.handle().clone();
            app.state::<Session>()
                .render_bridge
                .set_dispatcher(move |job| overlay::dispatch_render_job(&handle, job));

            #[cfg(desktop)]
            {
                use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};
                app.handle().plugin(
                    tauri_plugin_global_shortcut::Builder::new()
                        .with_handler(|app, _shortcut, event| {
                            if event.state() == ShortcutState::Pressed {
                                tray::toggle_selection(app);
                            }
                        })
                        .build(),
                )?;
                app.global_shortcut().register("ctrl+shift+e")?;
                log::info!("global shortcut registered (ctrl+shift+e)");
            }

            log::info!("tray initialized — ready to pick elements");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error running domsnap");
}
