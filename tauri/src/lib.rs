//! GroveMap Tauri application library.
//!
//! This crate provides the Tauri backend for the GroveMap desktop viewer.
//! It bridges the frontend (webview) to the core cooldown runtime via IPC
//! commands.
//!
//! # Architecture
//!
//! 1. **AppState** (this module) -- owns the `DecorRuntime`, which wraps
//!    `Sys` in a `Mutex` for thread-safe access from command handlers.
//!
//! 2. **IPC handlers** (`ipc` module) -- thin `#[tauri::command]` functions
//!    that pull `AppState` from Tauri's managed state and delegate to it.
//!
//! 3. **`run()`** -- assembles the Tauri application, subscribes the window
//!    event emitter to the surface hub (so icon, popup, and list row all
//!    re-render on every state change), starts the runtime, and installs
//!    the tray menu.

pub mod ipc;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use grovemap_core::command::Command;
use grovemap_core::decor::events::DecorEvent;
use grovemap_core::decor::runtime::DecorRuntime;
use grovemap_core::response::Response;
use grovemap_core::sys::Sys;
use grovemap_core::view::surfaces;
use tauri::{Emitter, Manager};


/// Menu item IDs used by the tray icon menu.
///
/// Exposed as constants so they can be tested and referenced consistently.
pub mod tray_menu_ids {
    pub const RELOAD: &str = "reload";
    pub const RESET: &str = "reset";
    pub const QUIT: &str = "quit";
}

/// Window events carrying decoration state changes to the frontend.
pub mod channels {
    /// Decorated / expired / reset notifications.
    pub const CHANGED: &str = "decor://changed";
    /// Once-per-second popup countdown ticks.
    pub const TICK: &str = "decor://tick";
    /// The marker catalog was re-read from disk.
    pub const MARKERS_RELOADED: &str = "markers://reloaded";
}


/// Application state shared across Tauri commands.
pub struct AppState {
    runtime: Arc<DecorRuntime>,
}


impl AppState {
    /// Create the state for the given config dir.
    ///
    /// Must run inside the async runtime so the core components can capture
    /// their timer handle.
    pub fn new(config_dir: PathBuf) -> AppState {
        let sys = Arc::new(Mutex::new(Sys::new(config_dir)));
        AppState {
            runtime: DecorRuntime::new(sys),
        }
    }

    pub fn runtime(&self) -> &Arc<DecorRuntime> {
        &self.runtime
    }

    /// Execute an arbitrary Command through the core runtime.
    pub fn execute(&self, cmd: Command) -> Response {
        self.runtime.execute(cmd)
    }

    /// Return frontend-relevant settings as a JSON string.
    pub fn get_settings(&self) -> String {
        let sys = self.runtime.sys().lock().unwrap();
        let s = sys.settings();
        serde_json::json!({
            "width": s.width,
            "height": s.height,
            "min_zoom": s.min_zoom,
            "max_zoom": s.max_zoom,
            "cooldown_ms": s.decor.cooldown_ms,
        })
        .to_string()
    }

    /// Map layer data: position and icon content for every marker, in
    /// display order.
    pub fn map_markers_json(&self) -> String {
        let sys = self.runtime.sys().lock().unwrap();
        let now = grovemap_core::now_ms();
        let entries: Vec<serde_json::Value> = sys
            .catalog()
            .sorted()
            .into_iter()
            .map(|m| {
                let decorated = sys.store().is_decorated(&m.id, now);
                serde_json::json!({
                    "id": m.id,
                    "x": m.x,
                    "y": m.y,
                    "icon": surfaces::icon_view(m, sys.catalog().numbers(), decorated),
                })
            })
            .collect();
        serde_json::Value::Array(entries).to_string()
    }

    // -------------------------------------------------------------------
    // Top-level commands
    // -------------------------------------------------------------------

    pub fn status(&self) -> Response {
        self.execute(Command::Status { format: None })
    }

    pub fn markers_list(&self) -> Response {
        self.execute(Command::MarkersList)
    }

    pub fn marker_popup(&self, id: String) -> Response {
        self.execute(Command::MarkerShow { id })
    }

    pub fn reload_markers(&self) -> Response {
        self.execute(Command::MarkersReload)
    }

    // -------------------------------------------------------------------
    // Decoration commands
    // -------------------------------------------------------------------

    pub fn decorate(&self, id: String) -> Response {
        self.execute(Command::Decorate { id })
    }

    pub fn reset(&self) -> Response {
        self.execute(Command::Reset)
    }

    // -------------------------------------------------------------------
    // Popup countdown lifecycle
    // -------------------------------------------------------------------

    pub fn popup_opened(&self, id: &str) {
        self.runtime.popup_opened(id);
    }

    pub fn popup_closed(&self) {
        self.runtime.popup_closed();
    }
}


fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GROVEMAP_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(base) = dirs::config_dir() {
        return base.join("grovemap");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("grovemap")
}


fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}


/// Assemble and run the Tauri application.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_tracing();

    let config_dir = resolve_config_dir();
    let state = tauri::async_runtime::block_on(async { AppState::new(config_dir) });

    tauri::Builder::default()
        .manage(state)
        .invoke_handler(tauri::generate_handler![
            // Top-level
            ipc::grove_status,
            ipc::grove_settings,
            // Markers
            ipc::grove_markers,
            ipc::grove_map_markers,
            ipc::grove_popup,
            ipc::grove_reload_markers,
            // Decoration
            ipc::grove_decorate,
            ipc::grove_reset,
            // Popup countdown lifecycle
            ipc::grove_popup_opened,
            ipc::grove_popup_closed,
        ])
        .setup(move |app| {
            // -------------------------------------------------------------
            // Surface sync: forward every hub event to the webview. The
            // frontend re-renders the affected icon, popup, and list row on
            // "decor://changed" and updates the countdown text on
            // "decor://tick".
            // -------------------------------------------------------------
            {
                let state: tauri::State<AppState> = app.state();
                let runtime = Arc::clone(state.runtime());
                let emitter = app.handle().clone();
                runtime.hub().subscribe(move |ev: &DecorEvent| {
                    let channel = match ev {
                        DecorEvent::Tick { .. } => channels::TICK,
                        _ => channels::CHANGED,
                    };
                    if let Err(e) = emitter.emit(channel, ev.clone()) {
                        tracing::warn!("failed to emit {}: {}", channel, e);
                    }
                });
                runtime.start();
            }

            // -------------------------------------------------------------
            // Tray icon setup
            // -------------------------------------------------------------
            {
                use tauri::menu::{MenuBuilder, MenuItemBuilder};
                use tauri::tray::TrayIconBuilder;

                let reload_item = MenuItemBuilder::with_id(
                    tray_menu_ids::RELOAD, "Reload markers",
                ).build(app)?;
                let reset_item = MenuItemBuilder::with_id(
                    tray_menu_ids::RESET, "Reset cooldowns",
                ).build(app)?;
                let quit_item = MenuItemBuilder::with_id(
                    tray_menu_ids::QUIT, "Quit",
                ).build(app)?;

                let menu = MenuBuilder::new(app)
                    .item(&reload_item)
                    .item(&reset_item)
                    .separator()
                    .item(&quit_item)
                    .build()?;

                let mut builder = TrayIconBuilder::new()
                    .title("GroveMap")
                    .tooltip("GroveMap — marker cooldowns")
                    .menu(&menu);
                if let Some(icon) = app.default_window_icon().cloned() {
                    builder = builder.icon(icon);
                }
                let _tray = builder
                    .on_menu_event(|app, event| {
                        let state: tauri::State<AppState> = app.state();
                        match event.id().as_ref() {
                            tray_menu_ids::RELOAD => {
                                let r = state.reload_markers();
                                tracing::info!("tray reload: {:?}", r);
                                if let Err(e) = app.emit(channels::MARKERS_RELOADED, ()) {
                                    tracing::warn!("failed to emit reload event: {}", e);
                                }
                            }
                            tray_menu_ids::RESET => {
                                // The hub broadcast repaints every surface.
                                let r = state.reset();
                                tracing::info!("tray reset: {:?}", r);
                            }
                            tray_menu_ids::QUIT => {
                                std::process::exit(0);
                            }
                            _ => {}
                        }
                    })
                    .build(app)?;
            }

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
