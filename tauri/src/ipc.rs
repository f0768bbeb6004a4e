//! Tauri IPC command handlers for GroveMap.
//!
//! Each function is a Tauri command that bridges the frontend to the core
//! cooldown runtime via AppState. Handlers are deliberately thin: state
//! changes and surface notifications all happen inside the runtime, so a
//! handler returning means every surface has already been told.

use grovemap_core::response::Response;
use serde::{Deserialize, Serialize};
use tauri::State;

use crate::AppState;


/// Uniform response type for all IPC commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IpcResponse {
    pub ok: bool,
    pub data: String,
}


impl IpcResponse {
    pub fn success(data: String) -> Self {
        IpcResponse { ok: true, data }
    }

    pub fn error(msg: String) -> Self {
        IpcResponse { ok: false, data: msg }
    }
}


fn to_ipc(resp: Response) -> IpcResponse {
    match resp {
        Response::Ok { output } => IpcResponse::success(output),
        Response::Error { message } => IpcResponse::error(message),
    }
}


// ---------------------------------------------------------------------------
// Top-level commands
// ---------------------------------------------------------------------------

#[tauri::command]
pub fn grove_status(state: State<'_, AppState>) -> IpcResponse {
    to_ipc(state.status())
}

#[tauri::command]
pub fn grove_settings(state: State<'_, AppState>) -> IpcResponse {
    IpcResponse::success(state.get_settings())
}


// ---------------------------------------------------------------------------
// Marker commands
// ---------------------------------------------------------------------------

#[tauri::command]
pub fn grove_markers(state: State<'_, AppState>) -> IpcResponse {
    to_ipc(state.markers_list())
}

#[tauri::command]
pub fn grove_map_markers(state: State<'_, AppState>) -> IpcResponse {
    IpcResponse::success(state.map_markers_json())
}

#[tauri::command]
pub fn grove_popup(state: State<'_, AppState>, id: String) -> IpcResponse {
    to_ipc(state.marker_popup(id))
}

#[tauri::command]
pub fn grove_reload_markers(state: State<'_, AppState>) -> IpcResponse {
    to_ipc(state.reload_markers())
}


// ---------------------------------------------------------------------------
// Decoration commands
// ---------------------------------------------------------------------------

#[tauri::command]
pub fn grove_decorate(state: State<'_, AppState>, id: String) -> IpcResponse {
    to_ipc(state.decorate(id))
}

#[tauri::command]
pub fn grove_reset(state: State<'_, AppState>) -> IpcResponse {
    to_ipc(state.reset())
}


// ---------------------------------------------------------------------------
// Popup countdown lifecycle
// ---------------------------------------------------------------------------

#[tauri::command]
pub fn grove_popup_opened(state: State<'_, AppState>, id: String) -> IpcResponse {
    state.popup_opened(&id);
    IpcResponse::success(format!("countdown started for {}", id))
}

#[tauri::command]
pub fn grove_popup_closed(state: State<'_, AppState>) -> IpcResponse {
    state.popup_closed();
    IpcResponse::success("countdown stopped".into())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
