//! Surface content builders — icon, popup, and list row.
//!
//! Each builder takes a marker, the display number map, and the remaining
//! cooldown time read at the caller's `now`, and produces a plain data
//! description of what the surface should show. The builders never touch
//! the store or the clock themselves, so a surface can be re-rendered for
//! any marker at any point without side effects.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::marker::Marker;
use crate::view::format::{escape_html, format_left};

const TREE_GLYPH: &str = "🌲";
const PIN_GLYPH: &str = "📍";
const FALLBACK_NAME: &str = "Marker";


/// Content of a map icon: glyph, optional display number, decorated state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IconView {
    pub glyph: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    pub decorated: bool,
}


/// Content of an open marker popup.
///
/// An available popup carries the decorate affordance in `action_label`;
/// a decorated one carries the remaining time instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopupView {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub decorated: bool,
    pub remaining_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
}


/// Content of a list/drawer row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowView {
    pub id: String,
    pub title: String,
    pub decorated: bool,
    pub status_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_label: Option<String>,
}


pub fn icon_view(marker: &Marker, numbers: &HashMap<String, u32>, decorated: bool) -> IconView {
    let glyph = if marker.is_numbered() { TREE_GLYPH } else { PIN_GLYPH };
    IconView {
        glyph: glyph.to_string(),
        number: number_of(marker, numbers),
        decorated,
    }
}


pub fn popup_view(
    marker: &Marker,
    numbers: &HashMap<String, u32>,
    left_ms: i64,
    cooldown_ms: u64,
) -> PopupView {
    let name = escaped_name(marker);
    // Popup titles carry the number but no glyph.
    let title = match number_of(marker, numbers) {
        Some(no) => format!("#{} {}", no, name),
        None => name,
    };
    let note = if marker.note.is_empty() {
        None
    } else {
        Some(escape_html(&marker.note))
    };

    if left_ms <= 0 {
        return PopupView {
            id: marker.id.clone(),
            title,
            note,
            decorated: false,
            remaining_ms: left_ms,
            remaining_label: None,
            action_label: Some(format!("🎀 Decorate ({})", format_left(cooldown_ms as i64))),
        };
    }

    PopupView {
        id: marker.id.clone(),
        title,
        note,
        decorated: true,
        remaining_ms: left_ms,
        remaining_label: Some(format!("Remaining: {}", format_left(left_ms))),
        action_label: None,
    }
}


pub fn row_view(marker: &Marker, numbers: &HashMap<String, u32>, left_ms: i64) -> RowView {
    let decorated = left_ms > 0;
    RowView {
        id: marker.id.clone(),
        title: crate::markers::index::title_for(marker, numbers),
        decorated,
        status_label: if decorated {
            "✅ Decorated".to_string()
        } else {
            "🟢 Available".to_string()
        },
        remaining_label: if decorated {
            Some(format!("Remaining: {}", format_left(left_ms)))
        } else {
            None
        },
    }
}


fn number_of(marker: &Marker, numbers: &HashMap<String, u32>) -> Option<u32> {
    if marker.is_numbered() {
        numbers.get(&marker.id).copied()
    } else {
        None
    }
}

fn escaped_name(marker: &Marker) -> String {
    if marker.name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        escape_html(&marker.name)
    }
}
