//! Display indexing — sequential tree numbers and the list sort order.

use std::collections::HashMap;

use crate::types::marker::Marker;
use crate::view::format::escape_html;


/// Assign 1-based display numbers to tree markers, in input order.
///
/// Markers of other types are absent from the map entirely (not zero).
/// The result is deterministic for a given input order and is recomputed
/// only when the marker collection is (re)loaded.
pub fn build_numbers(markers: &[Marker]) -> HashMap<String, u32> {
    let mut numbers = HashMap::new();
    let mut n = 0;
    for m in markers {
        if m.is_numbered() && !m.id.is_empty() {
            n += 1;
            numbers.insert(m.id.clone(), n);
        }
    }
    numbers
}


/// Sort markers for display: trees first ascending by number, then all
/// others preserving their relative input order.
///
/// A marker without an assigned number sorts after all numbered ones within
/// its group; ties are broken by input position, so the sort is stable.
pub fn sort_for_display<'a>(
    markers: &'a [Marker],
    numbers: &HashMap<String, u32>,
) -> Vec<&'a Marker> {
    let mut keyed: Vec<(usize, &Marker)> = markers.iter().enumerate().collect();
    keyed.sort_by_key(|(idx, m)| {
        let group: u8 = if m.is_numbered() { 0 } else { 1 };
        let number = numbers.get(&m.id).copied().unwrap_or(u32::MAX);
        (group, number, *idx)
    });
    keyed.into_iter().map(|(_, m)| m).collect()
}


/// Human-readable display title: `#N Name` for numbered trees, otherwise a
/// glyph-prefixed name. The free-text name is escaped before embedding.
pub fn title_for(marker: &Marker, numbers: &HashMap<String, u32>) -> String {
    let name = if marker.name.is_empty() {
        "Marker".to_string()
    } else {
        escape_html(&marker.name)
    };

    let number = if marker.is_numbered() {
        numbers.get(&marker.id)
    } else {
        None
    };

    match number {
        Some(no) => format!("#{} {}", no, name),
        None => {
            let glyph = if marker.is_numbered() { "🌲" } else { "📍" };
            format!("{} {}", glyph, name)
        }
    }
}
