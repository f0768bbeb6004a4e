//! Marker catalog — load and hold the ordered marker collection.
//!
//! The markers file is a JSON array of marker records. Loading is tolerant:
//! a missing or unreadable file yields an empty catalog, and a malformed
//! entry is skipped without failing the rest. Display numbers are rebuilt
//! on every (re)load, not on every render.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::markers::index;
use crate::types::marker::Marker;


#[derive(Debug, Clone, Default)]
pub struct MarkerCatalog {
    markers: Vec<Marker>,
    numbers: HashMap<String, u32>,
    path: Option<PathBuf>,
}


impl MarkerCatalog {
    /// Build a catalog from an already-parsed marker list.
    ///
    /// Markers with an empty id, or an id containing the persistence
    /// delimiters `|` or `,`, are dropped here so they can never corrupt
    /// the cooldown slot encoding.
    pub fn from_markers(markers: Vec<Marker>) -> MarkerCatalog {
        let markers: Vec<Marker> = markers
            .into_iter()
            .filter(|m| {
                if valid_id(&m.id) {
                    true
                } else {
                    tracing::warn!("dropping marker with unusable id {:?}", m.id);
                    false
                }
            })
            .collect();
        let numbers = index::build_numbers(&markers);
        MarkerCatalog {
            markers,
            numbers,
            path: None,
        }
    }

    /// Parse a catalog from JSON text.
    ///
    /// A top-level value that is not an array yields an empty catalog;
    /// individual entries that fail to parse are skipped.
    pub fn from_json_str(input: &str) -> MarkerCatalog {
        let values: Vec<serde_json::Value> = match serde_json::from_str(input) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("markers file unparseable, starting empty: {}", e);
                return MarkerCatalog::default();
            }
        };

        let markers = values
            .into_iter()
            .filter_map(|v| match serde_json::from_value::<Marker>(v) {
                Ok(m) => Some(m),
                Err(e) => {
                    tracing::warn!("skipping malformed marker entry: {}", e);
                    None
                }
            })
            .collect();

        Self::from_markers(markers)
    }

    /// Load markers from a file path. Returns an empty catalog if the file
    /// doesn't exist. The path is remembered for `reload`.
    pub fn from_file(path: &Path) -> MarkerCatalog {
        let mut catalog = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json_str(&content),
            Err(_) => MarkerCatalog::default(),
        };
        catalog.path = Some(path.to_path_buf());
        catalog
    }

    /// Re-read the markers file and recompute display numbers.
    ///
    /// Returns the number of markers loaded. A catalog that was not built
    /// from a file keeps its current contents.
    pub fn reload(&mut self) -> usize {
        if let Some(path) = self.path.clone() {
            *self = Self::from_file(&path);
        }
        self.markers.len()
    }

    pub fn get(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Display numbers for tree markers, keyed by marker id.
    pub fn numbers(&self) -> &HashMap<String, u32> {
        &self.numbers
    }

    /// Markers in display order (trees first, ascending by number).
    pub fn sorted(&self) -> Vec<&Marker> {
        index::sort_for_display(&self.markers, &self.numbers)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Count of markers carrying a display number.
    pub fn tree_count(&self) -> usize {
        self.numbers.len()
    }
}


/// Ids flow into the `id,expSec|...` slot encoding, so the delimiters are
/// forbidden in them.
fn valid_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('|') && !id.contains(',')
}
