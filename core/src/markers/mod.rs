//! Marker catalog and display indexing.
//!
//! The `catalog` module loads the ordered marker collection from the
//! markers file and keeps the display numbers current. The `index` module
//! assigns sequential numbers to tree markers and produces the stable
//! display order used by the list surface.

pub mod catalog;
pub mod index;
