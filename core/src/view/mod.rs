//! View models — what each surface shows, decoupled from how it is drawn.
//!
//! The `format` module turns durations into countdown labels and escapes
//! free text. The `surfaces` module builds the content for the three
//! presentational surfaces: the map icon, the marker popup, and the list
//! row. Rendering primitives are supplied by the shells.

pub mod format;
pub mod surfaces;
