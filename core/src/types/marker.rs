//! Marker — a single point on the map, as loaded from the markers file.

use serde::{Deserialize, Serialize};

/// The marker type that receives sequential display numbers.
pub const NUMBERED_TYPE: &str = "tree";


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Marker {
    pub id: String,
    /// Marker type. Anything other than "tree" is rendered as a plain pin.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub note: String,
}

fn default_kind() -> String {
    NUMBERED_TYPE.to_string()
}


impl Marker {
    /// Whether this marker belongs to the numbered type.
    pub fn is_numbered(&self) -> bool {
        self.kind == NUMBERED_TYPE
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_defaults_to_tree() {
        let m: Marker =
            serde_json::from_str(r#"{"id":"a","x":1.0,"y":2.0}"#).unwrap();
        assert_eq!(m.kind, "tree");
        assert!(m.is_numbered());
        assert_eq!(m.name, "");
        assert_eq!(m.note, "");
    }

    #[test]
    fn explicit_type_is_kept() {
        let m: Marker =
            serde_json::from_str(r#"{"id":"b","type":"pin","x":0,"y":0}"#).unwrap();
        assert_eq!(m.kind, "pin");
        assert!(!m.is_numbered());
    }

    #[test]
    fn full_record_round_trip() {
        let m = Marker {
            id: "m1".into(),
            kind: "tree".into(),
            x: 120.5,
            y: 77.0,
            name: "Old Pine".into(),
            note: "by the river".into(),
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"type\":\"tree\""));
        let back: Marker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn missing_id_fails_to_parse() {
        let r = serde_json::from_str::<Marker>(r#"{"x":0,"y":0}"#);
        assert!(r.is_err());
    }
}
