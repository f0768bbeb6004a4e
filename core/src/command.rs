//! Command — the typed interface for all GroveMap operations.
//!
//! Markers are read-only here; editing the markers file is the admin
//! tooling's job. Everything cooldown-related goes through these commands
//! so every surface sees the same state transitions.

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command")]
pub enum Command {
    // -----------------------------------------------------------------
    // Top-level commands
    // -----------------------------------------------------------------

    #[serde(rename = "status")]
    Status {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },

    // -----------------------------------------------------------------
    // Marker commands
    // -----------------------------------------------------------------

    #[serde(rename = "markers.list")]
    MarkersList,

    #[serde(rename = "markers.reload")]
    MarkersReload,

    #[serde(rename = "marker.show")]
    MarkerShow {
        id: String,
    },

    // -----------------------------------------------------------------
    // Decoration commands
    // -----------------------------------------------------------------

    #[serde(rename = "decor.set")]
    Decorate {
        id: String,
    },

    #[serde(rename = "decor.cleanup")]
    Cleanup,

    #[serde(rename = "decor.reset")]
    Reset,

    // -----------------------------------------------------------------
    // Watch / Help
    // -----------------------------------------------------------------

    #[serde(rename = "watch")]
    Watch,

    #[serde(rename = "help")]
    Help {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
    },
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        let cmd = Command::Status { format: None };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"status\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn markers_list_round_trip() {
        let cmd = Command::MarkersList;
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"markers.list\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn markers_reload_round_trip() {
        let cmd = Command::MarkersReload;
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"markers.reload\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn marker_show_round_trip() {
        let cmd = Command::MarkerShow { id: "m1".into() };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"marker.show\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn decorate_round_trip() {
        let cmd = Command::Decorate { id: "m1".into() };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"decor.set\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn cleanup_round_trip() {
        let cmd = Command::Cleanup;
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"decor.cleanup\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn reset_round_trip() {
        let cmd = Command::Reset;
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"decor.reset\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn help_with_topic_round_trip() {
        let cmd = Command::Help {
            topic: Some("decor".into()),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"command\":\"help\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }
}
