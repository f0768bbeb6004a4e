//! Help system for GroveMap commands.

pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some(t) => {
            if let Some(text) = command_help(t) {
                return text;
            }
            if let Some(text) = group_help(t) {
                return text;
            }
            format!("Unknown help topic: '{}'. Run 'grove help' for a list of commands.", t)
        }
    }
}


fn overview() -> String {
    "\
grove — GroveMap command-line interface

Usage: grove <command> [args...]

Commands:
  status [--json]            Show marker and cooldown counts
  show <id>                  Show one marker's popup content
  help [topic]               Show help

Marker commands:
  markers list               List markers in display order
  markers reload             Re-read the markers file and renumber

Decoration commands:
  decorate <id>              Decorate a marker (starts its cooldown)
  cleanup                    Evict lapsed cooldowns now
  reset                      Clear all cooldowns and erase the saved slot

Watch command:
  watch                      Run live and stream decoration events

Run 'grove help <command>' for detailed help on a specific command."
        .into()
}


fn group_help(group: &str) -> Option<String> {
    let text = match group {
        "markers" => "\
Marker commands — inspect the marker catalog

  markers list
    Print every marker in display order (numbered trees first), with
    decoration status and remaining time.

  markers reload
    Re-read the markers file. Display numbers are recomputed from the
    new file order.",

        "decor" => "\
Decoration commands — manage marker cooldowns

  decorate <id>
    Start the cooldown for a marker. Re-decorating restarts the
    cooldown from now; it never stacks.

  cleanup
    Evict every cooldown whose expiry has passed. Runs automatically
    in watch mode and in the desktop app.

  reset
    Clear every cooldown and delete the persisted slot file.",

        "watch" => "\
Watch command — stream decoration events

  watch
    Re-arm expiry timers for saved cooldowns and print an event line
    whenever a marker is decorated, expires, or everything is reset.
    Stops on Ctrl-C.",

        _ => return None,
    };
    Some(text.into())
}


fn command_help(command: &str) -> Option<String> {
    let text = match command {
        "status" => "grove status — show marker and cooldown counts\n\nUsage: grove status [--json]",
        "show" | "marker.show" => "grove show — show one marker's popup content\n\nUsage: grove show <id>",
        "help" => "grove help — show help\n\nUsage: grove help [topic]",
        "markers.list" => "grove markers list — list markers in display order\n\nUsage: grove markers list",
        "markers.reload" => "grove markers reload — re-read the markers file\n\nUsage: grove markers reload",
        "decorate" | "decor.set" => "grove decorate — start a marker's cooldown\n\nUsage: grove decorate <id>",
        "cleanup" | "decor.cleanup" => "grove cleanup — evict lapsed cooldowns\n\nUsage: grove cleanup",
        "reset" | "decor.reset" => "grove reset — clear all cooldowns\n\nUsage: grove reset",
        "watch" => "grove watch — stream decoration events\n\nUsage: grove watch",
        _ => return None,
    };
    Some(text.into())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_lists_command_groups() {
        let text = help_text(None);
        assert!(text.contains("Marker commands:"));
        assert!(text.contains("Decoration commands:"));
        assert!(text.contains("watch"));
    }

    #[test]
    fn group_help_decor() {
        let text = help_text(Some("decor"));
        assert!(text.contains("decorate"));
        assert!(text.contains("cleanup"));
        assert!(text.contains("reset"));
    }

    #[test]
    fn group_help_markers() {
        let text = help_text(Some("markers"));
        assert!(text.contains("markers list"));
        assert!(text.contains("markers reload"));
    }

    #[test]
    fn command_help_decorate() {
        let text = help_text(Some("decorate"));
        assert!(text.contains("Usage:"));
        assert!(text.contains("decorate <id>"));
    }

    #[test]
    fn dotted_names_resolve_too() {
        let text = help_text(Some("decor.set"));
        assert!(text.contains("grove decorate"));
    }

    #[test]
    fn unknown_topic() {
        let text = help_text(Some("bogus"));
        assert!(text.contains("Unknown help topic"));
    }
}
