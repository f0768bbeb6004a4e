use std::path::PathBuf;

use crate::command::Command;
use crate::decor::events::DecorEvent;
use crate::decor::store::DecorStore;
use crate::markers::catalog::MarkerCatalog;
use crate::response::Response;
use crate::types::config::{MapSettings, SETTINGS_FILE};
use crate::view::format::format_left;
use crate::view::surfaces;


/// Central runtime for GroveMap. Dispatches marker and decoration commands.
///
/// Settings, catalog, and cooldown slot all live under one config dir and
/// are loaded once at construction; nothing here is a global. Time enters
/// exclusively through the `now_ms` parameter of `execute_at`, so every
/// command is reproducible in tests.
pub struct Sys {
    config_dir: PathBuf,
    settings: MapSettings,
    catalog: MarkerCatalog,
    store: DecorStore,
    events: Vec<DecorEvent>,
}


impl Sys {
    pub fn new(config_dir: PathBuf) -> Sys {
        let settings = MapSettings::from_file(&config_dir.join(SETTINGS_FILE));
        let markers_path =
            config_dir.join(settings.markers_path.as_deref().unwrap_or("markers.json"));
        let catalog = MarkerCatalog::from_file(&markers_path);
        let store = DecorStore::load(
            config_dir.join(&settings.decor.slot_name),
            settings.decor.cooldown_ms,
        );
        Sys {
            config_dir,
            settings,
            catalog,
            store,
            events: Vec::new(),
        }
    }

    pub fn config_dir(&self) -> &std::path::Path {
        &self.config_dir
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &MarkerCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &DecorStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DecorStore {
        &mut self.store
    }

    /// Execute a command against the ambient clock.
    pub fn execute(&mut self, cmd: Command) -> Response {
        let now = crate::now_ms();
        self.execute_at(cmd, now)
    }

    /// The single dispatch method.
    pub fn execute_at(&mut self, cmd: Command, now_ms: u64) -> Response {
        self.events.clear();
        match cmd {
            Command::Status { format } => self.cmd_status(format, now_ms),
            Command::MarkersList => self.cmd_markers_list(now_ms),
            Command::MarkersReload => self.cmd_markers_reload(),
            Command::MarkerShow { id } => self.cmd_marker_show(&id, now_ms),
            Command::Decorate { id } => self.cmd_decorate(id, now_ms),
            Command::Cleanup => self.cmd_cleanup(now_ms),
            Command::Reset => self.cmd_reset(),
            Command::Watch => Response::error("Watch is handled by the watch runtime"),
            Command::Help { topic } => Response::ok(crate::help::help_text(topic.as_deref())),
        }
    }

    /// Events emitted during the last execute call.
    pub fn pending_events(&self) -> &[DecorEvent] {
        &self.events
    }

    /// Take and clear accumulated events.
    pub fn drain_events(&mut self) -> Vec<DecorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Targeted expiry: evict `id` if its cooldown has actually lapsed.
    ///
    /// Used by the expiry timers rather than going through a command.
    /// Returns the event to publish, or `None` when the fire was stale
    /// (entry already gone or re-decorated to a future expiry).
    pub fn expire_now(&mut self, id: &str, now_ms: u64) -> Option<DecorEvent> {
        if self.store.evict_lapsed(id, now_ms) {
            Some(DecorEvent::Expired { id: id.to_string() })
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    fn cmd_status(&self, format: Option<String>, now_ms: u64) -> Response {
        let decorated = self
            .catalog
            .markers()
            .iter()
            .filter(|m| self.store.is_decorated(&m.id, now_ms))
            .count();

        if format.as_deref() == Some("json") {
            return Response::ok(
                serde_json::json!({
                    "markers": self.catalog.len(),
                    "trees": self.catalog.tree_count(),
                    "decorated": decorated,
                    "cooldown_ms": self.settings.decor.cooldown_ms,
                })
                .to_string(),
            );
        }

        Response::ok(format!(
            "GroveMap: {} markers ({} numbered), {} decorated",
            self.catalog.len(),
            self.catalog.tree_count(),
            decorated,
        ))
    }

    // -----------------------------------------------------------------------
    // Marker commands
    // -----------------------------------------------------------------------

    fn cmd_markers_list(&self, now_ms: u64) -> Response {
        let rows: Vec<_> = self
            .catalog
            .sorted()
            .into_iter()
            .map(|m| {
                let left = self.store.time_left_ms(&m.id, now_ms);
                surfaces::row_view(m, self.catalog.numbers(), left)
            })
            .collect();
        match serde_json::to_string(&rows) {
            Ok(json) => Response::ok(json),
            Err(e) => Response::error(format!("Failed to serialize marker list: {}", e)),
        }
    }

    fn cmd_markers_reload(&mut self) -> Response {
        let n = self.catalog.reload();
        Response::ok(format!("Loaded {} markers", n))
    }

    fn cmd_marker_show(&self, id: &str, now_ms: u64) -> Response {
        let Some(marker) = self.catalog.get(id) else {
            return Response::error(format!("Unknown marker id: '{}'", id));
        };
        let left = self.store.time_left_ms(id, now_ms);
        let popup = surfaces::popup_view(
            marker,
            self.catalog.numbers(),
            left,
            self.settings.decor.cooldown_ms,
        );
        match serde_json::to_string(&popup) {
            Ok(json) => Response::ok(json),
            Err(e) => Response::error(format!("Failed to serialize popup: {}", e)),
        }
    }

    // -----------------------------------------------------------------------
    // Decoration commands
    // -----------------------------------------------------------------------

    fn cmd_decorate(&mut self, id: String, now_ms: u64) -> Response {
        if self.catalog.get(&id).is_none() {
            return Response::error(format!("Unknown marker id: '{}'", id));
        }

        let expires_at_ms = self.store.decorate(&id, now_ms);
        self.events.push(DecorEvent::Decorated {
            id: id.clone(),
            expires_at_ms,
        });
        Response::ok(format!(
            "Marker '{}' decorated for {}",
            id,
            format_left(self.store.cooldown_ms() as i64),
        ))
    }

    fn cmd_cleanup(&mut self, now_ms: u64) -> Response {
        let evicted = self.store.cleanup_expired(now_ms);
        let n = evicted.len();
        for id in evicted {
            self.events.push(DecorEvent::Expired { id });
        }
        Response::ok(format!("Evicted {} lapsed cooldown(s)", n))
    }

    fn cmd_reset(&mut self) -> Response {
        let ids = self.store.reset();
        let n = ids.len();
        self.events.push(DecorEvent::Reset { ids });
        Response::ok(format!("Cleared {} cooldown(s)", n))
    }
}
