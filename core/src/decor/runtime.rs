//! DecorRuntime — wires the store, scheduler, countdown, and surface hub
//! into the synchronization contract.
//!
//! Every mutation path (a decorate command, a scheduled expiry firing, the
//! sweep, a reset) goes through here: state changes happen under the `Sys`
//! lock, and the resulting events are published to every surface before the
//! triggering call returns. Expiry firing is idempotent, so the scheduler,
//! the countdown, and the sweep can all race without harm.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::command::Command;
use crate::decor::countdown::{PopupCountdown, TickHooks};
use crate::decor::events::{DecorEvent, SurfaceHub};
use crate::decor::scheduler::ExpiryScheduler;
use crate::decor::SWEEP_INTERVAL_MS;
use crate::now_ms;
use crate::response::Response;
use crate::sys::Sys;


pub struct DecorRuntime {
    /// Self-reference handed to the sweep task, so a dropped runtime lets
    /// the task wind down instead of keeping it alive.
    weak: Weak<DecorRuntime>,
    handle: Handle,
    sys: Arc<Mutex<Sys>>,
    hub: Arc<SurfaceHub>,
    scheduler: ExpiryScheduler,
    countdown: PopupCountdown,
    sweep: Mutex<Option<AbortHandle>>,
}


impl DecorRuntime {
    /// Build the runtime around a shared `Sys`.
    ///
    /// Must be called inside a Tokio runtime; timer tasks are spawned onto
    /// the captured handle later.
    pub fn new(sys: Arc<Mutex<Sys>>) -> Arc<DecorRuntime> {
        let hub = Arc::new(SurfaceHub::new());

        let expire_sys = Arc::clone(&sys);
        let expire_hub = Arc::clone(&hub);
        let scheduler = ExpiryScheduler::new(Arc::new(move |id: &str| {
            fire_expiry(&expire_sys, &expire_hub, id);
        }));

        Arc::new_cyclic(|weak| DecorRuntime {
            weak: weak.clone(),
            handle: Handle::current(),
            sys,
            hub,
            scheduler,
            countdown: PopupCountdown::new(),
            sweep: Mutex::new(None),
        })
    }

    pub fn hub(&self) -> &Arc<SurfaceHub> {
        &self.hub
    }

    pub fn sys(&self) -> &Arc<Mutex<Sys>> {
        &self.sys
    }

    /// Execute a command, then bring timers and surfaces up to date.
    ///
    /// The command runs under the `Sys` lock; the drained events are applied
    /// and published after the lock is released, before this returns. From
    /// the caller's perspective mutation and resync are one step.
    pub fn execute(&self, cmd: Command) -> Response {
        let now = now_ms();
        let (response, events) = {
            let mut sys = self.sys.lock().unwrap_or_else(|e| e.into_inner());
            let response = sys.execute_at(cmd, now);
            (response, sys.drain_events())
        };
        self.apply(&events, now);
        response
    }

    /// Arm or cancel timers per event, then publish to all surfaces.
    fn apply(&self, events: &[DecorEvent], now_ms_val: u64) {
        for event in events {
            match event {
                DecorEvent::Decorated { id, expires_at_ms } => {
                    let left = *expires_at_ms as i64 - now_ms_val as i64;
                    self.scheduler.schedule(id, left);
                }
                DecorEvent::Expired { id } => {
                    self.scheduler.clear(id);
                }
                DecorEvent::Reset { .. } => {
                    self.scheduler.clear_all();
                    self.countdown.stop();
                }
                DecorEvent::Tick { .. } => {}
            }
            self.hub.publish(event);
        }
    }

    /// Bring the runtime live after construction: evict entries that lapsed
    /// while the app was closed, re-arm timers for the survivors, and start
    /// the fallback sweep.
    pub fn start(&self) {
        self.sweep_once();

        let now = now_ms();
        let survivors: Vec<(String, i64)> = {
            let sys = self.sys.lock().unwrap_or_else(|e| e.into_inner());
            sys.store()
                .active_ids()
                .into_iter()
                .map(|id| {
                    let left = sys.store().time_left_ms(&id, now);
                    (id, left)
                })
                .collect()
        };
        self.scheduler.schedule_all(survivors);

        let weak = self.weak.clone();
        let task = self.handle.spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(SWEEP_INTERVAL_MS)).await;
                let Some(runtime) = weak.upgrade() else {
                    return;
                };
                runtime.sweep_once();
            }
        });

        let mut sweep = self.sweep.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = sweep.replace(task.abort_handle()) {
            old.abort();
        }
    }

    /// One sweep pass: evict lapsed entries, publish the evictions, and
    /// re-arm any live entry whose timer went missing.
    pub fn sweep_once(&self) {
        let now = now_ms();
        let (events, live) = {
            let mut sys = self.sys.lock().unwrap_or_else(|e| e.into_inner());
            let events: Vec<DecorEvent> = sys
                .store_mut()
                .cleanup_expired(now)
                .into_iter()
                .map(|id| DecorEvent::Expired { id })
                .collect();
            let live: Vec<(String, i64)> = sys
                .store()
                .active_ids()
                .into_iter()
                .map(|id| {
                    let left = sys.store().time_left_ms(&id, now);
                    (id, left)
                })
                .collect();
            (events, live)
        };

        self.apply(&events, now);

        for (id, left) in live {
            if !self.scheduler.is_scheduled(&id) {
                tracing::debug!("re-arming lost expiry timer for {}", id);
                self.scheduler.schedule(&id, left);
            }
        }
    }

    /// Stop background activity: the sweep, all expiry timers, and any
    /// ticking countdown. Store state is left untouched.
    pub fn stop(&self) {
        if let Some(task) = self
            .sweep
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }
        self.scheduler.clear_all();
        self.countdown.stop();
    }

    /// A popup for `id` became the open popup: start its countdown.
    pub fn popup_opened(&self, id: &str) {
        let left_sys = Arc::clone(&self.sys);
        let tick_hub = Arc::clone(&self.hub);
        let expired_sys = Arc::clone(&self.sys);
        let expired_hub = Arc::clone(&self.hub);
        let expired_timers = self.scheduler.canceller();

        let hooks = TickHooks {
            time_left: Arc::new(move |id: &str| {
                let sys = left_sys.lock().unwrap_or_else(|e| e.into_inner());
                sys.store().time_left_ms(id, now_ms())
            }),
            on_tick: Arc::new(move |id: &str, left: i64| {
                tick_hub.publish(&DecorEvent::Tick {
                    id: id.to_string(),
                    left_ms: left,
                });
            }),
            on_expired: Arc::new(move |id: &str| {
                expired_timers(id);
                fire_expiry(&expired_sys, &expired_hub, id);
            }),
        };
        self.countdown.start(id, hooks);
    }

    /// The open popup closed: stop its countdown.
    pub fn popup_closed(&self) {
        self.countdown.stop();
    }

    pub fn is_decorated(&self, id: &str) -> bool {
        let sys = self.sys.lock().unwrap_or_else(|e| e.into_inner());
        sys.store().is_decorated(id, now_ms())
    }

    pub fn time_left_ms(&self, id: &str) -> i64 {
        let sys = self.sys.lock().unwrap_or_else(|e| e.into_inner());
        sys.store().time_left_ms(id, now_ms())
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn is_ticking(&self) -> bool {
        self.countdown.is_ticking()
    }
}


/// Shared expiry path for the scheduler and the countdown.
///
/// Evicts the entry if (and only if) it has actually lapsed, then tells the
/// surfaces. Firing for an id that was already cleaned up, reset, or
/// re-decorated to a future expiry is a harmless no-op.
fn fire_expiry(sys: &Arc<Mutex<Sys>>, hub: &Arc<SurfaceHub>, id: &str) {
    let now = now_ms();
    let event = {
        let mut sys = sys.lock().unwrap_or_else(|e| e.into_inner());
        sys.expire_now(id, now)
    };
    if let Some(event) = event {
        hub.publish(&event);
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE_MARKERS: &str = r#"[
        {"id": "a", "type": "tree", "x": 10, "y": 20, "name": "Pine"},
        {"id": "b", "type": "pin", "x": 30, "y": 40, "name": "Camp"},
        {"id": "c", "type": "tree", "x": 50, "y": 60, "name": "Spruce"}
    ]"#;

    // These tests exercise real timers against the wall clock, so they use
    // short cooldowns and generous margins instead of a paused clock.

    fn test_config(tag: &str, cooldown_ms: u64) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "grovemap-runtime-{}-{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("markers.json"), SAMPLE_MARKERS).unwrap();
        std::fs::write(
            dir.join("grovemap.yaml"),
            format!("decor:\n  cooldown_ms: {}\n", cooldown_ms),
        )
        .unwrap();
        dir
    }

    fn test_runtime(tag: &str, cooldown_ms: u64) -> (Arc<DecorRuntime>, PathBuf) {
        let dir = test_config(tag, cooldown_ms);
        let sys = Arc::new(Mutex::new(Sys::new(dir.clone())));
        (DecorRuntime::new(sys), dir)
    }

    fn watch_events(runtime: &DecorRuntime) -> Arc<Mutex<Vec<DecorEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        runtime
            .hub()
            .subscribe(move |ev: &DecorEvent| sink.lock().unwrap().push(ev.clone()));
        seen
    }

    fn cleanup(dir: &PathBuf) {
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn decorate_publishes_and_arms_timer() {
        let (runtime, dir) = test_runtime("decorate", 60_000);
        let seen = watch_events(&runtime);

        let r = runtime.execute(Command::Decorate { id: "a".into() });
        assert!(r.is_ok());
        assert!(runtime.is_decorated("a"));
        assert_eq!(runtime.pending_timers(), 1);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(matches!(seen[0], DecorEvent::Decorated { .. }));
        cleanup(&dir);
    }

    #[tokio::test]
    async fn expiry_fire_evicts_and_publishes_once() {
        let (runtime, dir) = test_runtime("fire", 100);
        let seen = watch_events(&runtime);

        runtime.execute(Command::Decorate { id: "a".into() });
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(!runtime.is_decorated("a"));
        assert_eq!(runtime.pending_timers(), 0);

        let seen = seen.lock().unwrap();
        let expired: Vec<_> = seen
            .iter()
            .filter(|ev| matches!(ev, DecorEvent::Expired { .. }))
            .collect();
        assert_eq!(expired.len(), 1);
        cleanup(&dir);
    }

    #[tokio::test]
    async fn redecorate_replaces_timer_without_stacking() {
        let (runtime, dir) = test_runtime("redecorate", 60_000);
        runtime.execute(Command::Decorate { id: "a".into() });
        runtime.execute(Command::Decorate { id: "a".into() });
        assert_eq!(runtime.pending_timers(), 1);
        cleanup(&dir);
    }

    #[tokio::test]
    async fn reset_cancels_timers_and_publishes() {
        let (runtime, dir) = test_runtime("reset", 60_000);
        let seen = watch_events(&runtime);

        for id in ["a", "b", "c"] {
            runtime.execute(Command::Decorate { id: id.into() });
        }
        assert_eq!(runtime.pending_timers(), 3);

        let r = runtime.execute(Command::Reset);
        assert!(r.is_ok());
        assert_eq!(runtime.pending_timers(), 0);
        for id in ["a", "b", "c"] {
            assert!(!runtime.is_decorated(id));
        }

        let seen = seen.lock().unwrap();
        assert!(matches!(seen.last(), Some(DecorEvent::Reset { ids }) if ids.len() == 3));
        cleanup(&dir);
    }

    #[tokio::test]
    async fn sweep_once_is_the_backstop_for_lost_timers() {
        let (runtime, dir) = test_runtime("sweep", 100);
        let seen = watch_events(&runtime);

        runtime.execute(Command::Decorate { id: "a".into() });
        // Simulate a lost timer (e.g. machine suspend): kill everything,
        // let the cooldown lapse, then sweep.
        runtime.stop();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!runtime.is_decorated("a"));

        runtime.sweep_once();
        assert_eq!(
            {
                let sys = runtime.sys().lock().unwrap();
                sys.store().len()
            },
            0
        );
        let seen = seen.lock().unwrap();
        assert!(seen
            .iter()
            .any(|ev| matches!(ev, DecorEvent::Expired { id } if id == "a")));
        cleanup(&dir);
    }

    #[tokio::test]
    async fn sweep_rearms_live_entries_without_timers() {
        let (runtime, dir) = test_runtime("rearm", 60_000);
        runtime.execute(Command::Decorate { id: "a".into() });
        runtime.stop();
        assert_eq!(runtime.pending_timers(), 0);

        runtime.sweep_once();
        assert_eq!(runtime.pending_timers(), 1);
        runtime.stop();
        cleanup(&dir);
    }

    #[tokio::test]
    async fn start_evicts_lapsed_and_rearms_survivors() {
        let dir = test_config("start", 60_000);
        // Seed the slot with one long-lapsed entry and one live one.
        // Encoded form of "old,10|live,<future sec>".
        let future_sec = (now_ms() + 50_000) / 1000;
        std::fs::write(
            dir.join("tree_decor_v1"),
            format!("old%2C10%7Clive%2C{}", future_sec),
        )
        .unwrap();

        let sys = Arc::new(Mutex::new(Sys::new(dir.clone())));
        let runtime = DecorRuntime::new(sys);
        let seen = watch_events(&runtime);

        runtime.start();
        assert!(!runtime.is_decorated("old"));
        assert!(runtime.is_decorated("live"));
        assert_eq!(runtime.pending_timers(), 1);

        let seen = seen.lock().unwrap();
        assert!(seen
            .iter()
            .any(|ev| matches!(ev, DecorEvent::Expired { id } if id == "old")));

        runtime.stop();
        cleanup(&dir);
    }

    #[tokio::test]
    async fn popup_countdown_ticks_then_expires() {
        let (runtime, dir) = test_runtime("popup", 100);
        let seen = watch_events(&runtime);

        runtime.execute(Command::Decorate { id: "a".into() });
        runtime.popup_opened("a");
        assert!(runtime.is_ticking());

        // Immediate render happened synchronously.
        {
            let seen = seen.lock().unwrap();
            assert!(seen
                .iter()
                .any(|ev| matches!(ev, DecorEvent::Tick { id, left_ms } if id == "a" && *left_ms > 0)));
        }

        // Past the cooldown the entry is evicted exactly once, whichever of
        // the expiry timer or the countdown tick observes it first.
        tokio::time::sleep(Duration::from_millis(1_600)).await;
        assert!(!runtime.is_decorated("a"));
        assert!(!runtime.is_ticking());
        let seen = seen.lock().unwrap();
        let expired: Vec<_> = seen
            .iter()
            .filter(|ev| matches!(ev, DecorEvent::Expired { .. }))
            .collect();
        assert_eq!(expired.len(), 1);
        cleanup(&dir);
    }

    #[tokio::test]
    async fn popup_closed_stops_ticking() {
        let (runtime, dir) = test_runtime("popup-close", 60_000);
        runtime.execute(Command::Decorate { id: "a".into() });
        runtime.popup_opened("a");
        assert!(runtime.is_ticking());

        runtime.popup_closed();
        assert!(!runtime.is_ticking());
        runtime.stop();
        cleanup(&dir);
    }

    #[tokio::test]
    async fn popup_for_undecorated_marker_stays_idle() {
        let (runtime, dir) = test_runtime("popup-idle", 60_000);
        runtime.popup_opened("a");
        assert!(!runtime.is_ticking());
        cleanup(&dir);
    }
}
