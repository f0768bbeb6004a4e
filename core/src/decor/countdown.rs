//! PopupCountdown — once-per-second re-render of the open popup.
//!
//! Two states: idle (nothing ticking) and ticking (an interval task is
//! running for the open popup). Only one popup is open at a time, so at
//! most one interval ever exists; entering the ticking state tears down
//! whatever was ticking before. A tick that observes the cooldown as
//! lapsed stops itself and routes into the expiry path, so the popup,
//! icon, and list row all flip together.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::decor::POPUP_TICK_MS;


/// Callbacks driving one ticking popup.
#[derive(Clone)]
pub struct TickHooks {
    /// Remaining cooldown for an id, read at call time.
    pub time_left: Arc<dyn Fn(&str) -> i64 + Send + Sync>,
    /// Invoked with the fresh remaining time, once immediately on start and
    /// then once per second.
    pub on_tick: Arc<dyn Fn(&str, i64) + Send + Sync>,
    /// Invoked when a tick observes the cooldown as lapsed.
    pub on_expired: Arc<dyn Fn(&str) + Send + Sync>,
}


struct ActiveTicker {
    id: String,
    abort: AbortHandle,
}


pub struct PopupCountdown {
    handle: Handle,
    active: Arc<Mutex<Option<ActiveTicker>>>,
}


impl PopupCountdown {
    /// Must be constructed inside a Tokio runtime.
    pub fn new() -> PopupCountdown {
        PopupCountdown {
            handle: Handle::current(),
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Enter the ticking state for `id`.
    ///
    /// Any previous interval is torn down first. The current remaining time
    /// is rendered immediately; if it is already non-positive the expired
    /// hook fires instead and the driver stays idle.
    pub fn start(&self, id: &str, hooks: TickHooks) {
        self.stop();

        let left = (hooks.time_left)(id);
        if left <= 0 {
            (hooks.on_expired)(id);
            return;
        }
        (hooks.on_tick)(id, left);

        let active = Arc::clone(&self.active);
        let key = id.to_string();
        let task = self.handle.spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(POPUP_TICK_MS)).await;
                let left = (hooks.time_left)(&key);
                if left <= 0 {
                    // Clear our own slot, but only if we are still the
                    // active ticker (start() may have replaced us).
                    let mut guard = active.lock().unwrap_or_else(|e| e.into_inner());
                    if guard.as_ref().map(|t| t.id == key).unwrap_or(false) {
                        *guard = None;
                    }
                    drop(guard);
                    (hooks.on_expired)(&key);
                    return;
                }
                (hooks.on_tick)(&key, left);
            }
        });

        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = Some(ActiveTicker {
            id: id.to_string(),
            abort: task.abort_handle(),
        });
    }

    /// Return to idle. Called when the popup closes.
    pub fn stop(&self) {
        if let Some(ticker) = self
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            ticker.abort.abort();
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Id of the popup currently ticking, if any.
    pub fn active_id(&self) -> Option<String> {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|t| t.id.clone())
    }
}

impl Default for PopupCountdown {
    fn default() -> Self {
        PopupCountdown::new()
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    struct Probe {
        ticks: Arc<Mutex<Vec<i64>>>,
        expired: Arc<Mutex<Vec<String>>>,
    }

    /// Hooks whose remaining time counts down against the (test) clock from
    /// `left_ms` at the moment of creation.
    fn probe_hooks(left_ms: u64) -> (TickHooks, Probe) {
        let deadline = Instant::now() + Duration::from_millis(left_ms);
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let expired = Arc::new(Mutex::new(Vec::new()));

        let tick_sink = Arc::clone(&ticks);
        let expired_sink = Arc::clone(&expired);
        let hooks = TickHooks {
            time_left: Arc::new(move |_id| {
                deadline.saturating_duration_since(Instant::now()).as_millis() as i64
            }),
            on_tick: Arc::new(move |_id, left| tick_sink.lock().unwrap().push(left)),
            on_expired: Arc::new(move |id: &str| {
                expired_sink.lock().unwrap().push(id.to_string())
            }),
        };
        (hooks, Probe { ticks, expired })
    }

    #[tokio::test(start_paused = true)]
    async fn start_renders_immediately() {
        let countdown = PopupCountdown::new();
        let (hooks, probe) = probe_hooks(5_000);
        countdown.start("m1", hooks);

        assert!(countdown.is_ticking());
        assert_eq!(countdown.active_id().as_deref(), Some("m1"));
        let ticks = probe.ticks.lock().unwrap();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0], 5_000);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second() {
        let countdown = PopupCountdown::new();
        let (hooks, probe) = probe_hooks(10_000);
        countdown.start("m1", hooks);

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        let ticks = probe.ticks.lock().unwrap();
        // Immediate render plus three interval ticks.
        assert_eq!(ticks.len(), 4);
        assert_eq!(ticks[0], 10_000);
        assert!(ticks[1] <= 9_000 && ticks[1] > 8_000);
        assert!(probe.expired.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn lapsed_tick_fires_expired_and_goes_idle() {
        let countdown = PopupCountdown::new();
        let (hooks, probe) = probe_hooks(1_500);
        countdown.start("m1", hooks);

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(*probe.expired.lock().unwrap(), vec!["m1".to_string()]);
        assert!(!countdown.is_ticking());

        // No further ticks after going idle.
        let tick_count = probe.ticks.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(probe.ticks.lock().unwrap().len(), tick_count);
    }

    #[tokio::test(start_paused = true)]
    async fn already_lapsed_start_stays_idle() {
        let countdown = PopupCountdown::new();
        let (hooks, probe) = probe_hooks(0);
        countdown.start("m1", hooks);

        assert!(!countdown.is_ticking());
        assert_eq!(*probe.expired.lock().unwrap(), vec!["m1".to_string()]);
        assert!(probe.ticks.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_ticking() {
        let countdown = PopupCountdown::new();
        let (hooks, probe) = probe_hooks(10_000);
        countdown.start("m1", hooks);
        countdown.stop();
        assert!(!countdown.is_ticking());

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        // Only the immediate render happened.
        assert_eq!(probe.ticks.lock().unwrap().len(), 1);
        assert!(probe.expired.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_tears_down_previous_interval() {
        let countdown = PopupCountdown::new();
        let (hooks_a, probe_a) = probe_hooks(10_000);
        countdown.start("m1", hooks_a);

        let (hooks_b, probe_b) = probe_hooks(10_000);
        countdown.start("m2", hooks_b);
        assert_eq!(countdown.active_id().as_deref(), Some("m2"));

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        // The first popup's interval is dead; only its immediate render ran.
        assert_eq!(probe_a.ticks.lock().unwrap().len(), 1);
        assert_eq!(probe_b.ticks.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_idle_is_noop() {
        let countdown = PopupCountdown::new();
        countdown.stop();
        assert!(!countdown.is_ticking());
    }
}
