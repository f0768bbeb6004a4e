//! ExpiryScheduler — one-shot timers that fire when a cooldown lapses.
//!
//! One pending timer per id, at most. Re-scheduling cancels and replaces;
//! it never stacks. Timers carry a small slack past the expiry instant so
//! a fire never observes the entry as still live. The scheduler is the
//! responsiveness optimization; the periodic sweep in the runtime is the
//! correctness backstop for timers lost across suspend or sleep.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::decor::EXPIRY_SLACK_MS;

pub type ExpireFn = Arc<dyn Fn(&str) + Send + Sync>;


pub struct ExpiryScheduler {
    handle: Handle,
    timers: Arc<Mutex<HashMap<String, AbortHandle>>>,
    on_expire: ExpireFn,
}


impl ExpiryScheduler {
    /// Create a scheduler that invokes `on_expire` when a timer fires.
    ///
    /// Must be constructed inside a Tokio runtime; the handle is captured
    /// here so timers can be armed from any thread afterwards.
    pub fn new(on_expire: ExpireFn) -> ExpiryScheduler {
        ExpiryScheduler {
            handle: Handle::current(),
            timers: Arc::new(Mutex::new(HashMap::new())),
            on_expire,
        }
    }

    /// Arm (or re-arm) the timer for `id` given its remaining time.
    ///
    /// Any pending timer for the id is cancelled first. A non-positive
    /// `time_left_ms` (including an id with no entry at all) invokes the
    /// callback synchronously instead of arming anything.
    pub fn schedule(&self, id: &str, time_left_ms: i64) {
        self.clear(id);

        if time_left_ms <= 0 {
            (self.on_expire)(id);
            return;
        }

        let delay = Duration::from_millis(time_left_ms as u64 + EXPIRY_SLACK_MS);
        let timers = Arc::clone(&self.timers);
        let on_expire = Arc::clone(&self.on_expire);
        let key = id.to_string();

        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            timers
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&key);
            on_expire(&key);
        });

        self.timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string(), task.abort_handle());
    }

    /// Re-arm timers for entries that survived a reload.
    pub fn schedule_all<I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        for (id, left) in pairs {
            self.schedule(&id, left);
        }
    }

    /// Cancel the pending timer for `id` without touching store state.
    pub fn clear(&self, id: &str) {
        if let Some(handle) = self
            .timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
        {
            handle.abort();
        }
    }

    /// Cancel every pending timer.
    pub fn clear_all(&self) {
        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }

    /// A detached cancel handle, usable from hooks that outlive `&self`.
    pub fn canceller(&self) -> impl Fn(&str) + Send + Sync + 'static {
        let timers = Arc::clone(&self.timers);
        move |id: &str| {
            if let Some(handle) = timers
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(id)
            {
                handle.abort();
            }
        }
    }

    pub fn is_scheduled(&self, id: &str) -> bool {
        self.timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }

    /// Number of pending timers.
    pub fn pending(&self) -> usize {
        self.timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
