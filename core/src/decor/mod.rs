//! Decoration cooldown subsystem.
//!
//! `store` holds the `id → expiry` map and its persisted slot encoding
//! (`codec`). `scheduler` arms one-shot timers so expiries become visible
//! without any user interaction, and `countdown` drives the once-per-second
//! popup re-render. `events` defines the change notifications surfaces
//! subscribe to, and `runtime` ties all of it together behind the
//! synchronization contract: every state change reaches every surface
//! before the call that caused it returns.

pub mod codec;
pub mod countdown;
pub mod events;
pub mod runtime;
pub mod scheduler;
pub mod store;

/// Slack added to every expiry timer so it never fires at or before the
/// boundary due to timer-resolution jitter.
pub const EXPIRY_SLACK_MS: u64 = 50;

/// Interval of the fallback sweep that evicts lapsed entries the per-entry
/// timers missed (e.g. across suspend).
pub const SWEEP_INTERVAL_MS: u64 = 30_000;

/// Popup countdown re-render interval.
pub const POPUP_TICK_MS: u64 = 1_000;
