//! GroveMap core — marker cooldown state, expiry scheduling, and display
//! indexing for the GroveMap viewer.
//!
//! The `decor` module owns the cooldown subsystem: the persistent TTL store,
//! the expiry scheduler, the popup countdown, and the event hub that keeps
//! every rendered surface in sync. The `markers` module loads the marker
//! catalog and assigns display numbers. The `view` module builds the content
//! each surface shows; actually drawing it is the job of the shells (the
//! Tauri app and the CLI).

pub mod command;
pub mod decor;
pub mod help;
pub mod markers;
pub mod response;
pub mod sys;
pub mod types;
pub mod view;

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// All cooldown arithmetic is `expiry - now` against this ambient clock;
/// a user-effected clock change shifts every remaining time accordingly.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_ms_is_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }

    #[test]
    fn now_ms_is_past_2020() {
        // 2020-01-01 in ms
        assert!(now_ms() > 1_577_836_800_000);
    }
}
