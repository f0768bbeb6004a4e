//! Decoration change notifications and the surface hub.
//!
//! The store side publishes a small set of events; each presentational
//! surface (map icon layer, popup panel, list rows) subscribes on its own.
//! The hub never knows how many surfaces exist, and a surface never reaches
//! into the store map directly.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum DecorEvent {
    /// A marker was decorated (or re-decorated, refreshing its cooldown).
    #[serde(rename = "decorated")]
    Decorated { id: String, expires_at_ms: u64 },

    /// A marker's cooldown lapsed and its entry was evicted.
    #[serde(rename = "expired")]
    Expired { id: String },

    /// All cooldowns were cleared; `ids` lists the markers that had one.
    #[serde(rename = "reset")]
    Reset { ids: Vec<String> },

    /// Once-per-second countdown tick for the currently open popup.
    #[serde(rename = "tick")]
    Tick { id: String, left_ms: i64 },
}


impl DecorEvent {
    /// The marker id an event concerns, if it concerns exactly one.
    pub fn marker_id(&self) -> Option<&str> {
        match self {
            DecorEvent::Decorated { id, .. } => Some(id),
            DecorEvent::Expired { id } => Some(id),
            DecorEvent::Tick { id, .. } => Some(id),
            DecorEvent::Reset { .. } => None,
        }
    }
}


type Subscriber = Box<dyn Fn(&DecorEvent) + Send + Sync>;

/// Fan-out point between the cooldown state and the rendered surfaces.
#[derive(Default)]
pub struct SurfaceHub {
    subscribers: Mutex<Vec<Subscriber>>,
}


impl SurfaceHub {
    pub fn new() -> SurfaceHub {
        SurfaceHub::default()
    }

    /// Register a surface callback. Subscriptions last for the hub's
    /// lifetime; surfaces that go away simply ignore further events.
    pub fn subscribe(&self, callback: impl Fn(&DecorEvent) + Send + Sync + 'static) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(callback));
    }

    /// Deliver an event to every subscriber, in subscription order.
    pub fn publish(&self, event: &DecorEvent) {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        for subscriber in subscribers.iter() {
            subscriber(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}
