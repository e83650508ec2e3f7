//! Outbound events and the bridge that carries them to the host
//!
//! Every notification the coordinator pushes to the host interface is an
//! [`OutboundEvent`], serialized as a `type`-tagged JSON object. The
//! [`EventBridge`] holds at most one subscriber at a time; emissions are
//! fire-and-forget and are silently dropped while no subscriber is
//! registered.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

/// Coarse playback state reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Loading,
    Buffering,
    Playing,
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Loading => write!(f, "loading"),
            PlaybackState::Buffering => write!(f, "buffering"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Notifications pushed from the coordinator to the host interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundEvent {
    /// Emitted for every raw status update from the engine.
    #[serde(rename_all = "camelCase")]
    PlaybackState { state: PlaybackState },

    /// The current-position cursor moved, by skip or auto-advance.
    ///
    /// `last_index` is −1 when no track was active before the change.
    #[serde(rename_all = "camelCase")]
    TrackChanged { index: usize, last_index: i64 },

    /// Natural completion occurred at the final track; no advance.
    #[serde(rename_all = "camelCase")]
    QueueEnded { track: usize, position: f64 },
}

/// The single outbound notification path to the host.
///
/// Registering a subscriber replaces any previous one; clearing leaves
/// subsequent emissions as silent no-ops, never errors.
#[derive(Clone, Default)]
pub struct EventBridge {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<OutboundEvent>>>>,
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `tx` as the subscriber, replacing any previous one.
    pub fn install(&self, tx: mpsc::UnboundedSender<OutboundEvent>) {
        *self.tx.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
    }

    /// Drop the current subscriber, if any.
    pub fn clear(&self) {
        *self.tx.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_registered(&self) -> bool {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Push an event to the subscriber, best-effort.
    ///
    /// Dropped without error when no subscriber is registered or the
    /// receiving side has gone away.
    pub fn emit(&self, event: OutboundEvent) {
        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(event).is_err() {
                    trace!("event receiver dropped; emission discarded");
                }
            }
            None => trace!(?event, "no event subscriber; emission discarded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_state_serializes_lowercase() {
        let json = serde_json::to_string(&OutboundEvent::PlaybackState {
            state: PlaybackState::Buffering,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"playbackState","state":"buffering"}"#);
    }

    #[test]
    fn track_changed_uses_camel_case_fields() {
        let json = serde_json::to_string(&OutboundEvent::TrackChanged {
            index: 2,
            last_index: 1,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"trackChanged","index":2,"lastIndex":1}"#);
    }

    #[test]
    fn queue_ended_carries_track_and_position() {
        let json = serde_json::to_string(&OutboundEvent::QueueEnded {
            track: 4,
            position: 12.5,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"queueEnded","track":4,"position":12.5}"#);
    }

    #[test]
    fn emit_without_subscriber_is_a_no_op() {
        let bridge = EventBridge::new();
        assert!(!bridge.is_registered());
        bridge.emit(OutboundEvent::PlaybackState {
            state: PlaybackState::Playing,
        });
    }

    #[test]
    fn install_replaces_previous_subscriber() {
        let bridge = EventBridge::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        bridge.install(tx1);
        bridge.install(tx2);
        bridge.emit(OutboundEvent::PlaybackState {
            state: PlaybackState::Paused,
        });

        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn clear_silences_subsequent_emissions() {
        let bridge = EventBridge::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        bridge.install(tx);
        bridge.clear();
        bridge.emit(OutboundEvent::PlaybackState {
            state: PlaybackState::Playing,
        });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn emit_with_dropped_receiver_does_not_error() {
        let bridge = EventBridge::new();
        let (tx, rx) = mpsc::unbounded_channel();
        bridge.install(tx);
        drop(rx);
        bridge.emit(OutboundEvent::QueueEnded {
            track: 0,
            position: 0.0,
        });
    }
}
