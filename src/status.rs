//! Status normalization and finish-signal debouncing
//!
//! Raw engine status updates carry a platform-specific vocabulary; the
//! host only understands four coarse states. Completion signals can be
//! re-emitted by the hardware/OS layer for the same track, so an
//! accepted finish suppresses duplicates arriving shortly after it.

use tokio::time::{Duration, Instant};

use crate::engine::PlayerStatus;
use crate::events::PlaybackState;

/// Window within which a second "finished" signal is treated as a
/// duplicate re-emission rather than a real completion.
pub const FINISH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Map a raw engine status to the coarse state vocabulary.
///
/// Priority order: not yet loaded wins over stalled wins over playing,
/// with paused as the fallback.
pub fn normalize(status: &PlayerStatus) -> PlaybackState {
    if !status.is_loaded {
        PlaybackState::Loading
    } else if status.is_buffering {
        PlaybackState::Buffering
    } else if status.is_playing {
        PlaybackState::Playing
    } else {
        PlaybackState::Paused
    }
}

/// Duplicate-suppression state for completion signals.
#[derive(Debug, Default)]
pub struct FinishDebounce {
    last_accepted: Option<Instant>,
}

impl FinishDebounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept or reject a finish signal arriving now.
    ///
    /// Rejects when the previous accepted signal is less than
    /// [`FINISH_DEBOUNCE`] old; otherwise records this one and accepts.
    pub fn accept(&mut self) -> bool {
        let now = Instant::now();
        if let Some(prev) = self.last_accepted {
            if now.duration_since(prev) < FINISH_DEBOUNCE {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }

    /// Forget the last accepted signal (done on every new load, so a
    /// fresh queue's first finish is never suppressed).
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(is_loaded: bool, is_buffering: bool, is_playing: bool) -> PlayerStatus {
        PlayerStatus {
            is_loaded,
            is_buffering,
            is_playing,
            ..PlayerStatus::default()
        }
    }

    #[test]
    fn normalize_priority_order() {
        // Loading wins regardless of the other flags
        assert_eq!(normalize(&status(false, true, true)), PlaybackState::Loading);
        assert_eq!(normalize(&status(false, false, false)), PlaybackState::Loading);

        // Buffering wins over playing
        assert_eq!(normalize(&status(true, true, true)), PlaybackState::Buffering);

        assert_eq!(normalize(&status(true, false, true)), PlaybackState::Playing);
        assert_eq!(normalize(&status(true, false, false)), PlaybackState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_finish_within_window_is_rejected() {
        let mut debounce = FinishDebounce::new();
        assert!(debounce.accept());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(!debounce.accept());
    }

    #[tokio::test(start_paused = true)]
    async fn finish_after_window_is_accepted() {
        let mut debounce = FinishDebounce::new();
        assert!(debounce.accept());

        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(debounce.accept());
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_signal_does_not_extend_the_window() {
        let mut debounce = FinishDebounce::new();
        assert!(debounce.accept());

        tokio::time::advance(Duration::from_millis(400)).await;
        assert!(!debounce.accept());

        // 600ms since the accepted signal, 200ms since the rejected one
        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(debounce.accept());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_suppression() {
        let mut debounce = FinishDebounce::new();
        assert!(debounce.accept());
        debounce.reset();
        assert!(debounce.accept());
    }
}
