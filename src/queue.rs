//! Queue model
//!
//! The ordered list of tracks plus the current-position cursor. This is
//! the single mutable source of truth for playback position; it is owned
//! exclusively by the coordinator task and never handed out by reference.

use crate::engine::{NowPlayingInfo, TrackSource};

/// A single entry in the playback queue.
///
/// Immutable once constructed; the whole set is replaced atomically on
/// each successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueTrack {
    pub source: TrackSource,
    pub title: String,
    pub artist: String,
    pub artwork_url: String,
}

impl QueueTrack {
    /// Lock-screen metadata for this track.
    pub fn now_playing(&self) -> NowPlayingInfo {
        NowPlayingInfo {
            title: self.title.clone(),
            artist: self.artist.clone(),
            artwork_url: self.artwork_url.clone(),
        }
    }
}

/// Ordered track sequence with a current-position cursor.
///
/// `current` is `None` when no track is active (the host-facing wire
/// encodes that as index −1). Whenever the queue is non-empty and was
/// populated through [`Queue::replace`] with an in-range start index,
/// the cursor points at a valid entry.
#[derive(Debug, Default)]
pub struct Queue {
    tracks: Vec<QueueTrack>,
    current: Option<usize>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the track sequence and set the cursor.
    ///
    /// No bounds validation: an out-of-range start index is a caller
    /// contract violation and surfaces when playback is attempted.
    pub fn replace(&mut self, tracks: Vec<QueueTrack>, start_index: usize) {
        self.tracks = tracks;
        self.current = Some(start_index);
    }

    /// Empty the sequence and reset the cursor.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The track under the cursor, if the cursor points at a valid entry.
    pub fn current_track(&self) -> Option<&QueueTrack> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    /// Move the cursor to `index`.
    ///
    /// Returns the prior cursor on success; `None` (and no mutation) if
    /// `index` is out of range.
    pub fn skip_to(&mut self, index: usize) -> Option<Option<usize>> {
        if index >= self.tracks.len() {
            return None;
        }
        let prior = self.current;
        self.current = Some(index);
        Some(prior)
    }

    /// Advance the cursor to the next track, if one exists.
    ///
    /// Returns `(prior, new)` indices on success; `None` if the cursor
    /// is unset or already at the last track.
    pub fn advance(&mut self) -> Option<(usize, usize)> {
        let prior = self.current?;
        let next = prior.checked_add(1)?;
        if next >= self.tracks.len() {
            return None;
        }
        self.current = Some(next);
        Some((prior, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(uri: &str) -> QueueTrack {
        QueueTrack {
            source: TrackSource {
                uri: uri.to_string(),
                headers: None,
            },
            title: format!("title {uri}"),
            artist: "artist".to_string(),
            artwork_url: "https://covers.invalid/a.jpg".to_string(),
        }
    }

    #[test]
    fn empty_queue_has_no_cursor() {
        let queue = Queue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), None);
        assert!(queue.current_track().is_none());
    }

    #[test]
    fn replace_sets_tracks_and_cursor() {
        let mut queue = Queue::new();
        queue.replace(vec![track("a"), track("b")], 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(queue.current_track().unwrap().source.uri, "b");
    }

    #[test]
    fn replace_discards_previous_contents() {
        let mut queue = Queue::new();
        queue.replace(vec![track("a"), track("b"), track("c")], 2);
        queue.replace(vec![track("x")], 0);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.current_track().unwrap().source.uri, "x");
    }

    #[test]
    fn out_of_range_start_index_yields_no_current_track() {
        let mut queue = Queue::new();
        queue.replace(vec![track("a")], 7);
        assert!(queue.current_track().is_none());
    }

    #[test]
    fn clear_resets_everything() {
        let mut queue = Queue::new();
        queue.replace(vec![track("a")], 0);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), None);
    }

    #[test]
    fn skip_to_in_range_returns_prior_cursor() {
        let mut queue = Queue::new();
        queue.replace(vec![track("a"), track("b")], 0);
        assert_eq!(queue.skip_to(1), Some(Some(0)));
        assert_eq!(queue.current_index(), Some(1));
    }

    #[test]
    fn skip_to_out_of_range_is_a_no_op() {
        let mut queue = Queue::new();
        queue.replace(vec![track("a"), track("b")], 0);
        assert_eq!(queue.skip_to(2), None);
        assert_eq!(queue.current_index(), Some(0));

        let mut empty = Queue::new();
        assert_eq!(empty.skip_to(0), None);
    }

    #[test]
    fn advance_walks_to_the_end_then_stops() {
        let mut queue = Queue::new();
        queue.replace(vec![track("a"), track("b")], 0);
        assert_eq!(queue.advance(), Some((0, 1)));
        assert_eq!(queue.advance(), None);
        assert_eq!(queue.current_index(), Some(1));
    }

    #[test]
    fn advance_without_cursor_is_a_no_op() {
        let mut queue = Queue::new();
        assert_eq!(queue.advance(), None);
    }
}
