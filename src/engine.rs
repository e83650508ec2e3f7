//! Boundary traits for the external collaborators the coordinator drives
//!
//! The coordinator does not own a real audio stack. It commands a media
//! engine, reads a session credential store, and configures the shared
//! audio session through the traits defined here; the hosting shell
//! supplies concrete implementations (and tests supply scripted ones).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;

/// A playable media source: locator plus optional request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSource {
    /// Source URI handed to the engine unmodified
    pub uri: String,

    /// Request headers attached to media fetches (e.g. a `Cookie` header)
    pub headers: Option<HashMap<String, String>>,
}

/// Metadata shown on the lock screen / background playback surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingInfo {
    pub title: String,
    pub artist: String,
    pub artwork_url: String,
}

/// Raw playback status as reported by the media engine.
///
/// This is the engine-specific vocabulary; [`crate::status::normalize`]
/// maps it into the coarse states the host understands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerStatus {
    /// Engine finished loading the current media
    pub is_loaded: bool,

    /// Loaded but stalled waiting for data
    pub is_buffering: bool,

    /// Actively advancing
    pub is_playing: bool,

    /// The current track just played to its end
    ///
    /// Some platforms re-emit this for the same track; the coordinator
    /// debounces duplicates within a short window.
    pub did_just_finish: bool,

    /// Playback position in seconds
    pub current_time: f64,
}

/// How the audio session behaves when another app wants the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionPolicy {
    /// Exclusive output: other audio is interrupted
    DoNotMix,
    /// Other audio keeps playing alongside
    MixWithOthers,
}

/// Audio session configuration applied once per process (see [`crate::session::Session`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSessionMode {
    /// Keep playing when the app is backgrounded
    pub play_in_background: bool,

    /// Keep playing under the hardware silent/mute switch
    pub play_in_silent_mode: bool,

    pub interruption: InterruptionPolicy,
}

impl Default for AudioSessionMode {
    fn default() -> Self {
        Self {
            play_in_background: true,
            play_in_silent_mode: true,
            interruption: InterruptionPolicy::DoNotMix,
        }
    }
}

/// The single underlying media engine instance.
///
/// Exactly one exists per process lifetime; it is constructed lazily by
/// the [`crate::session::Session`] and never torn down.
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Replace the loaded media source; `None` detaches the current one.
    fn replace_source(&self, source: Option<&TrackSource>);

    /// Apply a playback rate to whatever is currently loaded.
    fn set_rate(&self, rate: f64);

    /// Mark the engine active (or inactive) for lock-screen/background
    /// display, with the metadata to show while active.
    fn set_now_playing(&self, active: bool, info: Option<&NowPlayingInfo>);

    /// Start or resume playback.
    ///
    /// Engine-level failures (bad URL, network, decode) surface here
    /// unmodified; the coordinator does not translate them.
    async fn play(&self) -> Result<()>;

    /// Pause playback.
    fn pause(&self);

    /// Seek to an absolute position in seconds.
    async fn seek_to(&self, position: f64) -> Result<()>;

    /// Subscribe to the raw status stream.
    ///
    /// Every receiver sees every status update emitted after its
    /// subscription; slow receivers may observe lag.
    fn subscribe_status(&self) -> broadcast::Receiver<PlayerStatus>;
}

/// One-time configurator for the shared audio session.
#[async_trait]
pub trait SessionModeConfigurator: Send + Sync {
    async fn configure(&self, mode: &AudioSessionMode) -> Result<()>;
}

/// Best-effort store of session credentials (cookies) keyed by URL.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Cookies applicable to `url`, as name → value.
    ///
    /// Callers treat any error (and an empty map) as "no credentials".
    async fn cookies_for(&self, url: &str) -> Result<HashMap<String, String>>;
}
