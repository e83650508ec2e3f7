//! # cuebridge
//!
//! Playback queue coordinator for a hosted web surface.
//!
//! **Purpose:** Own the authoritative playback queue, serialize load
//! requests, drive a single underlying media engine through track
//! transitions, debounce noisy hardware/OS completion signals, and push
//! a normalized event stream back to the host interface.
//!
//! **Architecture:** A single-writer actor task
//! ([`coordinator::Coordinator`]) owns all mutable state; commands and
//! raw engine status updates arrive over one mpsc channel, so mutations
//! are strictly ordered. The media engine, the audio session
//! configurator, and the credential store are external collaborators
//! behind the traits in [`engine`]; the transport carrying messages in
//! and out is the caller's concern ([`messages::dispatch`] accepts the
//! raw JSON it delivers).

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod events;
pub mod messages;
pub mod queue;
pub mod session;
pub mod status;

pub use coordinator::{Coordinator, CoordinatorHandle, EventSubscription};
pub use engine::{
    AudioSessionMode, CredentialStore, InterruptionPolicy, MediaPlayer, NowPlayingInfo,
    PlayerStatus, SessionModeConfigurator, TrackSource,
};
pub use error::{Error, Result};
pub use events::{EventBridge, OutboundEvent, PlaybackState};
pub use messages::{dispatch, BookMetadata, InboundMessage, LoadRequest, TrackInfo};
pub use queue::{Queue, QueueTrack};
pub use session::{PlayerFactory, Session};
