//! Inbound structured messages from the host interface
//!
//! The host drives the coordinator with `type`-tagged JSON messages.
//! Validation is presence/type checking only: a message that fails to
//! parse (unknown type, missing field, malformed numeric field) is
//! silently dropped, never answered with an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinator::CoordinatorHandle;
use crate::error::Result;

/// One requested track within a load message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Position of the track within the request (informational)
    pub index: usize,

    pub url: String,

    /// Per-track display title; falls back to the book title when absent
    /// or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Book-level display metadata applied to every track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    pub book_title: String,
    pub author_name: String,
    pub cover_url: String,
}

/// A queue-replacement request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    pub tracks: Vec<TrackInfo>,
    pub start_index: usize,
    pub rate: f64,
    pub metadata: BookMetadata,
}

/// Commands accepted from the host, in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    Load(LoadRequest),
    Pause,
    Resume,
    Stop,
    SkipTo { index: usize },
    SetRate { rate: f64 },
    SeekTo { position: f64 },
}

/// Parse and apply one raw host message.
///
/// Malformed input is dropped without an error; errors returned here are
/// command failures (session setup, engine) propagating to the caller.
pub async fn dispatch(handle: &CoordinatorHandle, raw: &str) -> Result<()> {
    let message = match serde_json::from_str::<InboundMessage>(raw) {
        Ok(message) => message,
        Err(error) => {
            debug!(%error, "ignoring malformed host message");
            return Ok(());
        }
    };
    handle.apply(message).await
}
