//! Playback queue coordinator
//!
//! Single-writer actor that owns the queue, the playback rate, and the
//! finish debounce. Every mutating command — and every raw status update
//! from the engine — flows through one mpsc channel into the actor task,
//! so load operations, skips, stops, and auto-advances are strictly
//! ordered and can never observe half-built queue state.
//!
//! Callers hold a cloneable [`CoordinatorHandle`]; each command carries
//! a oneshot reply so a caller awaits only its own operation. A failed
//! operation replies with its error and the actor keeps running, so a
//! rejected load never blocks the ones queued behind it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{CredentialStore, MediaPlayer, PlayerStatus, TrackSource};
use crate::error::{Error, Result};
use crate::events::{EventBridge, OutboundEvent};
use crate::messages::{InboundMessage, LoadRequest};
use crate::queue::{Queue, QueueTrack};
use crate::session::Session;
use crate::status::{self, FinishDebounce};

/// Commands processed by the coordinator task.
enum Command {
    Load(LoadRequest, oneshot::Sender<Result<()>>),
    Pause(oneshot::Sender<()>),
    Resume(oneshot::Sender<Result<()>>),
    Stop(oneshot::Sender<()>),
    SkipTo(usize, oneshot::Sender<Result<()>>),
    SetRate(f64, oneshot::Sender<()>),
    SeekTo(f64, oneshot::Sender<Result<()>>),
    Status(PlayerStatus),
}

/// Buffered commands before senders start seeing backpressure.
const COMMAND_CAPACITY: usize = 64;

/// The actor state. Constructed and consumed by [`Coordinator::spawn`].
pub struct Coordinator {
    session: Arc<Session>,
    credentials: Arc<dyn CredentialStore>,
    bridge: EventBridge,
    queue: Queue,
    rate: f64,
    debounce: FinishDebounce,
    rx: mpsc::Receiver<Command>,
}

impl Coordinator {
    /// Spawn the coordinator task and return a handle to it.
    pub fn spawn(
        session: Arc<Session>,
        credentials: Arc<dyn CredentialStore>,
    ) -> CoordinatorHandle {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let bridge = EventBridge::new();
        let actor = Coordinator {
            session: session.clone(),
            credentials,
            bridge: bridge.clone(),
            queue: Queue::new(),
            rate: 1.0,
            debounce: FinishDebounce::new(),
            rx,
        };
        tokio::spawn(actor.run());
        CoordinatorHandle {
            tx,
            bridge,
            session,
        }
    }

    async fn run(mut self) {
        info!("coordinator task started");
        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Load(request, reply) => {
                    let _ = reply.send(self.handle_load(request).await);
                }
                Command::Pause(reply) => {
                    self.handle_pause();
                    let _ = reply.send(());
                }
                Command::Resume(reply) => {
                    let _ = reply.send(self.handle_resume().await);
                }
                Command::Stop(reply) => {
                    self.handle_stop();
                    let _ = reply.send(());
                }
                Command::SkipTo(index, reply) => {
                    let _ = reply.send(self.handle_skip_to(index).await);
                }
                Command::SetRate(rate, reply) => {
                    self.handle_set_rate(rate);
                    let _ = reply.send(());
                }
                Command::SeekTo(position, reply) => {
                    let _ = reply.send(self.handle_seek_to(position).await);
                }
                Command::Status(player_status) => {
                    self.handle_status(player_status).await;
                }
            }
        }
        debug!("all coordinator handles dropped; task exiting");
    }

    /// Replace the queue and start playback at the requested track.
    async fn handle_load(&mut self, request: LoadRequest) -> Result<()> {
        info!(
            tracks = request.tracks.len(),
            start_index = request.start_index,
            rate = request.rate,
            "loading queue"
        );
        self.session.setup().await?;
        let player = self.session.player();

        let headers = self.fetch_cookie_header(&request).await;

        let tracks: Vec<QueueTrack> = request
            .tracks
            .iter()
            .map(|track| QueueTrack {
                source: TrackSource {
                    uri: track.url.clone(),
                    headers: headers.clone(),
                },
                title: track
                    .title
                    .clone()
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| request.metadata.book_title.clone()),
                artist: request.metadata.author_name.clone(),
                artwork_url: request.metadata.cover_url.clone(),
            })
            .collect();

        self.queue.replace(tracks, request.start_index);
        self.rate = request.rate;
        self.debounce.reset();

        self.play_current(&player).await
    }

    /// Best-effort cookie lookup for the first requested track.
    ///
    /// Any failure (and an empty cookie set) yields no headers; the load
    /// proceeds without credentials.
    async fn fetch_cookie_header(
        &self,
        request: &LoadRequest,
    ) -> Option<HashMap<String, String>> {
        let url = &request.tracks.first()?.url;
        let cookies = match self.credentials.cookies_for(url).await {
            Ok(cookies) => cookies,
            Err(error) => {
                debug!(%error, "cookies unavailable; loading without credentials");
                return None;
            }
        };
        if cookies.is_empty() {
            return None;
        }
        let header = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        Some(HashMap::from([("Cookie".to_string(), header)]))
    }

    fn handle_pause(&self) {
        if let Some(player) = self.session.try_player() {
            debug!("pause");
            player.pause();
        }
    }

    async fn handle_resume(&self) -> Result<()> {
        match self.session.try_player() {
            Some(player) => {
                debug!("resume");
                player.play().await
            }
            None => Ok(()),
        }
    }

    /// Detach the engine and reset the queue to empty.
    ///
    /// The queue reset is unconditional; the engine commands only run if
    /// an engine instance exists. Emits no queue-transition event.
    fn handle_stop(&mut self) {
        info!("stop; clearing queue");
        if let Some(player) = self.session.try_player() {
            player.pause();
            player.set_now_playing(false, None);
            player.replace_source(None);
        }
        self.queue.clear();
    }

    /// Explicit skip. A no-op when no engine exists or the index is out
    /// of range: no engine command, no event.
    async fn handle_skip_to(&mut self, index: usize) -> Result<()> {
        let Some(player) = self.session.try_player() else {
            debug!(index, "skip ignored; no engine instance");
            return Ok(());
        };
        let Some(prior) = self.queue.skip_to(index) else {
            debug!(index, len = self.queue.len(), "skip ignored; index out of range");
            return Ok(());
        };
        let last_index = prior.map(|i| i as i64).unwrap_or(-1);
        info!(index, last_index, "skipping to track");
        let result = self.play_current(&player).await;
        self.bridge.emit(OutboundEvent::TrackChanged { index, last_index });
        result
    }

    fn handle_set_rate(&mut self, rate: f64) {
        debug!(rate, "set rate");
        self.rate = rate;
        if let Some(player) = self.session.try_player() {
            player.set_rate(rate);
        }
    }

    async fn handle_seek_to(&self, position: f64) -> Result<()> {
        match self.session.try_player() {
            Some(player) => {
                debug!(position, "seek");
                player.seek_to(position).await
            }
            None => Ok(()),
        }
    }

    /// Process one raw status update: normalize and report the coarse
    /// state, then run completion handling for finish signals.
    async fn handle_status(&mut self, player_status: PlayerStatus) {
        let state = status::normalize(&player_status);
        self.bridge.emit(OutboundEvent::PlaybackState { state });

        if !player_status.did_just_finish {
            return;
        }
        if !self.debounce.accept() {
            debug!("duplicate finish signal suppressed");
            return;
        }

        match self.queue.advance() {
            Some((prior, next)) => {
                info!(from = prior, to = next, "auto-advancing to next track");
                let player = self.session.player();
                if let Err(error) = self.play_current(&player).await {
                    warn!(%error, "auto-advance playback failed");
                }
                self.bridge.emit(OutboundEvent::TrackChanged {
                    index: next,
                    last_index: prior as i64,
                });
            }
            None => {
                // End of queue, or no active track at all. Only a real
                // final-track completion reports queueEnded.
                if let Some(last) = self.queue.current_index() {
                    info!(track = last, "queue ended");
                    self.bridge.emit(OutboundEvent::QueueEnded {
                        track: last,
                        position: player_status.current_time,
                    });
                }
            }
        }
    }

    /// Command the engine onto the track under the cursor and start
    /// playback: replace source, apply rate, activate lock-screen
    /// metadata, play. Always resumes playing, even from paused.
    async fn play_current(&self, player: &Arc<dyn MediaPlayer>) -> Result<()> {
        let track = self.queue.current_track().ok_or_else(|| {
            Error::Playback(format!(
                "no track at index {:?} (queue length {})",
                self.queue.current_index(),
                self.queue.len()
            ))
        })?;
        player.replace_source(Some(&track.source));
        player.set_rate(self.rate);
        player.set_now_playing(true, Some(&track.now_playing()));
        player.play().await
    }
}

/// Cloneable handle to the coordinator task.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Command>,
    bridge: EventBridge,
    session: Arc<Session>,
}

impl CoordinatorHandle {
    /// Replace the queue with `request` and start playback.
    ///
    /// Load operations are strictly serialized in arrival order; this
    /// future resolves when this particular operation completes. Session
    /// setup and engine failures propagate; a prior load's failure does
    /// not affect this one.
    pub async fn load(&self, request: LoadRequest) -> Result<()> {
        self.command(|reply| Command::Load(request, reply)).await?
    }

    pub async fn pause(&self) -> Result<()> {
        self.command(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.command(Command::Resume).await?
    }

    /// Stop playback, detach the media source, and empty the queue.
    pub async fn stop(&self) -> Result<()> {
        self.command(Command::Stop).await
    }

    /// Jump to `index` and resume playing. Out-of-range indices are
    /// silently ignored.
    pub async fn skip_to(&self, index: usize) -> Result<()> {
        self.command(|reply| Command::SkipTo(index, reply)).await?
    }

    /// Set the process-wide playback rate; new tracks inherit it.
    pub async fn set_rate(&self, rate: f64) -> Result<()> {
        self.command(|reply| Command::SetRate(rate, reply)).await
    }

    /// Seek the current track to `position` seconds.
    pub async fn seek_to(&self, position: f64) -> Result<()> {
        self.command(|reply| Command::SeekTo(position, reply)).await?
    }

    /// Apply a parsed host message.
    pub async fn apply(&self, message: InboundMessage) -> Result<()> {
        match message {
            InboundMessage::Load(request) => self.load(request).await,
            InboundMessage::Pause => self.pause().await,
            InboundMessage::Resume => self.resume().await,
            InboundMessage::Stop => self.stop().await,
            InboundMessage::SkipTo { index } => self.skip_to(index).await,
            InboundMessage::SetRate { rate } => self.set_rate(rate).await,
            InboundMessage::SeekTo { position } => self.seek_to(position).await,
        }
    }

    /// Register an outbound event listener.
    ///
    /// Installs this subscription as the bridge's (sole) subscriber and
    /// starts forwarding raw engine status into the coordinator, lazily
    /// creating the engine instance if needed. A new registration
    /// replaces the previous subscriber on the bridge.
    pub fn register_listener(&self) -> EventSubscription {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.bridge.install(event_tx);

        let mut status_rx = self.session.player().subscribe_status();
        let tx = self.tx.clone();
        let forward = tokio::spawn(async move {
            loop {
                match status_rx.recv().await {
                    Ok(player_status) => {
                        if tx.send(Command::Status(player_status)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "status stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        EventSubscription {
            events: event_rx,
            bridge: self.bridge.clone(),
            forward,
        }
    }

    async fn command<T, F>(&self, build: F) -> Result<T>
    where
        F: FnOnce(oneshot::Sender<T>) -> Command,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| Error::Channel("coordinator task stopped".into()))?;
        reply_rx
            .await
            .map_err(|_| Error::Channel("coordinator task dropped reply".into()))
    }
}

/// An active outbound event registration.
///
/// Receives every event emitted while this subscription is the bridge's
/// registered subscriber. Dropping it stops status forwarding;
/// [`EventSubscription::unsubscribe`] additionally clears the bridge so
/// later emissions are dropped.
pub struct EventSubscription {
    events: mpsc::UnboundedReceiver<OutboundEvent>,
    bridge: EventBridge,
    forward: JoinHandle<()>,
}

impl EventSubscription {
    /// Next outbound event, or `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<OutboundEvent> {
        self.events.recv().await
    }

    pub fn try_recv(&mut self) -> Option<OutboundEvent> {
        self.events.try_recv().ok()
    }

    /// Detach from the bridge and stop status forwarding.
    ///
    /// Clears the bridge's subscriber unconditionally, even if a newer
    /// registration replaced this one.
    pub fn unsubscribe(self) {
        self.bridge.clear();
        self.forward.abort();
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.forward.abort();
    }
}
