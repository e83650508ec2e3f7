//! Audio session lifecycle
//!
//! Owns the one-time audio session configuration and the single media
//! engine instance. The session lives for the process lifetime; there is
//! no teardown path.

use std::sync::{Arc, OnceLock};

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::engine::{AudioSessionMode, MediaPlayer, SessionModeConfigurator};
use crate::error::Result;

/// Constructor for the single media engine instance.
pub type PlayerFactory = Box<dyn Fn() -> Arc<dyn MediaPlayer> + Send + Sync>;

/// Process-wide playback session.
///
/// `setup()` is memoized: concurrent callers before the first completion
/// all await the same in-flight configuration, and a successful run is
/// never repeated. A failed run leaves the session unconfigured so a
/// later call retries (the configurator must tolerate being invoked
/// again after an incomplete attempt).
pub struct Session {
    configurator: Arc<dyn SessionModeConfigurator>,
    factory: PlayerFactory,
    mode: AudioSessionMode,
    configured: OnceCell<()>,
    player: OnceLock<Arc<dyn MediaPlayer>>,
}

impl Session {
    /// Create a session with the default mode (background playback on,
    /// silent-switch playback on, exclusive interruption policy).
    pub fn new(configurator: Arc<dyn SessionModeConfigurator>, factory: PlayerFactory) -> Self {
        Self::with_mode(configurator, factory, AudioSessionMode::default())
    }

    pub fn with_mode(
        configurator: Arc<dyn SessionModeConfigurator>,
        factory: PlayerFactory,
        mode: AudioSessionMode,
    ) -> Self {
        Self {
            configurator,
            factory,
            mode,
            configured: OnceCell::new(),
            player: OnceLock::new(),
        }
    }

    /// Configure the audio session and ensure the engine exists, once.
    ///
    /// Configuration failures propagate to whichever caller is awaiting
    /// the in-flight attempt; they are not cached.
    pub async fn setup(&self) -> Result<()> {
        self.configured
            .get_or_try_init(|| async {
                info!(mode = ?self.mode, "configuring audio session");
                self.configurator.configure(&self.mode).await?;
                self.player();
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// The media engine instance, constructed lazily on first use.
    ///
    /// Creation does not require a configured session; subscribing to
    /// engine status before the first load is allowed.
    pub fn player(&self) -> Arc<dyn MediaPlayer> {
        self.player
            .get_or_init(|| {
                debug!("creating media engine instance");
                (self.factory)()
            })
            .clone()
    }

    /// The engine instance if one has been created, without creating it.
    pub fn try_player(&self) -> Option<Arc<dyn MediaPlayer>> {
        self.player.get().cloned()
    }

    /// Whether the one-time configuration has completed successfully.
    pub fn is_configured(&self) -> bool {
        self.configured.initialized()
    }
}
