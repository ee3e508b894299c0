use std::sync::Arc;

pub mod registry;
pub use registry::{ActiveChanged, Registry};

pub mod track;
pub use track::Track;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("DBus error: {}", .0)]
    Dbus(#[from] mpris::DBusError),

    #[error("Error finding MPRIS player: {}", .0)]
    Finding(#[from] mpris::FindingError),

    #[error("Unknown player {}", .0)]
    Unknown(Arc<str>),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No player, or a player which didn't report its status yet.
    #[default]
    Unknown,
    Playing,
    Paused,
    Stopped,
}

impl PlaybackStatus {
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl From<mpris::PlaybackStatus> for PlaybackStatus {
    fn from(status: mpris::PlaybackStatus) -> Self {
        use mpris::PlaybackStatus::*;

        match status {
            Playing => Self::Playing,
            Paused => Self::Paused,
            Stopped => Self::Stopped,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    pub status: PlaybackStatus,
    pub track: Track,
}

impl Properties {
    pub fn new(status: PlaybackStatus, track: Track) -> Self {
        Self { status, track }
    }
}

/// A playback service, e.g. a media player.
pub trait Backend {
    /// Human readable name of the player.
    fn identity(&self) -> &str;

    fn fetch_properties(&mut self) -> Result<Properties, Error>;

    fn play(&mut self) -> Result<(), Error>;
    fn stop(&mut self) -> Result<(), Error>;
    fn play_pause(&mut self) -> Result<(), Error>;
    fn previous(&mut self) -> Result<(), Error>;
    fn next(&mut self) -> Result<(), Error>;

    /// Starts reporting property changes tagged with `owner`.
    fn watch(&mut self, owner: Arc<str>);

    /// Stops reporting property changes.
    fn unwatch(&mut self);
}

/// Builds [`Backend`]s for services as they show up on the bus.
pub trait Connector {
    type Backend: Backend;

    fn connect(&mut self, name: &str, owner: &str) -> Result<Self::Backend, Error>;
}
