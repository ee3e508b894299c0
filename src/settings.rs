use once_cell::sync::Lazy;
use std::{collections::HashMap, path::Path, time::Duration};

use crate::{display::Color, ticker};

const ENV_PREFIX: &str = "SURFACE_BRIDGE";

static DEFAULT_PLAYER_COLORS: Lazy<HashMap<String, Color>> = Lazy::new(|| {
    [
        ("spotify", Color::Green),
        ("chrome", Color::Yellow),
        ("rhythmbox", Color::Cyan),
    ]
    .into_iter()
    .map(|(name, color)| (name.to_string(), color))
    .collect()
});

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {}", .0)]
    Config(#[from] config::ConfigError),

    #[error("Invalid settings: {}", .0)]
    Invalid(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// MIDI client name, also used to skip our own ports.
    pub client_name: String,
    /// Prefix of the surface's MIDI ports.
    pub port_prefix: String,
    pub tick_interval_ms: u64,
    pub player_poll_interval_ms: u64,
    pub volume_poll_interval_ms: u64,
    /// LCD color by lowercase player name.
    pub player_colors: HashMap<String, Color>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            client_name: env!("CARGO_PKG_NAME").to_string(),
            port_prefix: "X-Touch One".to_string(),
            tick_interval_ms: ticker::DEFAULT_INTERVAL.as_millis() as u64,
            player_poll_interval_ms: 1000,
            volume_poll_interval_ms: 200,
            player_colors: HashMap::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads the settings from the optional `path` and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        Self::from_builder(builder)
    }

    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, Error> {
        let mut settings: Settings = builder.build()?.try_deserialize()?;

        settings.player_colors = settings
            .player_colors
            .drain()
            .map(|(name, color)| (name.to_lowercase(), color))
            .collect();

        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.port_prefix.is_empty() {
            return Err(Error::Invalid("port prefix is empty"));
        }

        if self.tick_interval_ms == 0 {
            return Err(Error::Invalid("tick interval is null"));
        }

        if self.player_poll_interval_ms == 0 {
            return Err(Error::Invalid("player poll interval is null"));
        }

        if self.volume_poll_interval_ms == 0 {
            return Err(Error::Invalid("volume poll interval is null"));
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn player_poll_interval(&self) -> Duration {
        Duration::from_millis(self.player_poll_interval_ms)
    }

    pub fn volume_poll_interval(&self) -> Duration {
        Duration::from_millis(self.volume_poll_interval_ms)
    }

    /// Default player colors overridden by the configured ones.
    pub fn player_colors(&self) -> HashMap<String, Color> {
        let mut colors = DEFAULT_PLAYER_COLORS.clone();
        colors.extend(
            self.player_colors
                .iter()
                .map(|(name, color)| (name.clone(), *color)),
        );

        colors
    }
}
