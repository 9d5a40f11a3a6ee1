use std::fs;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::channel::Backpressure;
use crate::mapping::NoteRange;
use crate::note::MIDI_DATA_MAX;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything fixed at start-up. Any field left out of the JSON file keeps
/// its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub strip_length: usize,
    pub low_note: u8,
    pub high_note: u8,
    pub channel_capacity: usize,
    pub idle_poll_delay_ms: u64,
    pub backpressure: Backpressure,
    pub send_timeout_ms: Option<u64>,
    /// Substring of the MIDI input port name to connect to.
    pub midi_port: String,
    /// Messages buffered between the MIDI driver thread and the collector.
    pub midi_buffer: usize,
    pub udp_bind: Option<SocketAddr>,
    pub led_pin: i32,
    pub led_brightness: u8,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            strip_length: 60,
            low_note: 21,
            high_note: 108,
            channel_capacity: 10,
            idle_poll_delay_ms: 10,
            backpressure: Backpressure::Block,
            send_timeout_ms: None,
            midi_port: "Digital Piano".to_string(),
            midi_buffer: 64,
            udp_bind: None,
            led_pin: 18,
            led_brightness: 255,
        }
    }
}

impl BridgeConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load and validate `path`. A missing file means defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let config = match fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content).map_err(|source| ConfigError::Parse {
                path: display,
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", display);
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: display,
                    source,
                })
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strip_length == 0 {
            return Err(ConfigError::Invalid("strip_length must be at least 1".into()));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel_capacity must be at least 1".into(),
            ));
        }
        if self.midi_buffer == 0 {
            return Err(ConfigError::Invalid("midi_buffer must be at least 1".into()));
        }
        if self.low_note >= self.high_note || self.high_note > MIDI_DATA_MAX {
            return Err(ConfigError::Invalid(format!(
                "note range {}..={} must be increasing and within 0..=127",
                self.low_note, self.high_note
            )));
        }
        Ok(())
    }

    pub fn note_range(&self) -> NoteRange {
        NoteRange {
            low_note: self.low_note,
            high_note: self.high_note,
            strip_length: self.strip_length,
        }
    }

    pub fn idle_poll_delay(&self) -> Duration {
        Duration::from_millis(self.idle_poll_delay_ms)
    }

    pub fn send_timeout(&self) -> Option<Duration> {
        self.send_timeout_ms.map(Duration::from_millis)
    }
}
