//! Turns MIDI note events into light on an addressable LED strip.
//!
//! A collector task polls a [`MidiTransport`] and hands decoded
//! [`InputEvent`]s to a renderer task through a bounded queue; the renderer
//! maps each one to a [`PixelCommand`] and writes it to an [`LedTransport`].

pub mod channel;
pub mod collector;
pub mod config;
pub mod demo;
pub mod led;
pub mod mapping;
pub mod midi;
pub mod note;
pub mod renderer;
pub mod transport;

pub use channel::{handoff, Backpressure, HandoffReceiver, HandoffSender, SendOutcome};
pub use collector::{collect_once, run_collector, CollectStep};
pub use config::{BridgeConfig, ConfigError};
pub use mapping::{
    map_event, note_color, pixel_index, scale_brightness, NoteRange, PixelCommand, Rgb,
};
pub use note::{EventKind, InputEvent};
pub use renderer::{render_event, run_renderer};
pub use transport::{LedTransport, MidiPoll, MidiTransport, TransportError};
