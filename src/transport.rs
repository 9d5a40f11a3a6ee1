//! Capabilities the pipeline needs from the hardware around it.
//!
//! Both traits are synchronous: `poll` must not block, and the LED calls are
//! expected to return once the data is latched into the driver.

use thiserror::Error;

use crate::mapping::Rgb;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("MIDI read failed: {0}")]
    Read(String),

    #[error("pixel {index} is outside a strip of {len} LEDs")]
    PixelOutOfRange { index: usize, len: usize },

    #[error("LED write failed: {0}")]
    Write(String),

    #[error("LED refresh failed: {0}")]
    Commit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one non-blocking read from a MIDI source.
#[derive(Debug)]
pub enum MidiPoll {
    Message(Vec<u8>),
    NoData,
    Error(TransportError),
    /// The source has nothing more to give, ever.
    Closed,
}

pub trait MidiTransport {
    fn poll(&mut self) -> MidiPoll;
}

pub trait LedTransport {
    fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), TransportError>;

    /// Push the frame buffer out to the strip.
    fn refresh(&mut self) -> Result<(), TransportError>;
}

impl<T: MidiTransport + ?Sized> MidiTransport for Box<T> {
    fn poll(&mut self) -> MidiPoll {
        (**self).poll()
    }
}

impl<T: LedTransport + ?Sized> LedTransport for Box<T> {
    fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), TransportError> {
        (**self).set_pixel(index, color)
    }

    fn refresh(&mut self) -> Result<(), TransportError> {
        (**self).refresh()
    }
}
