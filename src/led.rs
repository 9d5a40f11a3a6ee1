use crate::mapping::Rgb;
use crate::transport::{LedTransport, TransportError};

/// In-memory strip. Stands in for the hardware on dry runs and in tests.
#[derive(Debug, Clone)]
pub struct FrameBufferStrip {
    pixels: Vec<Rgb>,
    commits: usize,
}

impl FrameBufferStrip {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![Rgb::OFF; len],
            commits: 0,
        }
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn lit(&self) -> usize {
        self.pixels.iter().filter(|p| **p != Rgb::OFF).count()
    }
}

impl LedTransport for FrameBufferStrip {
    fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), TransportError> {
        let len = self.pixels.len();
        let pixel = self
            .pixels
            .get_mut(index)
            .ok_or(TransportError::PixelOutOfRange { index, len })?;
        *pixel = color;
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), TransportError> {
        self.commits += 1;
        log::debug!("Frame {}: {} LEDs lit", self.commits, self.lit());
        Ok(())
    }
}

#[cfg(feature = "ws281x")]
pub use hardware::Ws281xStrip;

#[cfg(feature = "ws281x")]
mod hardware {
    use super::*;

    /// The controller wants raw `[b, g, r, w]` words.
    fn raw_color(color: Rgb) -> [u8; 4] {
        [color.b, color.g, color.r, 0]
    }

    /// A WS2812 strip on one PWM channel of a Raspberry Pi.
    pub struct Ws281xStrip {
        controller: rs_ws281x::Controller,
    }

    impl Ws281xStrip {
        pub fn new(pin: i32, len: usize, brightness: u8) -> Result<Self, TransportError> {
            let channel = rs_ws281x::ChannelBuilder::new()
                .pin(pin)
                .count(len as i32)
                .brightness(brightness)
                .strip_type(rs_ws281x::StripType::Ws2812)
                .build();

            let controller = rs_ws281x::ControllerBuilder::new()
                .dma(10)
                .channel(0, channel)
                .build()
                .map_err(|e| TransportError::Write(format!("{:?}", e)))?;

            log::info!("Created ws281x strip of {} LEDs on GPIO {}", len, pin);
            Ok(Self { controller })
        }
    }

    impl LedTransport for Ws281xStrip {
        fn set_pixel(&mut self, index: usize, color: Rgb) -> Result<(), TransportError> {
            let leds = self.controller.leds_mut(0);
            let len = leds.len();
            let led = leds
                .get_mut(index)
                .ok_or(TransportError::PixelOutOfRange { index, len })?;
            *led = raw_color(color);
            Ok(())
        }

        fn refresh(&mut self) -> Result<(), TransportError> {
            self.controller
                .render()
                .map_err(|e| TransportError::Commit(format!("{:?}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_is_fixed_length() {
        let mut strip = FrameBufferStrip::new(3);
        strip.set_pixel(2, Rgb::new(1, 2, 3)).unwrap();
        assert!(matches!(
            strip.set_pixel(3, Rgb::new(1, 2, 3)),
            Err(TransportError::PixelOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(strip.pixels().len(), 3);
        assert_eq!(strip.lit(), 1);
    }

    #[test]
    fn counts_commits() {
        let mut strip = FrameBufferStrip::new(1);
        strip.refresh().unwrap();
        strip.refresh().unwrap();
        assert_eq!(strip.commits(), 2);
    }
}
