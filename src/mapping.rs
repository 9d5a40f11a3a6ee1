use crate::note::{InputEvent, MIDI_DATA_MAX};

/// Width of one chromatic step in the red channel, and one octave in blue.
const CHANNEL_STEP: u8 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// What the renderer writes for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCommand {
    pub index: usize,
    pub color: Rgb,
}

/// The playable note range and the strip it is spread across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRange {
    pub low_note: u8,
    pub high_note: u8,
    pub strip_length: usize,
}

impl Default for NoteRange {
    /// A0..=C8 on a 60 pixel strip.
    fn default() -> Self {
        Self {
            low_note: 21,
            high_note: 108,
            strip_length: 60,
        }
    }
}

/// Base color of a note before velocity is applied.
///
/// Red walks the chromatic cycle, green is its complement and blue climbs
/// with the octave. Notes above 127 take the color of 127.
pub fn note_color(note: u8) -> Rgb {
    let note = note.min(MIDI_DATA_MAX);
    let r = (note % 12) * CHANNEL_STEP;
    Rgb {
        r,
        g: 255 - r,
        b: (note / 12) * CHANNEL_STEP,
    }
}

/// Scale every channel linearly by `velocity / 127`.
pub fn scale_brightness(color: Rgb, velocity: u8) -> Rgb {
    let velocity = u16::from(velocity.min(MIDI_DATA_MAX));
    let scale = |c: u8| (u16::from(c) * velocity / u16::from(MIDI_DATA_MAX)) as u8;
    Rgb {
        r: scale(color.r),
        g: scale(color.g),
        b: scale(color.b),
    }
}

/// Spread `[low_note, high_note]` linearly over the strip.
///
/// Notes outside the range are clamped onto the first or last pixel, and
/// `high_note` itself lands on the last pixel.
pub fn pixel_index(note: u8, range: &NoteRange) -> usize {
    if range.strip_length == 0 {
        return 0;
    }
    let span = (i64::from(range.high_note) - i64::from(range.low_note)).max(1);
    let offset = i64::from(note) - i64::from(range.low_note);
    let last = range.strip_length as i64 - 1;
    (offset * range.strip_length as i64 / span).clamp(0, last) as usize
}

pub fn map_event(event: &InputEvent, range: &NoteRange) -> PixelCommand {
    let index = pixel_index(event.note(), range);
    let color = if event.is_release() {
        Rgb::OFF
    } else {
        scale_brightness(note_color(event.note()), event.velocity())
    };
    PixelCommand { index, color }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(note: u8, velocity: u8) -> InputEvent {
        InputEvent::note_on(note, velocity).unwrap()
    }

    #[test]
    fn middle_c() {
        let range = NoteRange::default();
        assert_eq!(note_color(60), Rgb::new(0, 255, 105));
        assert_eq!(pixel_index(60, &range), 26);

        let cmd = map_event(&on(60, 100), &range);
        assert_eq!(cmd.index, 26);
        // 255 * 100 / 127, 105 * 100 / 127
        assert_eq!(cmd.color, Rgb::new(0, 200, 82));
    }

    #[test]
    fn range_boundaries() {
        let range = NoteRange::default();
        assert_eq!(map_event(&on(21, 1), &range).index, 0);
        assert_eq!(map_event(&on(108, 127), &range).index, 59);
    }

    #[test]
    fn out_of_range_notes_are_clamped() {
        let range = NoteRange::default();
        assert_eq!(pixel_index(0, &range), 0);
        assert_eq!(pixel_index(20, &range), 0);
        assert_eq!(pixel_index(109, &range), 59);
        assert_eq!(pixel_index(127, &range), 59);
    }

    #[test]
    fn every_playable_note_lands_on_the_strip() {
        for strip_length in [1, 7, 60, 88, 144, 300] {
            let range = NoteRange {
                strip_length,
                ..NoteRange::default()
            };
            for note in 0..=127 {
                assert!(pixel_index(note, &range) < strip_length);
            }
        }
    }

    #[test]
    fn note_color_is_total() {
        assert_eq!(note_color(127), Rgb::new(147, 108, 210));
        for note in 128..=255 {
            assert_eq!(note_color(note), note_color(127));
        }
    }

    #[test]
    fn full_velocity_keeps_base_color() {
        for note in 0..=127 {
            assert_eq!(scale_brightness(note_color(note), 127), note_color(note));
        }
    }

    #[test]
    fn release_forms_agree() {
        let range = NoteRange::default();
        for note in 0..=127 {
            let off = map_event(&InputEvent::note_off(note).unwrap(), &range);
            let silent_on = map_event(&on(note, 0), &range);
            assert_eq!(off, silent_on);
            assert_eq!(off.color, Rgb::OFF);
        }
    }

    #[test]
    fn mapping_is_deterministic() {
        let range = NoteRange::default();
        for note in (0..=127).step_by(7) {
            for velocity in (0..=127).step_by(9) {
                let event = on(note, velocity);
                assert_eq!(map_event(&event, &range), map_event(&event, &range));
            }
        }
    }

    #[test]
    fn degenerate_ranges_do_not_panic() {
        let range = NoteRange {
            low_note: 60,
            high_note: 60,
            strip_length: 10,
        };
        assert_eq!(pixel_index(60, &range), 0);
        assert_eq!(pixel_index(61, &range), 9);

        let empty = NoteRange {
            strip_length: 0,
            ..NoteRange::default()
        };
        assert_eq!(pixel_index(60, &empty), 0);
    }
}
