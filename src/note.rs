/// Highest valid MIDI data byte (note number or velocity).
pub const MIDI_DATA_MAX: u8 = 127;

const STATUS_NOTE_OFF: u8 = 0x80;
const STATUS_NOTE_ON: u8 = 0x90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NoteOn,
    NoteOff,
}

/// One performance event travelling from the collector to the renderer.
///
/// Fields are private so every event in the pipeline has passed the
/// `0..=127` range check on both data bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEvent {
    kind: EventKind,
    note: u8,
    velocity: u8,
}

impl InputEvent {
    /// Returns `None` when `note` or `velocity` is outside `0..=127`.
    pub fn new(kind: EventKind, note: u8, velocity: u8) -> Option<Self> {
        if note > MIDI_DATA_MAX || velocity > MIDI_DATA_MAX {
            return None;
        }
        Some(Self {
            kind,
            note,
            velocity,
        })
    }

    pub fn note_on(note: u8, velocity: u8) -> Option<Self> {
        Self::new(EventKind::NoteOn, note, velocity)
    }

    pub fn note_off(note: u8) -> Option<Self> {
        Self::new(EventKind::NoteOff, note, 0)
    }

    /// Decode a raw `(status, note, velocity)` channel message.
    ///
    /// Messages shorter than three bytes, statuses other than note on/off and
    /// data bytes with the high bit set all yield `None`. The channel nibble
    /// is ignored.
    pub fn decode(message: &[u8]) -> Option<Self> {
        let [status, note, velocity, ..] = *message else {
            return None;
        };
        let kind = match status & 0xF0 {
            STATUS_NOTE_ON => EventKind::NoteOn,
            STATUS_NOTE_OFF => EventKind::NoteOff,
            _ => return None,
        };
        Self::new(kind, note, velocity)
    }

    /// Encode back to the three byte wire form on channel 1.
    pub fn to_bytes(&self) -> [u8; 3] {
        let status = match self.kind {
            EventKind::NoteOn => STATUS_NOTE_ON,
            EventKind::NoteOff => STATUS_NOTE_OFF,
        };
        [status, self.note, self.velocity]
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// NoteOff, or NoteOn with velocity 0 (running-status style release).
    pub fn is_release(&self) -> bool {
        self.kind == EventKind::NoteOff || self.velocity == 0
    }
}

/// Convert MIDI note number to a name like "C4", for log output.
pub fn note_name(note: u8) -> String {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    let octave = (note / 12) as i32 - 1;
    format!("{}{}", NAMES[(note % 12) as usize], octave)
}
