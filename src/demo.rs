//! Built-in note sequences for checking a strip without a keyboard attached.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::note::InputEvent;
use crate::transport::{MidiPoll, MidiTransport};

/// Silence between releasing one note and striking the next.
const NOTE_GAP: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub note: u8,
    pub velocity: u8,
    pub hold: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Sequence {
    Flourish,
    FurElise,
}

impl Sequence {
    pub fn steps(self) -> Vec<Step> {
        match self {
            Sequence::Flourish => flourish(),
            Sequence::FurElise => fur_elise(),
        }
    }
}

/// A sweep across the whole keyboard, A0 to C8, speeding up as it climbs.
pub fn flourish() -> Vec<Step> {
    (21..=108)
        .map(|note: u8| {
            let hold_us = 60_000u64.saturating_sub(u64::from(note) * 500).max(20_000);
            Step {
                note,
                velocity: 64,
                hold: Duration::from_micros(hold_us),
            }
        })
        .collect()
}

/// The opening bars of Für Elise.
pub fn fur_elise() -> Vec<Step> {
    const SHORT: u64 = 400;
    const LONG: u64 = 2000;
    [
        (76, SHORT),
        (75, SHORT),
        (76, SHORT),
        (75, SHORT),
        (76, SHORT),
        (71, SHORT),
        (74, SHORT),
        (72, SHORT),
        (69, LONG),
        (60, SHORT),
        (64, SHORT),
        (69, SHORT),
        (71, LONG),
        (64, SHORT),
        (68, SHORT),
        (71, SHORT),
        (72, LONG),
    ]
    .into_iter()
    .map(|(note, ms)| Step {
        note,
        velocity: 64,
        hold: Duration::from_millis(ms),
    })
    .collect()
}

/// Plays a list of steps as note on / note off messages in real time, then
/// reports [`MidiPoll::Closed`].
pub struct ScriptedTransport {
    pending: VecDeque<(Duration, [u8; 3])>,
    started: Option<Instant>,
}

impl ScriptedTransport {
    pub fn new(steps: &[Step]) -> Self {
        let mut pending = VecDeque::with_capacity(steps.len() * 2);
        let mut at = Duration::ZERO;
        for step in steps {
            let (Some(on), Some(off)) = (
                InputEvent::note_on(step.note, step.velocity),
                InputEvent::note_off(step.note),
            ) else {
                log::warn!("Skipping invalid demo step {:?}", step);
                continue;
            };
            pending.push_back((at, on.to_bytes()));
            at += step.hold;
            pending.push_back((at, off.to_bytes()));
            at += NOTE_GAP;
        }
        Self {
            pending,
            started: None,
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl MidiTransport for ScriptedTransport {
    fn poll(&mut self) -> MidiPoll {
        let started = *self.started.get_or_insert_with(Instant::now);
        match self.pending.front() {
            None => MidiPoll::Closed,
            Some((at, _)) if started.elapsed() < *at => MidiPoll::NoData,
            Some(_) => match self.pending.pop_front() {
                Some((_, bytes)) => MidiPoll::Message(bytes.to_vec()),
                None => MidiPoll::Closed,
            },
        }
    }
}
