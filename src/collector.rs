use std::time::Duration;

use tokio::time::sleep;

use crate::channel::{HandoffSender, SendOutcome};
use crate::note::InputEvent;
use crate::transport::{MidiPoll, MidiTransport};

/// What a single collector step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectStep {
    Queued(InputEvent),
    Dropped(InputEvent),
    /// A message arrived but was not a note event. More may be waiting.
    Discarded,
    /// No data, or a transport error. The caller should back off.
    Idle,
    /// The source or the hand-off queue is gone.
    Finished,
}

/// Poll the transport once and forward whatever note event it yields.
pub async fn collect_once<M: MidiTransport>(midi: &mut M, tx: &HandoffSender) -> CollectStep {
    match midi.poll() {
        MidiPoll::Message(bytes) => {
            let Some(event) = InputEvent::decode(&bytes) else {
                log::trace!("Discarding MIDI message {:02X?}", bytes);
                return CollectStep::Discarded;
            };
            match tx.send(event).await {
                SendOutcome::Queued => CollectStep::Queued(event),
                SendOutcome::Dropped => CollectStep::Dropped(event),
                SendOutcome::Closed => CollectStep::Finished,
            }
        }
        MidiPoll::NoData => CollectStep::Idle,
        MidiPoll::Error(e) => {
            log::warn!("MIDI transport error: {}", e);
            CollectStep::Idle
        }
        MidiPoll::Closed => CollectStep::Finished,
    }
}

/// Feed the hand-off queue until the source closes or the renderer goes away.
///
/// Sleeps `idle_delay` after every poll that came back empty or failed, so a
/// quiet or failing transport never spins. Messages that are read but not
/// rendered do not sleep.
pub async fn run_collector<M: MidiTransport>(mut midi: M, tx: HandoffSender, idle_delay: Duration) {
    log::info!("Collector started, idle poll delay {:?}", idle_delay);
    loop {
        match collect_once(&mut midi, &tx).await {
            CollectStep::Queued(event) => {
                log::debug!("Queued {:?} (depth {})", event, tx.depth());
            }
            CollectStep::Dropped(_) | CollectStep::Discarded => {}
            CollectStep::Idle => sleep(idle_delay).await,
            CollectStep::Finished => break,
        }
    }
    log::info!("Collector stopped");
}
