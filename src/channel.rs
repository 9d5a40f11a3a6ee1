//! Bounded hand-off queue between the collector and the renderer.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc::{self, error::SendTimeoutError, error::TrySendError};

use crate::note::InputEvent;

/// What to do when the renderer falls behind and the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backpressure {
    /// Wait for space. With a timeout, the incoming event is dropped once it
    /// expires.
    #[default]
    Block,
    /// Never wait; the incoming event is dropped.
    DropNewest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Queued,
    Dropped,
    Closed,
}

#[derive(Debug, Clone)]
pub struct HandoffSender {
    tx: mpsc::Sender<InputEvent>,
    policy: Backpressure,
    timeout: Option<Duration>,
}

#[derive(Debug)]
pub struct HandoffReceiver {
    rx: mpsc::Receiver<InputEvent>,
}

/// Create a hand-off queue holding at most `capacity` events.
///
/// # Panics
/// If `capacity` is zero.
pub fn handoff(
    capacity: usize,
    policy: Backpressure,
    timeout: Option<Duration>,
) -> (HandoffSender, HandoffReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        HandoffSender {
            tx,
            policy,
            timeout,
        },
        HandoffReceiver { rx },
    )
}

impl HandoffSender {
    pub async fn send(&self, event: InputEvent) -> SendOutcome {
        match (self.policy, self.timeout) {
            (Backpressure::Block, None) => match self.tx.send(event).await {
                Ok(()) => SendOutcome::Queued,
                Err(_) => SendOutcome::Closed,
            },
            (Backpressure::Block, Some(timeout)) => {
                match self.tx.send_timeout(event, timeout).await {
                    Ok(()) => SendOutcome::Queued,
                    Err(SendTimeoutError::Timeout(event)) => {
                        log::warn!(
                            "Hand-off queue still full after {:?}, dropping {:?}",
                            timeout,
                            event
                        );
                        SendOutcome::Dropped
                    }
                    Err(SendTimeoutError::Closed(_)) => SendOutcome::Closed,
                }
            }
            (Backpressure::DropNewest, _) => match self.tx.try_send(event) {
                Ok(()) => SendOutcome::Queued,
                Err(TrySendError::Full(event)) => {
                    log::warn!("Hand-off queue full, dropping {:?}", event);
                    SendOutcome::Dropped
                }
                Err(TrySendError::Closed(_)) => SendOutcome::Closed,
            },
        }
    }

    /// Events currently waiting for the renderer.
    pub fn depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl HandoffReceiver {
    /// Wait for the next event. `None` once every sender is gone and the
    /// queue has drained.
    pub async fn receive(&mut self) -> Option<InputEvent> {
        self.rx.recv().await
    }
}
