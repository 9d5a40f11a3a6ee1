//! MIDI sources: a USB/ALSA device through midir, or the plain-text UDP feed.

use std::io::ErrorKind;
use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

use crate::note::InputEvent;
use crate::transport::{MidiPoll, MidiTransport, TransportError};

/// Parse one UDP datagram of the form `"55 125;"` (note, velocity).
///
/// Velocity 0 becomes a note off.
pub fn parse_udp_message(msg: &str) -> Option<InputEvent> {
    let parts: Vec<&str> = msg
        .trim()
        .trim_end_matches(';')
        .split_whitespace()
        .collect();
    let [note, velocity] = parts[..] else {
        return None;
    };
    let note = note.parse::<u8>().ok()?;
    let velocity = velocity.parse::<u8>().ok()?;
    if velocity == 0 {
        InputEvent::note_off(note)
    } else {
        InputEvent::note_on(note, velocity)
    }
}

/// Create the bounded buffer between a driver callback and the collector.
///
/// # Panics
/// If `capacity` is zero.
pub fn device_queue(capacity: usize) -> (DeviceFeed, DeviceQueue) {
    let (tx, rx) = mpsc::channel(capacity);
    (DeviceFeed { tx }, DeviceQueue { rx })
}

/// Callback side of a [`device_queue`]. Never blocks: a full buffer drops
/// the incoming message.
#[derive(Debug, Clone)]
pub struct DeviceFeed {
    tx: mpsc::Sender<Vec<u8>>,
}

impl DeviceFeed {
    /// Returns whether the message was buffered.
    pub fn push(&self, message: &[u8]) -> bool {
        match self.tx.try_send(message.to_vec()) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                log::warn!("MIDI input buffer full, dropping {:02X?}", message);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Collector side of a [`device_queue`].
#[derive(Debug)]
pub struct DeviceQueue {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl MidiTransport for DeviceQueue {
    fn poll(&mut self) -> MidiPoll {
        match self.rx.try_recv() {
            Ok(message) => MidiPoll::Message(message),
            Err(TryRecvError::Empty) => MidiPoll::NoData,
            Err(TryRecvError::Disconnected) => MidiPoll::Closed,
        }
    }
}

pub struct UdpTransport {
    socket: UdpSocket,
    buf: [u8; 64],
}

impl UdpTransport {
    pub async fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).await?;
        log::info!("Listening for UDP note messages on {}", socket.local_addr()?);
        Ok(Self {
            socket,
            buf: [0u8; 64],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

impl MidiTransport for UdpTransport {
    fn poll(&mut self) -> MidiPoll {
        match self.socket.try_recv_from(&mut self.buf) {
            Ok((len, addr)) => {
                let text = String::from_utf8_lossy(&self.buf[..len]);
                match parse_udp_message(&text) {
                    Some(event) => MidiPoll::Message(event.to_bytes().to_vec()),
                    None => {
                        log::debug!("Ignoring UDP message {:?} from {}", text, addr);
                        MidiPoll::NoData
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => MidiPoll::NoData,
            Err(e) => MidiPoll::Error(e.into()),
        }
    }
}

#[cfg(feature = "midi-input")]
pub use device::MidirTransport;

#[cfg(feature = "midi-input")]
mod device {
    use midir::{Ignore, MidiInput, MidiInputConnection};

    use super::*;

    /// The first MIDI input port whose name contains a given string.
    ///
    /// Messages wait in a buffer of `buffer` entries between the driver
    /// thread and the collector; overflow is dropped, never queued.
    pub struct MidirTransport {
        _conn: MidiInputConnection<()>,
        messages: DeviceQueue,
    }

    impl MidirTransport {
        pub fn connect(port_match: &str, buffer: usize) -> Result<Self, TransportError> {
            let mut midi_in = MidiInput::new("piano-led-bridge")
                .map_err(|e| TransportError::Read(e.to_string()))?;
            // SysEx and clock are never rendered.
            midi_in.ignore(Ignore::SysexAndTime);

            let ports = midi_in.ports();
            let port = ports
                .iter()
                .find(|p| {
                    midi_in
                        .port_name(p)
                        .map(|name| name.contains(port_match))
                        .unwrap_or(false)
                })
                .ok_or_else(|| {
                    TransportError::Read(format!("no MIDI port matching '{}'", port_match))
                })?;

            let port_name = midi_in
                .port_name(port)
                .unwrap_or_else(|_| "<unknown>".to_string());
            log::info!("Connecting to MIDI device: {}", port_name);

            let (feed, messages) = device_queue(buffer);
            let conn = midi_in
                .connect(
                    port,
                    "piano-led-bridge-read",
                    move |_, message, _| {
                        feed.push(message);
                    },
                    (),
                )
                .map_err(|e| TransportError::Read(format!("connect {}: {}", port_name, e)))?;

            Ok(Self {
                _conn: conn,
                messages,
            })
        }
    }

    impl MidiTransport for MidirTransport {
        fn poll(&mut self) -> MidiPoll {
            self.messages.poll()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parses_note_messages() {
        assert_eq!(parse_udp_message("55 125;"), InputEvent::note_on(55, 125));
        assert_eq!(parse_udp_message(" 60 0;\n"), InputEvent::note_off(60));
        assert_eq!(parse_udp_message("60 64"), InputEvent::note_on(60, 64));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_udp_message(""), None);
        assert_eq!(parse_udp_message("60;"), None);
        assert_eq!(parse_udp_message("60 64 1;"), None);
        assert_eq!(parse_udp_message("C4 64;"), None);
        assert_eq!(parse_udp_message("200 64;"), None);
        assert_eq!(parse_udp_message("364 100;"), None);
    }

    #[test]
    fn device_queue_is_bounded() {
        let (feed, mut queue) = device_queue(4);
        let accepted: Vec<bool> = (0..6u8).map(|n| feed.push(&[0x90, 60 + n, 100])).collect();
        assert_eq!(accepted, [true, true, true, true, false, false]);

        for n in 0..4u8 {
            assert!(matches!(queue.poll(), MidiPoll::Message(m) if m == [0x90, 60 + n, 100]));
        }
        assert!(matches!(queue.poll(), MidiPoll::NoData));

        // room again once drained
        assert!(feed.push(&[0x80, 60, 0]));
        assert!(matches!(queue.poll(), MidiPoll::Message(m) if m == [0x80, 60, 0]));
    }

    #[test]
    fn device_queue_closes_with_its_feed() {
        let (feed, mut queue) = device_queue(4);
        feed.push(&[0x90, 60, 100]);
        drop(feed);
        assert!(matches!(queue.poll(), MidiPoll::Message(_)));
        assert!(matches!(queue.poll(), MidiPoll::Closed));
        assert!(matches!(queue.poll(), MidiPoll::Closed));
    }

    #[tokio::test]
    async fn udp_transport_yields_midi_bytes() {
        let mut transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        assert!(matches!(transport.poll(), MidiPoll::NoData));

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = transport.local_addr().unwrap();
        sender.send_to(b"55 125;", target).await.unwrap();
        sender.send_to(b"hello", target).await.unwrap();
        sender.send_to(b"55 0;", target).await.unwrap();

        let mut polls = Vec::new();
        for _ in 0..200 {
            match transport.poll() {
                MidiPoll::Message(bytes) => polls.push(bytes),
                _ => tokio::time::sleep(Duration::from_millis(5)).await,
            }
            if polls.len() == 2 {
                break;
            }
        }
        assert_eq!(polls, vec![vec![0x90, 55, 125], vec![0x80, 55, 0]]);
    }
}
