// parking_core/src/channel.rs

//! Point-to-point message link between the vehicle and the map provider.
//!
//! Each direction is a bounded, ordered queue of JSON strings. Sending never
//! blocks: a full queue is reported as [`ChannelError::Full`]. Receiving drains
//! whatever is queued without waiting; undecodable packets are logged and
//! dropped.

use crate::error::ChannelError;
use crate::messages::Message;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use tracing::warn;

/// One side of a link created by [`link`].
#[derive(Debug)]
pub struct Endpoint {
    label: String,
    outgoing: Sender<String>,
    incoming: Receiver<String>,
}

/// Creates a connected pair of endpoints. `capacity` bounds each direction
/// and is raised to 1 if zero.
pub fn link(
    capacity: usize,
    first: impl Into<String>,
    second: impl Into<String>,
) -> (Endpoint, Endpoint) {
    let capacity = capacity.max(1);
    let (to_second, from_first) = bounded(capacity);
    let (to_first, from_second) = bounded(capacity);
    (
        Endpoint {
            label: first.into(),
            outgoing: to_second,
            incoming: from_second,
        },
        Endpoint {
            label: second.into(),
            outgoing: to_first,
            incoming: from_first,
        },
    )
}

impl Endpoint {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Serializes and queues a message for the peer.
    pub fn send(&self, message: &Message) -> Result<(), ChannelError> {
        let packet = message.encode()?;
        self.send_packet(packet)
    }

    fn send_packet(&self, packet: String) -> Result<(), ChannelError> {
        self.outgoing.try_send(packet).map_err(|e| match e {
            TrySendError::Full(_) => ChannelError::Full,
            TrySendError::Disconnected(_) => ChannelError::Disconnected,
        })
    }

    /// Pops every queued packet, in arrival order, and decodes it.
    pub fn drain(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.incoming.len());
        loop {
            match self.incoming.try_recv() {
                Ok(packet) => match Message::decode(&packet) {
                    Ok(message) => messages.push(message),
                    Err(e) => {
                        warn!(endpoint = %self.label, "dropping inbound packet: {}", e);
                    }
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        messages
    }

    /// Number of packets waiting to be drained.
    pub fn pending(&self) -> usize {
        self.incoming.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_arrive_in_order() {
        let (vehicle, provider) = link(8, "vehicle", "provider");
        vehicle.send(&Message::AckSpotMap { count: 2 }).unwrap();
        vehicle.send(&Message::NoFreeSpots).unwrap();
        vehicle.send(&Message::ScanComplete).unwrap();

        assert_eq!(provider.pending(), 3);
        assert_eq!(
            provider.drain(),
            vec![
                Message::AckSpotMap { count: 2 },
                Message::NoFreeSpots,
                Message::ScanComplete
            ]
        );
        assert_eq!(provider.pending(), 0);
        assert!(vehicle.drain().is_empty());
    }

    #[test]
    fn malformed_packets_are_dropped_without_losing_neighbours() {
        let (vehicle, provider) = link(8, "vehicle", "provider");
        provider.send(&Message::ScanComplete).unwrap();
        provider.send_packet("{\"type\": 42".to_string()).unwrap();
        provider.send_packet(r#"{"type":"WHAT"}"#.to_string()).unwrap();
        provider.send(&Message::NoFreeSpots).unwrap();

        assert_eq!(
            vehicle.drain(),
            vec![Message::ScanComplete, Message::NoFreeSpots]
        );
    }

    #[test]
    fn full_queue_is_reported_instead_of_blocking() {
        let (vehicle, _provider) = link(1, "vehicle", "provider");
        vehicle.send(&Message::ScanComplete).unwrap();
        assert!(matches!(
            vehicle.send(&Message::ScanComplete),
            Err(ChannelError::Full)
        ));
    }

    #[test]
    fn dropped_peer_is_reported() {
        let (vehicle, provider) = link(4, "vehicle", "provider");
        drop(provider);
        assert!(matches!(
            vehicle.send(&Message::NoFreeSpots),
            Err(ChannelError::Disconnected)
        ));
        assert!(vehicle.drain().is_empty());
    }
}
