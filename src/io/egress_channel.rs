//! Typed channel for outbound transition events
//!
//! Provides a non-blocking way to hand events to the MQTT publisher.
//! Uses a bounded mpsc channel to prevent unbounded memory growth; a
//! full or closed channel drops the event with a warning (the agent
//! keeps no durable outbox).

use crate::domain::TransitionEvent;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Sender handle for transition events
///
/// Clone this to share across producers. Non-blocking: publishing never
/// stalls the polling loop.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<TransitionEvent>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<TransitionEvent>) -> Self {
        Self { tx }
    }

    /// Hand a transition to the publisher. Failures are logged, never
    /// propagated; the next transition will attempt publication again.
    pub fn send_transition(&self, event: TransitionEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(event = %event.kind.event_kind(), "publish_dropped: channel full");
            }
            Err(TrySendError::Closed(event)) => {
                warn!(event = %event.kind.event_kind(), "publish_dropped: channel closed");
            }
        }
    }
}

/// Create a new event channel pair
///
/// Returns (sender, receiver) where the sender can be cloned and shared.
pub fn create_event_channel(
    buffer_size: usize,
) -> (EventSender, mpsc::Receiver<TransitionEvent>) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (EventSender::new(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviceId, DoorState};

    #[tokio::test]
    async fn test_send_and_receive() {
        let (sender, mut rx) = create_event_channel(8);
        sender.send_transition(TransitionEvent::new(DeviceId(1), DoorState::Open, Some(true)));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, DoorState::Open);
        assert_eq!(event.armed, Some(true));
    }

    #[tokio::test]
    async fn test_full_channel_drops_without_panic() {
        let (sender, _rx) = create_event_channel(1);
        sender.send_transition(TransitionEvent::new(DeviceId(1), DoorState::Open, None));
        // Second send hits a full channel and is dropped
        sender.send_transition(TransitionEvent::new(DeviceId(1), DoorState::Closed, None));
    }

    #[tokio::test]
    async fn test_closed_channel_drops_without_panic() {
        let (sender, rx) = create_event_channel(1);
        drop(rx);
        sender.send_transition(TransitionEvent::new(DeviceId(1), DoorState::Open, None));
    }
}
