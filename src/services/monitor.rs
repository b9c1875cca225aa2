//! Door monitoring loop - transition detection and event publication
//!
//! One tick: debounced sample, mirror the state on the indicator, detect
//! a logical transition against the previous tick, and hand exactly one
//! event per change to the egress channel. The indicator always tracks
//! the physical state regardless of the arm flag; the arm flag is only
//! snapshotted into outbound payloads.
//!
//! Two genuine transitions inside one poll interval coalesce into the
//! net observed state. That loss of granularity is a documented
//! limitation of level polling, not a bug.

use crate::domain::{DeviceId, DoorState, TransitionEvent};
use crate::infra::config::Config;
use crate::io::egress_channel::EventSender;
use crate::io::gpio::{DigitalInput, DigitalOutput};
use crate::services::arm_state::ArmState;
use crate::services::debounce::Debouncer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{info, trace, warn};

pub struct DoorMonitor<I: DigitalInput, O: DigitalOutput> {
    debouncer: Debouncer<I>,
    indicator: O,
    arm: Arc<ArmState>,
    events: EventSender,
    device_id: DeviceId,
    include_armed: bool,
    announce_baseline: bool,
    poll_interval: Duration,
    /// None until the first successful sample establishes a baseline
    state: Option<DoorState>,
}

impl<I: DigitalInput, O: DigitalOutput> DoorMonitor<I, O> {
    pub fn new(
        config: &Config,
        input: I,
        indicator: O,
        arm: Arc<ArmState>,
        events: EventSender,
    ) -> Self {
        let debouncer = Debouncer::new(
            input,
            Duration::from_millis(config.settle_delay_ms()),
            config.reed_active_low(),
        );
        Self {
            debouncer,
            indicator,
            arm,
            events,
            device_id: config.device_id(),
            include_armed: config.include_armed_in_payload(),
            announce_baseline: config.announce_baseline_on_boot(),
            poll_interval: Duration::from_millis(config.poll_interval_ms()),
            state: None,
        }
    }

    fn publish(&self, state: DoorState) {
        let armed = if self.include_armed { Some(self.arm.get().is_armed()) } else { None };
        self.events.send_transition(TransitionEvent::new(self.device_id, state, armed));
    }

    /// One iteration of the polling loop. All side effects are synchronous
    /// within the tick, preserving the one-event-per-change guarantee.
    async fn tick(&mut self) {
        let cur = match self.debouncer.sample().await {
            Ok(state) => state,
            Err(e) => {
                // Keep the previous state; the next tick retries the line
                warn!(error = %e, "reed_read_failed");
                return;
            }
        };

        // Indicator mirrors the physical state regardless of the arm flag
        if let Err(e) = self.indicator.set(cur.indicator_level()) {
            warn!(error = %e, "indicator_write_failed");
        }

        match self.state {
            None => {
                info!(door = %cur.as_str(), "door_baseline");
                if self.announce_baseline {
                    self.publish(cur);
                }
            }
            Some(prev) if prev != cur => {
                info!(door = %cur.as_str(), arm = %self.arm.get().as_str(), "door_state");
                self.publish(cur);
            }
            Some(_) => {
                trace!(door = %cur.as_str(), "door_poll");
            }
        }
        self.state = Some(cur);
    }

    /// Run the polling loop until the shutdown signal flips.
    ///
    /// The indicator is driven to its safe (off) state on every exit path.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            device_id = %self.device_id,
            poll_interval_ms = %self.poll_interval.as_millis(),
            announce_baseline = %self.announce_baseline,
            "door_monitor_started"
        );

        let mut poll_timer = interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                _ = poll_timer.tick() => {
                    self.tick().await;
                }
            }
        }

        if let Err(e) = self.indicator.set(false) {
            warn!(error = %e, "indicator_reset_failed");
        }
        info!("door_monitor_shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArmFlag;
    use crate::io::egress_channel::create_event_channel;
    use crate::io::gpio::{ScriptedInput, SimPin};

    // Raw levels for active-low wiring
    const CLOSED: bool = false;
    const OPEN: bool = true;

    fn monitor(
        samples: &[bool],
        config: Config,
        arm: Arc<ArmState>,
        events: EventSender,
    ) -> (DoorMonitor<ScriptedInput, SimPin>, SimPin) {
        let indicator = SimPin::new(false);
        let monitor = DoorMonitor::new(
            &config,
            ScriptedInput::new(samples.iter().copied()),
            indicator.clone(),
            arm,
            events,
        );
        (monitor, indicator)
    }

    fn test_config() -> Config {
        Config::default().with_settle_delay_ms(1)
    }

    #[tokio::test]
    async fn test_exactly_one_event_per_change() {
        // Tick states closed, closed, open, open, open, closed.
        // First tick dual-reads, each change dual-reads.
        let samples = [CLOSED, CLOSED, CLOSED, OPEN, OPEN, OPEN, OPEN, CLOSED, CLOSED];
        let (events, mut rx) = create_event_channel(16);
        let arm = Arc::new(ArmState::new(ArmFlag::Disarmed));
        let (mut monitor, _) = monitor(&samples, test_config(), arm, events);

        for _ in 0..6 {
            monitor.tick().await;
        }
        drop(monitor);

        // Baseline suppressed by default: exactly two events, open then close
        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, DoorState::Open);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, DoorState::Closed);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_baseline_suppressed_by_default() {
        let (events, mut rx) = create_event_channel(4);
        let arm = Arc::new(ArmState::new(ArmFlag::Disarmed));
        let (mut monitor, _) = monitor(&[CLOSED, CLOSED], test_config(), arm, events);

        monitor.tick().await;
        monitor.tick().await;
        drop(monitor);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_baseline_announced_when_configured() {
        let config = test_config().with_announce_baseline(true);
        let (events, mut rx) = create_event_channel(4);
        let arm = Arc::new(ArmState::new(ArmFlag::Disarmed));
        let (mut monitor, _) = monitor(&[CLOSED, CLOSED], config, arm, events);

        monitor.tick().await;
        drop(monitor);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, DoorState::Closed);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_indicator_mirrors_state_while_disarmed() {
        let samples = [CLOSED, CLOSED, OPEN, OPEN];
        let (events, _rx) = create_event_channel(4);
        let arm = Arc::new(ArmState::new(ArmFlag::Disarmed));
        let (mut monitor, indicator) = monitor(&samples, test_config(), arm, events);

        monitor.tick().await;
        assert!(!indicator.level(), "closed door, LED off");
        monitor.tick().await;
        assert!(indicator.level(), "open door, LED on even while disarmed");
    }

    #[tokio::test]
    async fn test_armed_snapshot_in_payload() {
        let samples = [CLOSED, CLOSED, OPEN, OPEN];
        let (events, mut rx) = create_event_channel(4);
        let arm = Arc::new(ArmState::new(ArmFlag::Armed));
        let (mut monitor, _) = monitor(&samples, test_config(), arm, events);

        monitor.tick().await;
        monitor.tick().await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.armed, Some(true));
    }

    #[tokio::test]
    async fn test_armed_omitted_when_variant_excludes_it() {
        let samples = [CLOSED, CLOSED, OPEN, OPEN];
        let config = test_config().with_include_armed(false);
        let (events, mut rx) = create_event_channel(4);
        let arm = Arc::new(ArmState::new(ArmFlag::Armed));
        let (mut monitor, _) = monitor(&samples, config, arm, events);

        monitor.tick().await;
        monitor.tick().await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.armed, None);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_disable_loop() {
        // Closed channel: every publish fails. The loop must keep
        // tracking state and keep attempting publication.
        let samples = [CLOSED, CLOSED, OPEN, OPEN, CLOSED, CLOSED];
        let (events, rx) = create_event_channel(1);
        drop(rx);
        let arm = Arc::new(ArmState::new(ArmFlag::Disarmed));
        let (mut monitor, indicator) = monitor(&samples, test_config(), arm, events);

        for _ in 0..3 {
            monitor.tick().await;
        }

        // State machine advanced past both failed publishes
        assert_eq!(monitor.state, Some(DoorState::Closed));
        assert!(!indicator.level());
    }

    #[tokio::test]
    async fn test_run_resets_indicator_on_shutdown() {
        let samples = [OPEN, OPEN];
        let config = test_config();
        let (events, _rx) = create_event_channel(4);
        let arm = Arc::new(ArmState::new(ArmFlag::Disarmed));
        let (monitor, indicator) = monitor(&samples, config, arm, events);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(monitor.run(shutdown_rx));

        // Let at least one tick drive the LED high, then shut down
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(!indicator.level(), "indicator reset to safe state on exit");
    }
}
