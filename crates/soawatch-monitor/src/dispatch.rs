//! Independent, one-shot fan-out of a change event.

use futures_util::future::join_all;
use soawatch_core::{ChangeEvent, ChannelTarget, DeliveryOutcome, Notifier};
use tracing::{info, warn};

use crate::clock::Clock;

/// Deliver `event` to every target concurrently.
///
/// Each target gets exactly one attempt. A failure is logged and reported in
/// its outcome; it never affects the other targets.
pub async fn fan_out(
    notifier: &dyn Notifier,
    clock: &dyn Clock,
    targets: &[ChannelTarget],
    event: &ChangeEvent,
) -> Vec<DeliveryOutcome> {
    let deliveries = targets.iter().map(|target| async move {
        let result = notifier.deliver(target, event).await;
        let channel = target.kind();
        let outcome = DeliveryOutcome {
            zone_id: event.zone_id.clone(),
            serial: event.new_serial,
            channel,
            delivered: result.is_ok(),
            error: result.as_ref().err().map(ToString::to_string),
            at: clock.now(),
        };

        match &result {
            Ok(()) => info!(zone = %event.zone, serial = event.new_serial, %channel, "notification delivered"),
            Err(e) => warn!(zone = %event.zone, serial = event.new_serial, %channel, error = %e, "notification failed"),
        }
        outcome
    });

    join_all(deliveries).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use soawatch_core::{ChangeKind, ChannelKind, Result, WatchError};

    struct FailingSlack {
        seen: Mutex<Vec<ChannelKind>>,
    }

    #[async_trait]
    impl Notifier for FailingSlack {
        async fn deliver(&self, target: &ChannelTarget, _event: &ChangeEvent) -> Result<()> {
            self.seen.lock().push(target.kind());
            match target {
                ChannelTarget::Slack { .. } => Err(WatchError::Status {
                    code: 500,
                    message: "slack down".into(),
                }),
                _ => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_block_others() {
        let notifier = FailingSlack {
            seen: Mutex::new(Vec::new()),
        };
        let clock = ManualClock::new(Utc::now());
        let targets = vec![
            ChannelTarget::Email { to: "ops@example.com".into() },
            ChannelTarget::Slack { webhook_url: "https://hooks.slack.test/x".into() },
            ChannelTarget::Teams { webhook_url: "https://teams.test/x".into() },
            ChannelTarget::Webhook { url: "https://hooks.test/x".into() },
        ];
        let event = ChangeEvent {
            zone_id: "z1".into(),
            zone: "example.com".into(),
            kind: ChangeKind::SerialChanged,
            old_serial: Some(5),
            new_serial: 6,
            soa: "ns1. admin. 6 1 2 3 4".parse().unwrap(),
            nameservers: Vec::new(),
            occurred_at: clock.now(),
            login_url: String::new(),
        };

        let outcomes = fan_out(&notifier, &clock, &targets, &event).await;
        assert_eq!(outcomes.len(), 4);
        assert_eq!(notifier.seen.lock().len(), 4);

        let failed: Vec<_> = outcomes.iter().filter(|o| !o.delivered).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].channel, ChannelKind::Slack);
        assert!(failed[0].error.as_deref().unwrap().contains("slack down"));
        assert!(outcomes.iter().all(|o| o.serial == 6 && o.zone_id == "z1"));
    }

    #[tokio::test]
    async fn no_targets_no_outcomes() {
        let notifier = FailingSlack {
            seen: Mutex::new(Vec::new()),
        };
        let clock = ManualClock::new(Utc::now());
        let event = ChangeEvent {
            zone_id: "z1".into(),
            zone: "example.com".into(),
            kind: ChangeKind::Baseline,
            old_serial: None,
            new_serial: 1,
            soa: "ns1. admin. 1 1 2 3 4".parse().unwrap(),
            nameservers: Vec::new(),
            occurred_at: clock.now(),
            login_url: String::new(),
        };
        assert!(fan_out(&notifier, &clock, &[], &event).await.is_empty());
    }
}
