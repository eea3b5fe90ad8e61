//! Notification delivery for newly registered vehicles
//!
//! Delivery is fire-and-forget relative to the surrounding transaction: the
//! write pipeline attempts it after commit, never retries, and a failure
//! downgrades the create outcome instead of rolling anything back.

use async_trait::async_trait;
use tracing::debug;
use vehicle_registry_core::vehicle::Vehicle;

/// Outcome of a notification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The transport refused or dropped the message.
    SendFailed(String),
    /// The notification backend rejected our credentials.
    AuthFailed(String),
    /// Any other delivery failure.
    Failed(String),
}

impl SendOutcome {
    /// Check whether the notification went out
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered)
    }

    /// The failure reason, if delivery did not happen
    pub fn reason(&self) -> Option<&str> {
        match self {
            SendOutcome::Delivered => None,
            SendOutcome::SendFailed(reason)
            | SendOutcome::AuthFailed(reason)
            | SendOutcome::Failed(reason) => Some(reason),
        }
    }
}

/// Collaborator that announces newly created vehicles
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce a newly created vehicle
    async fn send(&self, vehicle: &Vehicle) -> SendOutcome;
}

/// Notifier that only writes a log line; the default wiring for
/// deployments without a notification backend
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, vehicle: &Vehicle) -> SendOutcome {
        debug!("send: new vehicle {} ({})", vehicle.plate, vehicle.id);
        SendOutcome::Delivered
    }
}
