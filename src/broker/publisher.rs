//! Command composition and fire-and-forget publication.

use super::connection::ConnectionState;
use super::error::BrokerError;
use crate::config::model::{Endpoint, Function};
use rumqttc::{AsyncClient, QoS};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// What happened to one publish request.
///
/// `Suppressed` is the documented drop, not an error: commands issued
/// without a ready session are discarded, never queued for later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    Sent,
    Suppressed,
}

/// Wire payload for every command message. Field order is the serialized
/// key order, so it stays stable.
#[derive(Serialize)]
struct CommandPayload<'a> {
    data: &'a str,
    token: &'a str,
}

/// Publishes commands against the session it was created from.
///
/// Obtained from [`super::connection::BrokerConnection::publisher`]. Holds
/// the client plus a state watch, so readiness is checked per call.
pub struct CommandPublisher {
    client: Option<AsyncClient>,
    state: watch::Receiver<ConnectionState>,
}

impl CommandPublisher {
    pub(crate) fn new(
        client: Option<AsyncClient>,
        state: watch::Receiver<ConnectionState>,
    ) -> Self {
        Self { client, state }
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_some() && *self.state.borrow() == ConnectionState::Connected
    }

    /// Composes and publishes one command message.
    ///
    /// Exactly one non-blocking enqueue per invocation at QoS 0, no retry,
    /// no acknowledgment wait. Without a ready session the command is
    /// dropped and reported as [`PublishOutcome::Suppressed`].
    pub fn publish(
        &self,
        endpoint: &Endpoint,
        function: &Function,
        value: &str,
    ) -> Result<PublishOutcome, BrokerError> {
        let Some(client) = self.client.as_ref().filter(|_| self.is_ready()) else {
            debug!(
                "Publish of {} suppressed, no active session",
                function.name
            );
            return Ok(PublishOutcome::Suppressed);
        };

        let topic = command_topic(endpoint, function);
        let payload = serde_json::to_vec(&CommandPayload {
            data: value,
            token: &function.auth_token,
        })?;

        match client.try_publish(topic.as_str(), QoS::AtMostOnce, false, payload) {
            Ok(()) => {
                info!("Sent {} to {}", value, topic);
                Ok(PublishOutcome::Sent)
            }
            Err(e) => {
                // Queue pressure or a torn-down session; same best-effort
                // drop as publishing while disconnected.
                warn!("Publish to {} dropped: {}", topic, e);
                Ok(PublishOutcome::Suppressed)
            }
        }
    }
}

/// Full topic for one function: endpoint identifier, slash, topic suffix.
pub fn command_topic(endpoint: &Endpoint, function: &Function) -> String {
    format!("{}/{}", endpoint.identifier, function.topic_suffix)
}
