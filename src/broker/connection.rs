//! Broker connection lifecycle as an explicit state machine.
//!
//! One session at a time, driven by a background task that owns the rumqttc
//! event loop. State transitions are published on a watch channel so every
//! dependent observes them without callback registration.
//!
//! # State Machine
//!
//! ```text
//! Disconnected ──► Connecting ──► Connected
//!                     ▲  │            │
//!            (1000 ms)│  ▼            ▼
//!                     Failed ◄────(transport error)
//!
//! any state ──► Disconnected (explicit disconnect)
//! ```
//!
//! Reconnection runs on a fixed 1000 ms interval with clean-session
//! semantics, indefinitely: no backoff growth, no attempt cap. Transport
//! errors never leave this module as errors; they become state transitions.

use super::error::BrokerError;
use super::publisher::CommandPublisher;
use super::settings::BrokerConfig;
use rumqttc::{AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, Packet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const RECONNECT_PERIOD: Duration = Duration::from_millis(1000);

/// Observable lifecycle states of the broker session.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// The live session: client handle plus the task driving its event loop.
struct ActiveSession {
    client: AsyncClient,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Owns at most one broker session and its state machine.
pub struct BrokerConnection {
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    session: Option<ActiveSession>,
}

impl BrokerConnection {
    pub fn new() -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::default());
        Self {
            state_tx: Arc::new(state_tx),
            state_rx,
            session: None,
        }
    }

    /// Opens a session against the configured broker.
    ///
    /// Enters `Connecting` before returning. While a session already exists
    /// (connecting, connected, or failed and retrying), further calls are
    /// coalesced: logged and ignored, never a second concurrent attempt.
    pub fn connect(&mut self, config: &BrokerConfig) -> Result<(), BrokerError> {
        if self.session.is_some() {
            warn!("Connect requested while a session exists, ignoring");
            return Ok(());
        }

        let options = config.mqtt_options()?;
        info!("Connecting to {}", config.broker_url());
        self.state_tx.send_replace(ConnectionState::Connecting);

        let (client, event_loop) = AsyncClient::new(options, 32);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(session_task(
            event_loop,
            self.state_tx.clone(),
            shutdown_rx,
        ));

        self.session = Some(ActiveSession {
            client,
            shutdown_tx,
            task,
        });
        Ok(())
    }

    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    /// Watch handle for dependents that react to state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// True only while the session is `Connected`.
    pub fn is_publish_ready(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Publisher bound to the current session, or to none when no session
    /// exists, in which case every publish is suppressed.
    pub fn publisher(&self) -> CommandPublisher {
        CommandPublisher::new(
            self.session.as_ref().map(|s| s.client.clone()),
            self.state_rx.clone(),
        )
    }

    /// Ends the session and returns the machine to `Disconnected`.
    ///
    /// Best-effort MQTT Disconnect first, then the event-loop task is
    /// stopped and awaited so no session resources outlive this call.
    pub async fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.client.disconnect().await {
                debug!("Disconnect packet not sent: {}", e);
            }
            let _ = session.shutdown_tx.send(());
            if let Err(e) = session.task.await {
                warn!("Session task ended abnormally: {}", e);
            }
        }
        self.state_tx.send_replace(ConnectionState::Disconnected);
    }
}

impl Default for BrokerConnection {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the event loop until shutdown, converting transport events into
/// state transitions. A failed poll ends the current attempt; the next poll
/// after the reconnect interval starts a fresh clean session.
async fn session_task(
    mut event_loop: EventLoop,
    state: Arc<watch::Sender<ConnectionState>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!("Session shutdown requested");
                break;
            }
            event = event_loop.poll() => {
                match state_after_event(&event) {
                    Some(ConnectionState::Connected) => {
                        let previous = state.send_replace(ConnectionState::Connected);
                        if previous != ConnectionState::Connected {
                            info!("Connected to broker");
                        }
                    }
                    Some(ConnectionState::Failed) => {
                        if let Err(e) = &event {
                            warn!("Transport error: {}", e);
                        }
                        state.send_replace(ConnectionState::Failed);
                        tokio::time::sleep(RECONNECT_PERIOD).await;
                        debug!("Retrying connection");
                        state.send_replace(ConnectionState::Connecting);
                    }
                    _ => {}
                }
            }
        }
    }
    state.send_replace(ConnectionState::Disconnected);
}

/// Pure transition function from one poll result.
///
/// `None` means the event does not move the machine (publish
/// acknowledgments, pings, outgoing echoes).
fn state_after_event(event: &Result<Event, ConnectionError>) -> Option<ConnectionState> {
    match event {
        Ok(Event::Incoming(Packet::ConnAck(ack))) if ack.code == ConnectReturnCode::Success => {
            Some(ConnectionState::Connected)
        }
        Ok(Event::Incoming(Packet::ConnAck(ack))) => {
            warn!("Broker refused connection: {:?}", ack.code);
            Some(ConnectionState::Failed)
        }
        Ok(_) => None,
        Err(_) => Some(ConnectionState::Failed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::settings::BrokerScheme;
    use rumqttc::ConnAck;

    fn unreachable_broker() -> BrokerConfig {
        BrokerConfig {
            scheme: BrokerScheme::Mqtt,
            host: "127.0.0.1".to_string(),
            port: Some(1),
            ..BrokerConfig::default()
        }
    }

    #[test]
    fn connack_success_transitions_to_connected() {
        let event = Ok(Event::Incoming(Packet::ConnAck(ConnAck {
            session_present: false,
            code: ConnectReturnCode::Success,
        })));
        assert_eq!(
            state_after_event(&event),
            Some(ConnectionState::Connected)
        );
    }

    #[test]
    fn connack_refusal_transitions_to_failed() {
        let event = Ok(Event::Incoming(Packet::ConnAck(ConnAck {
            session_present: false,
            code: ConnectReturnCode::BadUserNamePassword,
        })));
        assert_eq!(state_after_event(&event), Some(ConnectionState::Failed));
    }

    #[test]
    fn transport_error_transitions_to_failed() {
        let event = Err(ConnectionError::Io(std::io::Error::from(
            std::io::ErrorKind::ConnectionReset,
        )));
        assert_eq!(state_after_event(&event), Some(ConnectionState::Failed));
    }

    #[test]
    fn housekeeping_events_do_not_move_the_machine() {
        let event = Ok(Event::Incoming(Packet::PingResp));
        assert_eq!(state_after_event(&event), None);
    }

    #[tokio::test]
    async fn connect_enters_connecting_synchronously() {
        let mut connection = BrokerConnection::new();
        assert_eq!(connection.state(), ConnectionState::Disconnected);

        connection.connect(&unreachable_broker()).expect("connect");
        assert_eq!(connection.state(), ConnectionState::Connecting);

        connection.disconnect().await;
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn reentrant_connect_is_coalesced() {
        let mut connection = BrokerConnection::new();
        connection.connect(&unreachable_broker()).expect("connect");
        connection
            .connect(&unreachable_broker())
            .expect("second connect coalesces");
        assert_eq!(connection.state(), ConnectionState::Connecting);
        connection.disconnect().await;
    }

    #[tokio::test]
    async fn failed_attempt_reenters_connecting_after_the_interval() {
        let mut connection = BrokerConnection::new();
        let mut state_rx = connection.watch_state();

        // Port 1 on loopback refuses immediately, so the first poll fails.
        connection.connect(&unreachable_broker()).expect("connect");
        state_rx
            .wait_for(|s| *s == ConnectionState::Failed)
            .await
            .expect("failed state");
        state_rx
            .wait_for(|s| *s == ConnectionState::Connecting)
            .await
            .expect("retry state");

        connection.disconnect().await;
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn empty_host_never_leaves_disconnected() {
        let mut connection = BrokerConnection::new();
        assert!(connection.connect(&BrokerConfig::default()).is_err());
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }
}
