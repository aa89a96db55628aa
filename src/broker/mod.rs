//! # Broker Module
//!
//! MQTT client functionality for the panel: one persistent broker session
//! with automatic recovery, and command publication against it.
//!
//! ## Module Architecture
//!
//! ```text
//! broker/
//! ├── settings.rs   - broker settings, URL construction, session options
//! ├── connection.rs - connection state machine and session task
//! ├── publisher.rs  - command topic/payload composition and publishing
//! └── error.rs      - broker error taxonomy
//! ```
//!
//! ## Delivery Model
//!
//! Commands are fire-and-forget at QoS 0. There is no acknowledgment wait
//! and no retry; commands issued while disconnected are dropped and
//! reported as suppressed, never queued. Every reconnect is a clean
//! session, so the broker replays nothing.
//!
//! ## Failure Containment
//!
//! Transport failures stop at the session task: they surface as
//! [`connection::ConnectionState`] transitions on a watch channel, followed
//! by a fixed-interval reconnect. Nothing in this module can take the
//! process down.

pub mod connection;
pub mod error;
pub mod publisher;
pub mod settings;

pub use connection::{BrokerConnection, ConnectionState};
pub use error::BrokerError;
pub use publisher::{command_topic, CommandPublisher, PublishOutcome};
pub use settings::{BrokerConfig, BrokerScheme};
