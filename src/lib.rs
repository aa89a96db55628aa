//! # switchboard
//!
//! Embeddable core of an MQTT control panel: a hierarchy of locations,
//! endpoints and switchable functions, driven by authenticated command
//! messages over one persistent broker session.
//!
//! ```text
//! config  - Location → Endpoint → Function tree, durable JSON persistence
//! broker  - connection state machine, reconnect loop, command publishing
//! panel   - push / toggle / input / time widget state machines
//! ```
//!
//! A front-end (egui, ratatui, web) supplies rendering and input
//! collection; this crate supplies everything behind it. The usual wiring:
//! open the [`config::ConfigStore`], load [`broker::BrokerConfig`], connect
//! a [`broker::BrokerConnection`], build [`panel::FunctionWidget`]s from
//! the tree, and press them through a [`broker::CommandPublisher`].

pub mod broker;
pub mod config;
pub mod panel;

pub use broker::{BrokerConfig, BrokerConnection, CommandPublisher, ConnectionState};
pub use config::{ConfigStore, FunctionDraft};
pub use panel::FunctionWidget;

use color_eyre::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the crate's diagnostics for binary embedders: color-eyre panic
/// and error reports plus a fmt tracing subscriber.
///
/// Honors `RUST_LOG` and `RUST_LIB_BACKTRACE` when already set. Call once
/// at startup; a host that brings its own subscriber should skip this.
pub fn install_diagnostics() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
    Ok(())
}
