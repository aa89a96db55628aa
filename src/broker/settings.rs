//! Broker settings and connection URL construction.

use super::error::BrokerError;
use crate::config::store::config_dir;
use rumqttc::{MqttOptions, Transport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const BROKER_FILE: &str = "broker.toml";
const CLIENT_ID: &str = "switchboard";
const KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Transport scheme for the broker connection.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BrokerScheme {
    Mqtt,
    Mqtts,
    Ws,
    #[default]
    Wss,
}

impl BrokerScheme {
    fn default_port(self) -> u16 {
        match self {
            BrokerScheme::Mqtt => 1883,
            BrokerScheme::Mqtts => 8883,
            BrokerScheme::Ws => 80,
            BrokerScheme::Wss => 443,
        }
    }
}

impl fmt::Display for BrokerScheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let scheme = match self {
            BrokerScheme::Mqtt => "mqtt://",
            BrokerScheme::Mqtts => "mqtts://",
            BrokerScheme::Ws => "ws://",
            BrokerScheme::Wss => "wss://",
        };
        write!(f, "{}", scheme)
    }
}

/// Operator-entered broker settings.
///
/// Port and credentials are strictly optional; a blank port is left out of
/// the connection URL entirely.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BrokerConfig {
    pub scheme: BrokerScheme,
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl BrokerConfig {
    /// Connection URL in the form `{scheme}{host}` or `{scheme}{host}:{port}`.
    pub fn broker_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}{}:{}", self.scheme, self.host, port),
            None => format!("{}{}", self.scheme, self.host),
        }
    }

    /// Assembles rumqttc options for one session.
    ///
    /// Clean session on every attempt, so no subscription or message state
    /// is replayed across reconnects.
    pub(crate) fn mqtt_options(&self) -> Result<MqttOptions, BrokerError> {
        if self.host.trim().is_empty() {
            return Err(BrokerError::EmptyHost);
        }

        let port = self.port.unwrap_or_else(|| self.scheme.default_port());
        // Websocket transports take the full URL as the broker address.
        let mut options = match self.scheme {
            BrokerScheme::Mqtt | BrokerScheme::Mqtts => {
                MqttOptions::new(CLIENT_ID, self.host.clone(), port)
            }
            BrokerScheme::Ws | BrokerScheme::Wss => {
                MqttOptions::new(CLIENT_ID, self.broker_url(), port)
            }
        };

        options.set_transport(match self.scheme {
            BrokerScheme::Mqtt => Transport::tcp(),
            BrokerScheme::Mqtts => Transport::tls_with_default_config(),
            BrokerScheme::Ws => Transport::ws(),
            BrokerScheme::Wss => Transport::wss_with_default_config(),
        });
        options
            .set_keep_alive(KEEP_ALIVE)
            .set_clean_session(true);
        if let Some(username) = &self.username {
            options.set_credentials(username.clone(), self.password.clone().unwrap_or_default());
        }

        Ok(options)
    }

    /// Loads persisted settings, defaulting when no file exists yet.
    pub fn load() -> Result<Self, BrokerError> {
        let path = Self::settings_path();
        match fs::read_to_string(&path) {
            Ok(content) => {
                let config = toml::from_str(&content)?;
                debug!("Loaded broker settings from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No broker settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the settings file, creating the config directory if needed.
    pub fn save(&self) -> Result<(), BrokerError> {
        let path = Self::settings_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved broker settings to {}", path.display());
        Ok(())
    }

    fn settings_path() -> PathBuf {
        let mut path = config_dir();
        path.push(BROKER_FILE);
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_omits_blank_port() {
        let config = BrokerConfig {
            scheme: BrokerScheme::Wss,
            host: "broker.example.com".to_string(),
            ..BrokerConfig::default()
        };
        assert_eq!(config.broker_url(), "wss://broker.example.com");
    }

    #[test]
    fn url_includes_port_when_set() {
        let config = BrokerConfig {
            scheme: BrokerScheme::Mqtt,
            host: "broker.example.com".to_string(),
            port: Some(1884),
            ..BrokerConfig::default()
        };
        assert_eq!(config.broker_url(), "mqtt://broker.example.com:1884");
    }

    #[test]
    fn empty_host_is_rejected() {
        let config = BrokerConfig::default();
        assert!(matches!(
            config.mqtt_options(),
            Err(BrokerError::EmptyHost)
        ));
    }

    #[test]
    fn credentials_only_set_when_username_present() {
        let mut config = BrokerConfig {
            scheme: BrokerScheme::Mqtt,
            host: "localhost".to_string(),
            ..BrokerConfig::default()
        };
        let options = config.mqtt_options().expect("options");
        assert_eq!(options.credentials(), None);

        config.username = Some("operator".to_string());
        let options = config.mqtt_options().expect("options");
        assert_eq!(
            options.credentials(),
            Some(("operator".to_string(), String::new()))
        );
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let config = BrokerConfig {
            scheme: BrokerScheme::Wss,
            host: "broker.example.com".to_string(),
            port: None,
            username: Some("operator".to_string()),
            password: Some("secret".to_string()),
        };
        let content = toml::to_string_pretty(&config).expect("serialize");
        let restored: BrokerConfig = toml::from_str(&content).expect("deserialize");
        assert_eq!(restored, config);
    }
}
