use serde::Deserialize;

/// Top-level configuration settings for the gateway.
///
/// Aggregates the network parameters of the two listening sockets and
/// the operational parameters of the broker side.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Network settings: bind host and the two ports.
    pub server: ServerSettings,
    /// Broker settings, such as the duplicate-rejection window.
    pub broker: BrokerSettings,
}

/// Configuration settings for the listening sockets.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// The host address (e.g., "127.0.0.1" or "0.0.0.0") both sockets bind to.
    pub host: String,
    /// The UDP port CoAP devices send to.
    pub coap_port: u16,
    /// The TCP port the WebSocket subscription API listens on.
    pub api_port: u16,
}

/// Configuration settings for the broker.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    /// Seconds a `(peer, message id)` pair stays in the duplicate
    /// tracker. Defaults to the CoAP EXCHANGE_LIFETIME of 145 s.
    pub dedup_window_secs: u64,
}

/// Partial configuration loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled
/// from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
}

/// Partial server settings.
#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub coap_port: Option<u16>,
    pub api_port: Option<u16>,
}

/// Partial broker settings.
#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub dedup_window_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                coap_port: 5683,
                api_port: 8080,
            },
            broker: BrokerSettings {
                dedup_window_secs: 145,
            },
        }
    }
}
