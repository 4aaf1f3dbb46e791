//! The `config` module handles the gateway's configuration management.
//!
//! It defines the structure of the application settings, provides default
//! values, and implements the logic for loading configuration from files
//! and environment variables, using the `config` crate for layered
//! sources.

pub mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::Settings;

pub use settings::{BrokerSettings, ServerSettings};

/// Loads gateway settings from file, environment, and defaults.
///
/// Values are read from:
/// 1. An optional `config/default` file (TOML/YAML/JSON).
/// 2. Environment variables with `__` separators (e.g.,
///    `SERVER__COAP_PORT=5683`).
///
/// Missing fields are filled from `Settings::default()`.
///
/// # Errors
///
/// Returns an error if the config file cannot be parsed or deserialized.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("__"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            coap_port: partial
                .server
                .as_ref()
                .and_then(|s| s.coap_port)
                .unwrap_or(default.server.coap_port),
            api_port: partial
                .server
                .as_ref()
                .and_then(|s| s.api_port)
                .unwrap_or(default.server.api_port),
        },
        broker: BrokerSettings {
            dedup_window_secs: partial
                .broker
                .as_ref()
                .and_then(|b| b.dedup_window_secs)
                .unwrap_or(default.broker.dedup_window_secs),
        },
    })
}

#[cfg(test)]
mod tests;
