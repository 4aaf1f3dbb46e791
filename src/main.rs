use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use coapsub::broker::Broker;
use coapsub::config::load_config;
use coapsub::dedup::DuplicateTracker;
use coapsub::{api, transport, utils};

#[tokio::main]
async fn main() {
    utils::logging::init("info");

    // Load configuration with robust error handling
    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    let coap_addr = format!("{}:{}", config.server.host, config.server.coap_port);
    let api_addr = format!("{}:{}", config.server.host, config.server.api_port);
    let dedup_window = Duration::from_secs(config.broker.dedup_window_secs);

    let broker = Arc::new(Broker::new());
    let tracker = DuplicateTracker::new();

    // Run both servers and listen for a shutdown signal
    tokio::select! {
        result = transport::start_udp_server(&coap_addr, Arc::clone(&broker), tracker, dedup_window) => {
            if let Err(e) = result {
                error!("CoAP ingress exited: {e}");
            }
        }
        result = api::start_api_server(&api_addr, broker) => {
            if let Err(e) = result {
                error!("subscription API exited: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }
}
