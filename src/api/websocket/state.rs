//! State handed to the websocket consumer's request handlers

use std::sync::Arc;

use super::page::{self, DATA_SOURCE_PATH, HEALTH_PATH};
use super::registry::ClientRegistry;
use crate::config::WebsocketConfig;
use crate::error::{Error, Result};
use crate::signal::CancelSignal;

/// Settings fixed at initialization, including the rendered page
#[derive(Debug, Clone)]
pub struct WsSettings {
    pub host: String,
    pub endpoint: String,
    pub listen_address: String,
    pub client_queue: usize,
    pub page: String,
}

impl WsSettings {
    pub fn from_config(config: &WebsocketConfig) -> Result<Self> {
        if !config.endpoint.starts_with('/') {
            return Err(Error::Config(format!(
                "websocket endpoint {:?} must start with '/'",
                config.endpoint
            )));
        }
        if config.endpoint == DATA_SOURCE_PATH || config.endpoint == HEALTH_PATH {
            return Err(Error::Config(format!(
                "websocket endpoint may not be {}",
                config.endpoint
            )));
        }

        Ok(Self {
            host: config.host.clone(),
            endpoint: config.endpoint.clone(),
            listen_address: config.listen_address.clone(),
            client_queue: config.client_queue,
            page: page::render(&config.host),
        })
    }
}

/// Shared application state for the feed and page handlers
#[derive(Clone)]
pub struct WsState {
    pub settings: Arc<WsSettings>,
    pub registry: Arc<ClientRegistry>,
    pub signal: CancelSignal,
}

impl WsState {
    pub fn new(settings: Arc<WsSettings>, registry: Arc<ClientRegistry>, signal: CancelSignal) -> Self {
        Self {
            settings,
            registry,
            signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_render_page_for_host() {
        let config = WebsocketConfig {
            host: "pi.local".to_string(),
            ..WebsocketConfig::default()
        };
        let settings = WsSettings::from_config(&config).unwrap();
        assert!(settings.page.contains("ws://pi.local/dataSource"));
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let config = WebsocketConfig {
            endpoint: "dash".to_string(),
            ..WebsocketConfig::default()
        };
        assert!(matches!(WsSettings::from_config(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_endpoint_may_not_shadow_fixed_routes() {
        for endpoint in [DATA_SOURCE_PATH, HEALTH_PATH] {
            let config = WebsocketConfig {
                endpoint: endpoint.to_string(),
                ..WebsocketConfig::default()
            };
            assert!(matches!(WsSettings::from_config(&config), Err(Error::Config(_))));
        }
    }
}
