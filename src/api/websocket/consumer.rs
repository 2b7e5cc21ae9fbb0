//! Websocket broadcast consumer

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::registry::ClientRegistry;
use super::state::{WsSettings, WsState};
use crate::api::http::create_router;
use crate::config::Config;
use crate::consumer::{Consumer, INPUT_CAPACITY};
use crate::error::{Error, Result};
use crate::signal::CancelSignal;
use crate::types::{EventReceiver, EventSender};

/// Serves the dashboard and relays every event to every connected client
#[derive(Default)]
pub struct WebsocketConsumer {
    settings: Option<Arc<WsSettings>>,
    registry: Option<Arc<ClientRegistry>>,
    local_addr: Option<SocketAddr>,
    started: bool,
}

impl WebsocketConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address the HTTP server is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Registry of connected clients, once initialized
    pub fn registry(&self) -> Option<Arc<ClientRegistry>> {
        self.registry.clone()
    }
}

#[async_trait]
impl Consumer for WebsocketConsumer {
    fn name(&self) -> &'static str {
        "websocket"
    }

    fn initialize(&mut self, config: &Config) -> Result<()> {
        let settings = WsSettings::from_config(&config.websocket)?;
        self.registry = Some(Arc::new(ClientRegistry::new(settings.client_queue)));
        self.settings = Some(Arc::new(settings));
        info!("websocket consumer initialized, page rendered");
        Ok(())
    }

    async fn start(&mut self, signal: CancelSignal) -> Result<EventSender> {
        if self.started {
            return Err(Error::AlreadyStarted(self.name()));
        }
        let (settings, registry) = match (&self.settings, &self.registry) {
            (Some(settings), Some(registry)) => (Arc::clone(settings), Arc::clone(registry)),
            _ => return Err(Error::NotInitialized(self.name())),
        };

        let listener = TcpListener::bind(&settings.listen_address)
            .await
            .map_err(|e| Error::bind(settings.listen_address.clone(), e))?;
        let local_addr = listener.local_addr()?;
        self.local_addr = Some(local_addr);
        self.started = true;

        let state = WsState::new(Arc::clone(&settings), Arc::clone(&registry), signal.clone());
        let router = create_router(state);
        let token = signal.token();
        signal.spawn(async move {
            let shutdown = async move { token.cancelled().await };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                warn!(error = %e, "websocket server error");
            }
            debug!("websocket server stopped");
        });

        info!(
            addr = %local_addr,
            page = %format!("{}{}", settings.host, settings.endpoint),
            "websocket endpoint listening"
        );

        let (tx, rx) = mpsc::channel(INPUT_CAPACITY);
        signal.spawn(relay(rx, registry, signal.clone()));

        info!("websocket consumer started");
        Ok(tx)
    }
}

/// Turn each event into a frame and hand it to every connected client
async fn relay(mut rx: EventReceiver, registry: Arc<ClientRegistry>, signal: CancelSignal) {
    loop {
        let event = tokio::select! {
            biased;
            _ = signal.fired() => break,
            event = rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        // A client with a full queue must not hold off cancellation
        let frame = event.frame();
        let delivered = tokio::select! {
            biased;
            _ = signal.fired() => break,
            delivered = registry.broadcast(&frame) => delivered,
        };
        debug!(kind = %event.kind, delivered, "event broadcast");
    }
    info!("websocket relay stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> Config {
        let mut config = Config::default();
        config.websocket.listen_address = "127.0.0.1:0".to_string();
        config
    }

    #[tokio::test]
    async fn test_start_before_initialize_fails() {
        let mut consumer = WebsocketConsumer::new();
        let err = consumer.start(CancelSignal::new()).await.unwrap_err();
        assert!(matches!(err, Error::NotInitialized("websocket")));
    }

    #[tokio::test]
    async fn test_start_binds_and_stops_on_signal() {
        let mut consumer = WebsocketConsumer::new();
        consumer.initialize(&local_config()).unwrap();

        let signal = CancelSignal::new();
        let _tx = consumer.start(signal.clone()).await.unwrap();
        assert!(consumer.local_addr().is_some());

        signal.fire();
        tokio::time::timeout(std::time::Duration::from_secs(2), signal.wait())
            .await
            .expect("server and relay should stop");
    }

    #[tokio::test]
    async fn test_bind_failure_reported() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = local_config();
        config.websocket.listen_address = taken.local_addr().unwrap().to_string();

        let mut consumer = WebsocketConsumer::new();
        consumer.initialize(&config).unwrap();
        let err = consumer.start(CancelSignal::new()).await.unwrap_err();
        assert!(matches!(err, Error::Bind { .. }));
    }
}
