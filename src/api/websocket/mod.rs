//! Websocket broadcast consumer
//!
//! Serves a dashboard page on the configured endpoint and a socket feed at
//! `/dataSource`. Every event the consumer receives is written as a
//! `<kind>:<payload>\n` text frame to every connected client.

pub mod consumer;
pub mod handler;
pub mod page;
pub mod registry;
pub mod state;

// Re-export commonly used items
pub use consumer::WebsocketConsumer;
pub use page::DATA_SOURCE_PATH;
pub use registry::{ClientId, ClientRegistry};
