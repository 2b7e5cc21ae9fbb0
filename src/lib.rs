//! LCD Events
//!
//! Routes status events from producers to pluggable consumers: a character
//! LCD driven by a timed, flashing presentation engine and a websocket
//! dashboard that broadcasts every event to every connected browser.
//!
//! # Modules
//!
//! - `types`: the Event unit and channel aliases
//! - `consumer`: the Initialize/Start contract every consumer implements
//! - `dispatcher`: fan-out of events to registered consumers
//! - `signal`: the shared cancellation signal and task tracking
//! - `display`: presentation engine, display drivers and the LCD consumer
//! - `api`: the websocket broadcast consumer and its HTTP surface
//! - `producer`: line-oriented event producer
//! - `hardware`: host detection
//! - `config`: layered configuration
//!
//! # Example
//!
//! ```no_run
//! use lcd_events::{Config, ConsoleDisplay, Dispatcher, Event, LcdConsumer, WebsocketConsumer};
//!
//! #[tokio::main]
//! async fn main() -> lcd_events::Result<()> {
//!     let config = Config::default();
//!     let mut dispatcher = Dispatcher::new();
//!     dispatcher.register(&mut LcdConsumer::new(ConsoleDisplay::new(std::io::stdout())), &config).await?;
//!     dispatcher.register(&mut WebsocketConsumer::new(), &config).await?;
//!
//!     dispatcher.dispatch(Event::new("mail", "2 new messages")).await;
//!     dispatcher.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod consumer;
pub mod dispatcher;
pub mod display;
pub mod error;
pub mod hardware;
pub mod producer;
pub mod signal;
pub mod types;

// Re-export commonly used items at crate root
pub use api::websocket::WebsocketConsumer;
pub use config::Config;
pub use consumer::Consumer;
pub use dispatcher::Dispatcher;
pub use display::{ConsoleDisplay, DisplayDriver, DisplayRequest, FlashPosition, LcdConsumer, MemoryDisplay};
pub use error::{Error, Result};
pub use signal::CancelSignal;
pub use types::Event;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
