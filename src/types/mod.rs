//! Data types moving through the pipeline
//!
//! Events are produced outside the crate and fanned out by the dispatcher.

mod event;

pub use event::{Event, SHUTDOWN_KIND};

/// Input channel a consumer hands back from `start`
pub type EventSender = tokio::sync::mpsc::Sender<Event>;

/// Receiving half owned by a consumer loop
pub type EventReceiver = tokio::sync::mpsc::Receiver<Event>;
