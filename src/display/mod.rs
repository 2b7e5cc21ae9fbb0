//! Display presentation: events become timed, flashing LCD output
//!
//! - `request`: DisplayRequest and its construction from events
//! - `engine`: the presentation state machine
//! - `driver`: the display collaborator trait plus console/memory drivers
//! - `consumer`: the LCD consumer wiring an engine to the dispatcher

mod consumer;
mod driver;
mod engine;
mod request;

pub use consumer::LcdConsumer;
pub use driver::{ConsoleDisplay, DisplayDriver, DisplayLog, DisplayOp, MemoryDisplay};
pub use engine::{EngineState, PresentationEngine, PENDING_LIMIT};
pub use request::{DisplayCategory, DisplayRequest, FlashPosition};
