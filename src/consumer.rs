//! Consumer contract implemented by every event sink

use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;
use crate::signal::CancelSignal;
use crate::types::EventSender;

/// Input channel capacity; one slot keeps the dispatcher's handoff blocking
pub const INPUT_CAPACITY: usize = 1;

/// A component that turns events into an external effect.
///
/// `initialize` is called once, before `start`. `start` spawns the
/// consumer's loops through `signal` and returns the channel the
/// dispatcher delivers into. Loops must race the signal against their
/// input in a single wait so cancellation is never starved.
#[async_trait]
pub trait Consumer: Send {
    /// Name used in logs
    fn name(&self) -> &'static str;

    fn initialize(&mut self, config: &Config) -> Result<()>;

    async fn start(&mut self, signal: CancelSignal) -> Result<EventSender>;
}
