//! Presentation state machine
//!
//! `IDLE -> FLASHING -> SHOWING -> FLASHING -> CLEARING -> IDLE` per request,
//! or straight to `STOPPED` on a shutdown request or the cancellation signal.

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::driver::DisplayDriver;
use super::request::{DisplayCategory, DisplayRequest};
use crate::config::DisplayConfig;
use crate::error::Result;
use crate::signal::CancelSignal;
use crate::types::{Event, EventReceiver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Flashing,
    Showing,
    Clearing,
    Stopped,
}

/// Events read ahead during a hold or flash, waiting to be presented
pub const PENDING_LIMIT: usize = 8;

/// Drives one display from a stream of events.
///
/// While a hold or flash is running the input channel is still read so a
/// shutdown event can abort it. Other events seen meanwhile are queued in
/// arrival order and presented next. Once [`PENDING_LIMIT`] are queued,
/// reading pauses and the sender blocks again.
pub struct PresentationEngine<D: DisplayDriver> {
    driver: D,
    defaults: DisplayConfig,
    state: EngineState,
    pending: VecDeque<Event>,
    input_closed: bool,
}

impl<D: DisplayDriver> PresentationEngine<D> {
    pub fn new(driver: D, defaults: DisplayConfig) -> Self {
        Self {
            driver,
            defaults,
            state: EngineState::Idle,
            pending: VecDeque::new(),
            input_closed: false,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Present events until shutdown, cancellation or a closed input.
    /// Returns the terminal state.
    pub async fn run(mut self, mut rx: EventReceiver, signal: CancelSignal) -> EngineState {
        info!("presentation engine started");

        while let Some(event) = self.next_event(&mut rx, &signal).await {
            let request = match DisplayRequest::from_event(&event, &self.defaults) {
                Ok(request) => request,
                Err(e) => {
                    warn!(kind = %event.kind, error = %e, "rejected display request");
                    continue;
                }
            };

            if self.present(&request, &mut rx, &signal).await.is_break() {
                break;
            }
        }

        self.state = EngineState::Stopped;
        self.apply("close", |d| d.close());
        info!("presentation engine stopped");
        self.state
    }

    async fn next_event(&mut self, rx: &mut EventReceiver, signal: &CancelSignal) -> Option<Event> {
        if signal.is_fired() {
            return None;
        }
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if self.input_closed {
            return None;
        }

        tokio::select! {
            biased;
            _ = signal.fired() => None,
            event = rx.recv() => event,
        }
    }

    async fn present(
        &mut self,
        request: &DisplayRequest,
        rx: &mut EventReceiver,
        signal: &CancelSignal,
    ) -> ControlFlow<()> {
        match request.category {
            DisplayCategory::Shutdown => {
                info!("shutdown request received");
                return ControlFlow::Break(());
            }
            DisplayCategory::Display => {}
        }

        debug!(
            message = %request.message,
            duration = ?request.duration,
            flash = ?request.flash,
            "presenting"
        );

        self.flash(request.flashes_before(), rx, signal).await?;

        self.state = EngineState::Showing;
        self.apply("write", |d| d.write(&request.message));
        self.hold(request.duration, rx, signal).await?;

        self.flash(request.flashes_after(), rx, signal).await?;

        if request.clear_after {
            self.state = EngineState::Clearing;
            self.apply("clear", |d| d.clear());
        }

        self.state = EngineState::Idle;
        ControlFlow::Continue(())
    }

    /// `times` backlight off/on toggles, each half period `flash_interval`
    async fn flash(
        &mut self,
        times: u32,
        rx: &mut EventReceiver,
        signal: &CancelSignal,
    ) -> ControlFlow<()> {
        if times == 0 {
            return ControlFlow::Continue(());
        }

        self.state = EngineState::Flashing;
        let interval = self.defaults.flash_interval();
        for _ in 0..times {
            self.apply("backlight off", |d| d.set_backlight(false));
            self.hold(interval, rx, signal).await?;
            self.apply("backlight on", |d| d.set_backlight(true));
            self.hold(interval, rx, signal).await?;
        }
        ControlFlow::Continue(())
    }

    /// Wait out `duration`, breaking early on cancellation or a shutdown event
    async fn hold(
        &mut self,
        duration: Duration,
        rx: &mut EventReceiver,
        signal: &CancelSignal,
    ) -> ControlFlow<()> {
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;
                _ = signal.fired() => return ControlFlow::Break(()),
                event = rx.recv(), if self.pending.len() < PENDING_LIMIT && !self.input_closed => match event {
                    Some(event) if event.is_shutdown() => {
                        info!(discarded = self.pending.len(), "shutdown request aborted presentation");
                        return ControlFlow::Break(());
                    }
                    Some(event) => self.pending.push_back(event),
                    None => self.input_closed = true,
                },
                _ = &mut deadline => return ControlFlow::Continue(()),
            }
        }
    }

    /// Driver failures are logged and presentation carries on
    fn apply<F>(&mut self, op: &'static str, f: F)
    where
        F: FnOnce(&mut D) -> Result<()>,
    {
        if let Err(e) = f(&mut self.driver) {
            warn!(op, error = %e, "display driver error");
        }
    }
}
