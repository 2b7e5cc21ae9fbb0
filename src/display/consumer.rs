//! LCD consumer - feeds events into a presentation engine

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use super::driver::DisplayDriver;
use super::engine::PresentationEngine;
use crate::config::{Config, DisplayConfig};
use crate::consumer::{Consumer, INPUT_CAPACITY};
use crate::error::{Error, Result};
use crate::signal::CancelSignal;
use crate::types::EventSender;

pub struct LcdConsumer<D: DisplayDriver> {
    driver: Option<D>,
    defaults: Option<DisplayConfig>,
}

impl<D: DisplayDriver> LcdConsumer<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver: Some(driver),
            defaults: None,
        }
    }
}

#[async_trait]
impl<D: DisplayDriver> Consumer for LcdConsumer<D> {
    fn name(&self) -> &'static str {
        "lcd"
    }

    fn initialize(&mut self, config: &Config) -> Result<()> {
        config.display.default_duration_ms()?;
        self.defaults = Some(config.display.clone());
        info!(
            duration_ms = config.display.duration_ms,
            flash = ?config.display.flash,
            "LCD consumer initialized"
        );
        Ok(())
    }

    async fn start(&mut self, signal: CancelSignal) -> Result<EventSender> {
        let defaults = self
            .defaults
            .clone()
            .ok_or(Error::NotInitialized(self.name()))?;
        let driver = self.driver.take().ok_or(Error::AlreadyStarted(self.name()))?;

        let (tx, rx) = mpsc::channel(INPUT_CAPACITY);
        let engine = PresentationEngine::new(driver, defaults);
        signal.spawn(engine.run(rx, signal.clone()));

        info!("LCD consumer started");
        Ok(tx)
    }
}
