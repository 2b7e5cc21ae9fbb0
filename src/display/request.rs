//! DisplayRequest - one presentation derived from an event

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DisplayConfig;
use crate::error::{Error, Result};
use crate::types::Event;

/// When the backlight blinks relative to showing the message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashPosition {
    #[default]
    None,
    Before,
    After,
    BeforeAndAfter,
}

impl FlashPosition {
    pub fn before(self) -> bool {
        matches!(self, FlashPosition::Before | FlashPosition::BeforeAndAfter)
    }

    pub fn after(self) -> bool {
        matches!(self, FlashPosition::After | FlashPosition::BeforeAndAfter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCategory {
    Display,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRequest {
    pub category: DisplayCategory,
    pub message: String,
    pub duration: Duration,
    pub flash: FlashPosition,
    pub flash_repetitions: u32,
    pub clear_after: bool,
}

/// Object payload accepted by display events
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DisplayPayload {
    message: String,
    duration_ms: Option<i64>,
    flash: Option<FlashPosition>,
    flash_repetitions: Option<i64>,
    clear_after: Option<bool>,
}

impl DisplayRequest {
    /// Build a display request, rejecting negative durations and repetition counts
    pub fn new(
        message: impl Into<String>,
        duration_ms: i64,
        flash: FlashPosition,
        flash_repetitions: i64,
        clear_after: bool,
    ) -> Result<Self> {
        let duration_ms = u64::try_from(duration_ms)
            .map_err(|_| Error::InvalidRequest(format!("negative duration {}ms", duration_ms)))?;
        let flash_repetitions = u32::try_from(flash_repetitions).map_err(|_| {
            Error::InvalidRequest(format!("invalid flash repetitions {}", flash_repetitions))
        })?;

        Ok(Self {
            category: DisplayCategory::Display,
            message: message.into(),
            duration: Duration::from_millis(duration_ms),
            flash,
            flash_repetitions,
            clear_after,
        })
    }

    pub fn shutdown() -> Self {
        Self {
            category: DisplayCategory::Shutdown,
            message: String::new(),
            duration: Duration::ZERO,
            flash: FlashPosition::None,
            flash_repetitions: 0,
            clear_after: false,
        }
    }

    /// Derive a request from an event, filling gaps from `defaults`
    pub fn from_event(event: &Event, defaults: &DisplayConfig) -> Result<Self> {
        if event.is_shutdown() {
            return Ok(Self::shutdown());
        }

        let duration_ms = defaults.default_duration_ms()?;
        let repetitions = i64::from(defaults.flash_repetitions);

        match &event.payload {
            Value::Null => Err(Error::InvalidRequest(format!(
                "event `{}` has no message",
                event.kind
            ))),
            Value::String(message) => Self::new(
                message.clone(),
                duration_ms,
                defaults.flash,
                repetitions,
                defaults.clear_after,
            ),
            Value::Object(_) => {
                let payload = DisplayPayload::deserialize(&event.payload)
                    .map_err(|e| Error::InvalidRequest(e.to_string()))?;
                Self::new(
                    payload.message,
                    payload.duration_ms.unwrap_or(duration_ms),
                    payload.flash.unwrap_or(defaults.flash),
                    payload.flash_repetitions.unwrap_or(repetitions),
                    payload.clear_after.unwrap_or(defaults.clear_after),
                )
            }
            other => Self::new(
                other.to_string(),
                duration_ms,
                defaults.flash,
                repetitions,
                defaults.clear_after,
            ),
        }
    }

    /// Toggles to perform before showing the message
    pub fn flashes_before(&self) -> u32 {
        if self.flash.before() {
            self.flash_repetitions
        } else {
            0
        }
    }

    /// Toggles to perform after the hold
    pub fn flashes_after(&self) -> u32 {
        if self.flash.after() {
            self.flash_repetitions
        } else {
            0
        }
    }
}
