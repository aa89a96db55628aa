//! Per-function interaction state machines.
//!
//! A widget decides *what* value a function publishes and *when*; how it is
//! drawn is the front-end's concern. Each kind carries its own state:
//!
//! - push: stateless, activation yields the configured value
//! - toggle: on/off, starts off, activation yields the target state's value
//!   and flips
//! - input: holds an operator-entered string, sent verbatim
//! - time: holds a time-of-day string, validated on entry, sent verbatim
//!
//! Widget state is view-local. Rebuilding the panel resets every toggle to
//! off and clears every held value; there is no query of actual device
//! state to reconcile against.

use crate::broker::publisher::{CommandPublisher, PublishOutcome};
use crate::broker::BrokerError;
use crate::config::model::{Endpoint, Function, FunctionKind};
use chrono::NaiveTime;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum WidgetError {
    /// The function's kind has no operator-entered value.
    #[error("a {0} function takes no entered value")]
    ValueNotSupported(&'static str),

    /// A time widget was given something that is not a time of day.
    #[error("not a time of day (expected HH:MM): {0}")]
    InvalidTime(String),
}

/// Interaction state, shaped by the function's kind.
#[derive(Clone, Debug, PartialEq, Eq)]
enum WidgetState {
    Push,
    Toggle { on: bool },
    Input { value: String },
    Time { value: String },
}

/// One function's interaction logic.
pub struct FunctionWidget {
    function: Function,
    state: WidgetState,
}

impl FunctionWidget {
    /// Builds the widget for a function; toggles start off, held values
    /// start empty.
    pub fn new(function: Function) -> Self {
        let state = match function.kind {
            FunctionKind::Push { .. } => WidgetState::Push,
            FunctionKind::Toggle { .. } => WidgetState::Toggle { on: false },
            FunctionKind::Input => WidgetState::Input {
                value: String::new(),
            },
            FunctionKind::Time => WidgetState::Time {
                value: String::new(),
            },
        };
        Self { function, state }
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Toggle position, for front-ends that label the two states.
    pub fn is_on(&self) -> Option<bool> {
        match self.state {
            WidgetState::Toggle { on } => Some(on),
            _ => None,
        }
    }

    /// Currently held value of an input or time widget.
    pub fn held_value(&self) -> Option<&str> {
        match &self.state {
            WidgetState::Input { value } | WidgetState::Time { value } => Some(value),
            _ => None,
        }
    }

    /// Replaces the held value of an input or time widget.
    ///
    /// Time widgets only accept `HH:MM`; push and toggle widgets take no
    /// entered value at all.
    pub fn set_value(&mut self, value: String) -> Result<(), WidgetError> {
        match &mut self.state {
            WidgetState::Input { value: held } => {
                *held = value;
                Ok(())
            }
            WidgetState::Time { value: held } => {
                if NaiveTime::parse_from_str(&value, "%H:%M").is_err() {
                    return Err(WidgetError::InvalidTime(value));
                }
                *held = value;
                Ok(())
            }
            WidgetState::Push => Err(WidgetError::ValueNotSupported("push")),
            WidgetState::Toggle { .. } => Err(WidgetError::ValueNotSupported("toggle")),
        }
    }

    /// One activation: advances the state machine and returns the value to
    /// publish.
    ///
    /// A toggle flips here regardless of whether the publish that follows
    /// goes out; its state is a local assumption, not device truth.
    pub fn activate(&mut self) -> String {
        match (&mut self.state, &self.function.kind) {
            (WidgetState::Push, FunctionKind::Push { value }) => value.clone(),
            (
                WidgetState::Toggle { on },
                FunctionKind::Toggle {
                    on_value,
                    off_value,
                },
            ) => {
                *on = !*on;
                debug!("Toggle {} now {}", self.function.name, on);
                if *on {
                    on_value.clone()
                } else {
                    off_value.clone()
                }
            }
            (WidgetState::Input { value }, _) | (WidgetState::Time { value }, _) => value.clone(),
            // State is derived from the kind in `new`, so the arms above
            // are exhaustive for constructed widgets.
            _ => String::new(),
        }
    }

    /// Activates and publishes in one step.
    pub fn press(
        &mut self,
        publisher: &CommandPublisher,
        endpoint: &Endpoint,
    ) -> Result<PublishOutcome, BrokerError> {
        let value = self.activate();
        publisher.publish(endpoint, &self.function, &value)
    }
}
