//! Guided decision wizards.
//!
//! Each wizard is a small state machine: answers are submitted one step at a
//! time, out-of-order submissions are rejected, and the final step yields a
//! [`WizardOutcome`] carrying the determination and a rationale suitable for
//! pasting into the case record. Wizard values hold no state beyond their
//! own lifetime.

mod capacity;
mod nearest_relative;
mod responsibility;

pub use capacity::*;
pub use nearest_relative::*;
pub use responsibility::*;

use thiserror::Error;

/// Wizard errors.
#[derive(Error, Debug, PartialEq)]
pub enum WizardError {
    #[error("Cannot {action} at step {step}")]
    InvalidStep { action: &'static str, step: String },

    #[error("Missing answer: {0}")]
    MissingAnswer(&'static str),
}

pub type WizardResult<T> = Result<T, WizardError>;

/// A determination and the human-readable reasoning behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardOutcome<T> {
    pub result: T,
    pub rationale: String,
}

fn yes_no(answer: bool) -> &'static str {
    if answer {
        "YES"
    } else {
        "NO"
    }
}

fn require_text(value: &str, what: &'static str) -> WizardResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WizardError::MissingAnswer(what));
    }
    Ok(trimmed.to_string())
}
