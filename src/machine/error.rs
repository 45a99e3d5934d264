//! Errors reported by the form orchestrator.

use crate::core::FormState;
use thiserror::Error;

/// Errors that can occur while driving a form.
///
/// These are control-surface misuse and infrastructure signals; field
/// validation errors and submit errors are caller-defined payloads that
/// live in the form context, never here.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("form submit is already in progress")]
    AlreadySubmitting,

    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),

    #[error("transition from '{from}' to '{to}' is not permitted")]
    InvalidTransition { from: FormState, to: FormState },
}

pub type FormResult<T> = Result<T, FormError>;
