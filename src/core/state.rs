//! Form-level and field-level state enums.
//!
//! The form lifecycle is a flat set of mutually exclusive states; the
//! per-field validation status lives in a side mapping rather than being
//! folded into the form state, avoiding a combinatorial explosion of
//! joint states.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Form-wide lifecycle state.
///
/// States are mutually exclusive. `WaitingInit` exists only between
/// construction and the first context write and is reported to observers
/// as `Idle` (see [`FormState::reported`]).
///
/// # Example
///
/// ```rust
/// use formwork::FormState;
///
/// let state = FormState::WaitingInit;
/// assert_eq!(state.reported(), FormState::Idle);
/// assert_eq!(FormState::Submitting.name(), "Submitting");
/// assert!(FormState::Error.is_error());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum FormState {
    /// Context not yet initialized; never reported to observers.
    WaitingInit,
    /// No form-wide operation in flight.
    Idle,
    /// A submit-triggered validation sweep is running.
    Validating,
    /// Exactly one submit executor invocation is outstanding.
    Submitting,
    /// The most recent submit attempt succeeded.
    Submitted,
    /// The most recent submit attempt failed. Resumable by re-submitting.
    Error,
}

impl FormState {
    /// Get the state's name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::WaitingInit => "WaitingInit",
            Self::Idle => "Idle",
            Self::Validating => "Validating",
            Self::Submitting => "Submitting",
            Self::Submitted => "Submitted",
            Self::Error => "Error",
        }
    }

    /// The state as reported to observers, with `WaitingInit` normalized
    /// to `Idle`.
    pub fn reported(&self) -> FormState {
        match self {
            Self::WaitingInit => Self::Idle,
            other => *other,
        }
    }

    /// Check if this is the error state.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Check if a form-wide async operation is outstanding in this state.
    pub fn has_operation_in_flight(&self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }
}

impl Display for FormState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-field validation status, tracked in a side mapping keyed by field.
///
/// `Validating` means a validation request for the field is in flight and
/// its result has not yet been applied or discarded.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum FieldStatus {
    #[default]
    Idle,
    Validating,
}

/// Derived per-field state as exposed through snapshots and bindings.
///
/// Unlike [`FieldStatus`], this folds in the error map and settlement
/// history: a field that has settled a validation cleanly reads `Success`,
/// one with a recorded error reads `Failed`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum FieldState {
    /// No validation has ever settled for this field.
    Idle,
    /// A validation request is in flight.
    Validating,
    /// The most recent settled validation passed.
    Success,
    /// The most recent settled validation failed.
    Failed,
}

impl FieldState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Validating => "Validating",
            Self::Success => "Success",
            Self::Failed => "Failed",
        }
    }
}

impl Display for FieldState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_returns_correct_value() {
        assert_eq!(FormState::WaitingInit.name(), "WaitingInit");
        assert_eq!(FormState::Idle.name(), "Idle");
        assert_eq!(FormState::Validating.name(), "Validating");
        assert_eq!(FormState::Submitting.name(), "Submitting");
        assert_eq!(FormState::Submitted.name(), "Submitted");
        assert_eq!(FormState::Error.name(), "Error");
    }

    #[test]
    fn waiting_init_is_reported_as_idle() {
        assert_eq!(FormState::WaitingInit.reported(), FormState::Idle);
    }

    #[test]
    fn other_states_report_themselves() {
        for state in [
            FormState::Idle,
            FormState::Validating,
            FormState::Submitting,
            FormState::Submitted,
            FormState::Error,
        ] {
            assert_eq!(state.reported(), state);
        }
    }

    #[test]
    fn is_error_identifies_error_state() {
        assert!(FormState::Error.is_error());
        assert!(!FormState::Submitted.is_error());
        assert!(!FormState::Idle.is_error());
    }

    #[test]
    fn in_flight_states_are_validating_and_submitting() {
        assert!(FormState::Validating.has_operation_in_flight());
        assert!(FormState::Submitting.has_operation_in_flight());
        assert!(!FormState::Idle.has_operation_in_flight());
        assert!(!FormState::Submitted.has_operation_in_flight());
        assert!(!FormState::Error.has_operation_in_flight());
        assert!(!FormState::WaitingInit.has_operation_in_flight());
    }

    #[test]
    fn field_status_defaults_to_idle() {
        assert_eq!(FieldStatus::default(), FieldStatus::Idle);
    }

    #[test]
    fn state_serializes_correctly() {
        let state = FormState::Validating;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: FormState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }

    #[test]
    fn field_state_display_matches_name() {
        assert_eq!(FieldState::Failed.to_string(), "Failed");
        assert_eq!(FieldState::Success.to_string(), "Success");
    }
}
