//! Immutable log of form lifecycle transitions.
//!
//! The log is how "previous state" questions are answered without a
//! combinatorial history flag: classification of the current state (for
//! example, idle-because-validation-rejected) reads the most recent
//! transition and its cause instead of a separate one-slot marker.

use super::state::FormState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why a lifecycle transition happened.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TransitionCause {
    /// Initial context write at construction.
    Init,
    /// A submit was dispatched and the validation sweep started.
    SubmitRequested,
    /// The validation sweep rejected the submit.
    ValidationRejected,
    /// The validation sweep passed and the executor was invoked.
    ValidationPassed,
    /// The submit executor resolved successfully.
    SubmitSucceeded,
    /// The submit executor failed.
    SubmitFailed,
    /// The in-flight operation was cancelled.
    Cancelled,
    /// The form was reset to its initial values.
    Reset,
}

/// Record of a single lifecycle transition.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LoggedTransition {
    /// The state being transitioned from
    pub from: FormState,
    /// The state being transitioned to
    pub to: FormState,
    /// Why the transition happened
    pub cause: TransitionCause,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// The submit attempt counter at the time of the transition
    pub submit_attempt: u32,
}

/// Ordered history of lifecycle transitions.
///
/// The log is immutable: [`StateLog::record`] returns a new log with the
/// transition appended, leaving the original unchanged.
///
/// # Example
///
/// ```rust
/// use formwork::core::{LoggedTransition, StateLog, TransitionCause};
/// use formwork::FormState;
/// use chrono::Utc;
///
/// let log = StateLog::new().record(LoggedTransition {
///     from: FormState::Idle,
///     to: FormState::Validating,
///     cause: TransitionCause::SubmitRequested,
///     timestamp: Utc::now(),
///     submit_attempt: 1,
/// });
///
/// assert_eq!(log.path(), vec![FormState::Idle, FormState::Validating]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateLog {
    transitions: Vec<LoggedTransition>,
}

impl StateLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new log (pure).
    pub fn record(&self, transition: LoggedTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// All recorded transitions in order.
    pub fn transitions(&self) -> &[LoggedTransition] {
        &self.transitions
    }

    /// The most recent transition, if any.
    pub fn last(&self) -> Option<&LoggedTransition> {
        self.transitions.last()
    }

    /// The path of states traversed: the initial state, then the target of
    /// each transition.
    pub fn path(&self) -> Vec<FormState> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from);
        }
        for transition in &self.transitions {
            path.push(transition.to);
        }
        path
    }

    /// Total duration from first to last transition, `None` when the log
    /// is empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Whether the most recent transition was a validation sweep rejecting
    /// a submit. Together with a non-empty error map this classifies the
    /// form as validated-with-errors; a cancelled sweep does not qualify.
    pub fn last_sweep_rejected(&self) -> bool {
        matches!(
            self.last(),
            Some(LoggedTransition {
                to: FormState::Idle,
                cause: TransitionCause::ValidationRejected,
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(from: FormState, to: FormState, cause: TransitionCause) -> LoggedTransition {
        LoggedTransition {
            from,
            to,
            cause,
            timestamp: Utc::now(),
            submit_attempt: 1,
        }
    }

    #[test]
    fn new_log_is_empty() {
        let log = StateLog::new();
        assert!(log.transitions().is_empty());
        assert!(log.path().is_empty());
        assert!(log.duration().is_none());
        assert!(log.last().is_none());
    }

    #[test]
    fn record_is_pure() {
        let log = StateLog::new();
        let recorded = log.record(step(
            FormState::Idle,
            FormState::Validating,
            TransitionCause::SubmitRequested,
        ));
        assert!(log.transitions().is_empty());
        assert_eq!(recorded.transitions().len(), 1);
    }

    #[test]
    fn path_returns_state_sequence() {
        let log = StateLog::new()
            .record(step(
                FormState::WaitingInit,
                FormState::Idle,
                TransitionCause::Init,
            ))
            .record(step(
                FormState::Idle,
                FormState::Validating,
                TransitionCause::SubmitRequested,
            ))
            .record(step(
                FormState::Validating,
                FormState::Submitting,
                TransitionCause::ValidationPassed,
            ));

        assert_eq!(
            log.path(),
            vec![
                FormState::WaitingInit,
                FormState::Idle,
                FormState::Validating,
                FormState::Submitting,
            ]
        );
    }

    #[test]
    fn rejected_sweep_is_classified_from_the_last_transition() {
        let rejected = StateLog::new()
            .record(step(
                FormState::Idle,
                FormState::Validating,
                TransitionCause::SubmitRequested,
            ))
            .record(step(
                FormState::Validating,
                FormState::Idle,
                TransitionCause::ValidationRejected,
            ));
        assert!(rejected.last_sweep_rejected());
    }

    #[test]
    fn cancelled_sweep_does_not_classify_as_rejected() {
        let cancelled = StateLog::new()
            .record(step(
                FormState::Idle,
                FormState::Validating,
                TransitionCause::SubmitRequested,
            ))
            .record(step(
                FormState::Validating,
                FormState::Idle,
                TransitionCause::Cancelled,
            ));
        assert!(!cancelled.last_sweep_rejected());
    }

    #[test]
    fn classification_is_overwritten_by_later_transitions() {
        let resubmitted = StateLog::new()
            .record(step(
                FormState::Validating,
                FormState::Idle,
                TransitionCause::ValidationRejected,
            ))
            .record(step(
                FormState::Idle,
                FormState::Validating,
                TransitionCause::SubmitRequested,
            ));
        assert!(!resubmitted.last_sweep_rejected());
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let log = StateLog::new()
            .record(LoggedTransition {
                from: FormState::Idle,
                to: FormState::Validating,
                cause: TransitionCause::SubmitRequested,
                timestamp: start,
                submit_attempt: 1,
            })
            .record(LoggedTransition {
                from: FormState::Validating,
                to: FormState::Submitting,
                cause: TransitionCause::ValidationPassed,
                timestamp: start + chrono::Duration::milliseconds(25),
                submit_attempt: 1,
            });

        assert_eq!(log.duration(), Some(Duration::from_millis(25)));
    }

    #[test]
    fn log_serializes_correctly() {
        let log = StateLog::new().record(step(
            FormState::Idle,
            FormState::Validating,
            TransitionCause::SubmitRequested,
        ));
        let json = serde_json::to_string(&log).unwrap();
        let deserialized: StateLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log.transitions().len(), deserialized.transitions().len());
    }
}
