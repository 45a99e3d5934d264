//! Pure projection from machine state to the render-ready snapshot.

use crate::core::{FieldKey, FieldState, FieldStatus, FormState};
use crate::machine::{FormId, Shared};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Denormalized, render-ready view of a form, recomputed from the context
/// on every change.
///
/// All boolean flags are derived purely from the reported state and the
/// context; two projections of the same machine state are identical.
#[derive(Clone, Debug, PartialEq)]
pub struct FormSnapshot<V, D, E> {
    pub id: FormId,
    /// Reported form state (`WaitingInit` normalized to `Idle`).
    pub state: FormState,
    pub values: BTreeMap<FieldKey, V>,
    pub errors: BTreeMap<FieldKey, E>,
    /// Derived per-field state for every field with a value.
    pub fields: BTreeMap<FieldKey, FieldState>,
    /// Last successful submit result.
    pub data: Option<D>,
    /// Last submit-level error.
    pub error: Option<E>,
    pub data_updated_at: Option<DateTime<Utc>>,
    pub error_updated_at: Option<DateTime<Utc>>,
    pub submit_count: u32,
    pub is_idle: bool,
    pub is_validating: bool,
    pub is_submitting: bool,
    pub is_error: bool,
    pub submitted: bool,
    /// Alias of `submitted`.
    pub is_success: bool,
    pub submitted_without_error: bool,
    pub submitted_with_error: bool,
    /// The most recent submit was rejected by validation and the error
    /// map is non-empty.
    pub validated_with_errors: bool,
}

impl<V, D, E> FormSnapshot<V, D, E> {
    /// Derived state of one field; fields never seen read as idle.
    pub fn field_state(&self, field: FieldKey) -> FieldState {
        self.fields.get(&field).copied().unwrap_or(FieldState::Idle)
    }
}

/// Project the guarded machine state into a snapshot (pure).
pub(crate) fn project<V, D, E>(id: FormId, shared: &Shared<V, D, E>) -> FormSnapshot<V, D, E>
where
    V: Clone,
    D: Clone,
    E: Clone,
{
    let context = &shared.context;
    let reported = shared.state.reported();

    let mut fields = BTreeMap::new();
    for key in context.values().keys().copied() {
        let state = if context.status(key) == FieldStatus::Validating {
            FieldState::Validating
        } else if context.errors().contains_key(&key) {
            FieldState::Failed
        } else if shared.settled.contains(&key) {
            FieldState::Success
        } else {
            FieldState::Idle
        };
        fields.insert(key, state);
    }

    let submitted = reported == FormState::Submitted;
    let is_error = reported == FormState::Error;

    FormSnapshot {
        id,
        state: reported,
        values: context.values().clone(),
        errors: context.errors().clone(),
        fields,
        data: context.data().cloned(),
        error: context.error().cloned(),
        data_updated_at: context.data_updated_at(),
        error_updated_at: context.error_updated_at(),
        submit_count: shared.submit_count,
        is_idle: reported == FormState::Idle,
        is_validating: reported == FormState::Validating,
        is_submitting: reported == FormState::Submitting,
        is_error,
        submitted,
        is_success: submitted,
        submitted_without_error: submitted && context.error().is_none(),
        submitted_with_error: is_error && context.error().is_some(),
        validated_with_errors: reported == FormState::Idle
            && shared.log.last_sweep_rejected()
            && !context.errors().is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FormContext, LoggedTransition, StateLog, TransitionCause};
    use std::collections::BTreeSet;

    const NAME: FieldKey = FieldKey::new("name");
    const EMAIL: FieldKey = FieldKey::new("email");

    fn shared(state: FormState) -> Shared<String, u32, &'static str> {
        let mut values = BTreeMap::new();
        values.insert(NAME, String::new());
        values.insert(EMAIL, "a@b".to_string());
        Shared {
            context: FormContext::new(values),
            state,
            log: StateLog::new(),
            tickets: BTreeMap::new(),
            settled: BTreeSet::new(),
            epoch: 0,
            submit_count: 0,
        }
    }

    #[test]
    fn projection_is_deterministic() {
        let id = FormId::new();
        let machine = shared(FormState::Idle);
        assert_eq!(project(id, &machine), project(id, &machine));
    }

    #[test]
    fn waiting_init_projects_as_idle() {
        let snapshot = project(FormId::new(), &shared(FormState::WaitingInit));
        assert_eq!(snapshot.state, FormState::Idle);
        assert!(snapshot.is_idle);
    }

    #[test]
    fn exactly_one_state_flag_is_set() {
        for state in [
            FormState::Idle,
            FormState::Validating,
            FormState::Submitting,
            FormState::Submitted,
            FormState::Error,
        ] {
            let snapshot = project(FormId::new(), &shared(state));
            let flags = [
                snapshot.is_idle,
                snapshot.is_validating,
                snapshot.is_submitting,
                snapshot.submitted,
                snapshot.is_error,
            ];
            assert_eq!(flags.iter().filter(|flag| **flag).count(), 1, "{state}");
        }
    }

    #[test]
    fn is_success_aliases_submitted() {
        let mut machine = shared(FormState::Submitted);
        machine.context.record_submit_success(42);
        let snapshot = project(FormId::new(), &machine);
        assert!(snapshot.submitted);
        assert!(snapshot.is_success);
        assert!(snapshot.submitted_without_error);
        assert!(!snapshot.submitted_with_error);
    }

    #[test]
    fn submitted_with_error_requires_error_state_and_payload() {
        let mut machine = shared(FormState::Error);
        machine.context.record_submit_failure("backend down");
        let snapshot = project(FormId::new(), &machine);
        assert!(snapshot.submitted_with_error);
        assert!(!snapshot.submitted_without_error);
        assert_eq!(snapshot.error, Some("backend down"));
    }

    #[test]
    fn field_states_fold_status_errors_and_settlement() {
        let mut machine = shared(FormState::Idle);
        machine.context.set_status(NAME, FieldStatus::Validating);
        machine.context.settle_field(EMAIL, Err("invalid"));
        let snapshot = project(FormId::new(), &machine);

        assert_eq!(snapshot.field_state(NAME), FieldState::Validating);
        assert_eq!(snapshot.field_state(EMAIL), FieldState::Failed);
        assert_eq!(
            snapshot.field_state(FieldKey::new("missing")),
            FieldState::Idle
        );
    }

    #[test]
    fn settled_clean_field_reads_success() {
        let mut machine = shared(FormState::Idle);
        machine.context.settle_field(NAME, Ok(()));
        machine.settled.insert(NAME);
        let snapshot = project(FormId::new(), &machine);
        assert_eq!(snapshot.field_state(NAME), FieldState::Success);
    }

    #[test]
    fn validated_with_errors_needs_rejection_and_errors() {
        let rejected = LoggedTransition {
            from: FormState::Validating,
            to: FormState::Idle,
            cause: TransitionCause::ValidationRejected,
            timestamp: Utc::now(),
            submit_attempt: 1,
        };

        let mut machine = shared(FormState::Idle);
        machine.log = machine.log.record(rejected);
        assert!(!project(FormId::new(), &machine).validated_with_errors);

        machine.context.settle_field(NAME, Err("required"));
        assert!(project(FormId::new(), &machine).validated_with_errors);

        let cancelled = LoggedTransition {
            cause: TransitionCause::Cancelled,
            ..rejected
        };
        machine.log = StateLog::new().record(cancelled);
        assert!(!project(FormId::new(), &machine).validated_with_errors);
    }
}
