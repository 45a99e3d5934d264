//! The authoritative form context record.

use super::field::FieldKey;
use super::state::FieldStatus;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Single mutable record holding everything the orchestrator owns: the
/// value map, the per-field error map, per-field validation statuses, and
/// the outcome of the most recent submit attempt.
///
/// The context is created once per form instance, mutated only by the
/// orchestrator's event handling, and read by the projection layer. Value
/// keys are a superset of the declared fields at all times; fields are
/// never removed once initialized.
#[derive(Clone, Debug)]
pub struct FormContext<V, D, E> {
    pub(crate) values: BTreeMap<FieldKey, V>,
    pub(crate) errors: BTreeMap<FieldKey, E>,
    pub(crate) field_status: BTreeMap<FieldKey, FieldStatus>,
    pub(crate) data: Option<D>,
    pub(crate) error: Option<E>,
    pub(crate) data_updated_at: Option<DateTime<Utc>>,
    pub(crate) error_updated_at: Option<DateTime<Utc>>,
}

impl<V, D, E> FormContext<V, D, E> {
    /// Create a context from the caller-supplied initial values.
    pub fn new(values: BTreeMap<FieldKey, V>) -> Self {
        Self {
            values,
            errors: BTreeMap::new(),
            field_status: BTreeMap::new(),
            data: None,
            error: None,
            data_updated_at: None,
            error_updated_at: None,
        }
    }

    /// Current value map.
    pub fn values(&self) -> &BTreeMap<FieldKey, V> {
        &self.values
    }

    /// Last validation error per field. Absence means no error.
    pub fn errors(&self) -> &BTreeMap<FieldKey, E> {
        &self.errors
    }

    /// Per-field validation status; fields without an entry are idle.
    pub fn status(&self, field: FieldKey) -> FieldStatus {
        self.field_status.get(&field).copied().unwrap_or_default()
    }

    /// Last successful submit result.
    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    /// Last submit-level error (distinct from field errors).
    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    pub fn data_updated_at(&self) -> Option<DateTime<Utc>> {
        self.data_updated_at
    }

    pub fn error_updated_at(&self) -> Option<DateTime<Utc>> {
        self.error_updated_at
    }

    pub(crate) fn set_status(&mut self, field: FieldKey, status: FieldStatus) {
        self.field_status.insert(field, status);
    }

    /// Record the outcome of one field's settled validation: an `Err` is
    /// stored verbatim, an `Ok` clears any previous error for the field.
    pub(crate) fn settle_field(&mut self, field: FieldKey, result: Result<(), E>) {
        self.set_status(field, FieldStatus::Idle);
        match result {
            Ok(()) => {
                self.errors.remove(&field);
            }
            Err(error) => {
                self.errors.insert(field, error);
            }
        }
    }

    /// Record a successful submit. `data` and `error` are mutually
    /// exclusive outcomes of the same attempt, so the error slot is
    /// cleared before the result is written.
    pub(crate) fn record_submit_success(&mut self, data: D) {
        self.error = None;
        self.data = Some(data);
        self.data_updated_at = Some(Utc::now());
    }

    /// Record a failed submit, clearing the data slot first.
    pub(crate) fn record_submit_failure(&mut self, error: E) {
        self.data = None;
        self.error = Some(error);
        self.error_updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: FieldKey = FieldKey::new("name");
    const EMAIL: FieldKey = FieldKey::new("email");

    fn context() -> FormContext<String, u32, &'static str> {
        let mut values = BTreeMap::new();
        values.insert(NAME, String::new());
        values.insert(EMAIL, "a@b".to_string());
        FormContext::new(values)
    }

    #[test]
    fn new_context_has_no_errors_or_outcome() {
        let ctx = context();
        assert_eq!(ctx.values().len(), 2);
        assert!(ctx.errors().is_empty());
        assert!(ctx.data().is_none());
        assert!(ctx.error().is_none());
        assert!(ctx.data_updated_at().is_none());
        assert!(ctx.error_updated_at().is_none());
    }

    #[test]
    fn status_defaults_to_idle() {
        let ctx = context();
        assert_eq!(ctx.status(NAME), FieldStatus::Idle);
    }

    #[test]
    fn settle_field_stores_error_verbatim() {
        let mut ctx = context();
        ctx.set_status(NAME, FieldStatus::Validating);
        ctx.settle_field(NAME, Err("required"));
        assert_eq!(ctx.errors().get(&NAME), Some(&"required"));
        assert_eq!(ctx.status(NAME), FieldStatus::Idle);
    }

    #[test]
    fn settle_field_clears_previous_error_on_success() {
        let mut ctx = context();
        ctx.settle_field(NAME, Err("required"));
        ctx.settle_field(NAME, Ok(()));
        assert!(ctx.errors().get(&NAME).is_none());
    }

    #[test]
    fn settle_field_leaves_other_fields_untouched() {
        let mut ctx = context();
        ctx.settle_field(EMAIL, Err("invalid"));
        ctx.settle_field(NAME, Ok(()));
        assert_eq!(ctx.errors().get(&EMAIL), Some(&"invalid"));
    }

    #[test]
    fn submit_success_clears_error_slot() {
        let mut ctx = context();
        ctx.record_submit_failure("boom");
        assert!(ctx.error_updated_at().is_some());

        ctx.record_submit_success(42);
        assert_eq!(ctx.data(), Some(&42));
        assert!(ctx.error().is_none());
        assert!(ctx.data_updated_at().is_some());
    }

    #[test]
    fn submit_failure_clears_data_slot() {
        let mut ctx = context();
        ctx.record_submit_success(42);
        ctx.record_submit_failure("boom");
        assert!(ctx.data().is_none());
        assert_eq!(ctx.error(), Some(&"boom"));
    }
}
