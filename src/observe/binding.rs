//! Per-field handler objects handed to subscribers.

use crate::core::{FieldKey, FieldState, ValidationTicket};
use crate::machine::{Form, FormResult};
use std::collections::BTreeMap;

/// Handler object for one schema field.
///
/// Carries the field's state, value and error as of the snapshot it was
/// generated with, plus dispatch methods wired back into the owning form.
/// Bindings are cheap to clone and may outlive the notification that
/// delivered them.
pub struct FieldBinding<V, D, E, Env> {
    form: Form<V, D, E, Env>,
    key: FieldKey,
    state: FieldState,
    value: V,
    error: Option<E>,
}

impl<V, D, E, Env> FieldBinding<V, D, E, Env>
where
    V: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    Env: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        form: Form<V, D, E, Env>,
        key: FieldKey,
        state: FieldState,
        value: V,
        error: Option<E>,
    ) -> Self {
        Self {
            form,
            key,
            state,
            value,
            error,
        }
    }

    pub fn key(&self) -> FieldKey {
        self.key
    }

    /// The field's validity/validating state as of the snapshot.
    pub fn state(&self) -> FieldState {
        self.state
    }

    /// The field's value as of the snapshot.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The field's validation error as of the snapshot.
    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    /// Dispatch a `Change` for this field.
    pub fn set(&self, value: V) -> FormResult<()> {
        self.form.set(self.key, value)
    }

    /// Dispatch a `ChangeWithValidate` for this field.
    pub async fn set_with_validate(&self, value: V, env: &Env) -> FormResult<ValidationTicket> {
        self.form.set_field_with_validate(self.key, value, env).await
    }

    /// Re-validate the field's current value.
    pub async fn validate(&self, env: &Env) -> FormResult<Option<ValidationTicket>> {
        self.form.validate_field(self.key, env).await
    }
}

impl<V, D, E, Env> Clone for FieldBinding<V, D, E, Env>
where
    V: Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            form: self.form.clone(),
            key: self.key,
            state: self.state,
            value: self.value.clone(),
            error: self.error.clone(),
        }
    }
}

/// The generated handler set: one [`FieldBinding`] per schema field.
pub struct FieldBindings<V, D, E, Env> {
    entries: BTreeMap<FieldKey, FieldBinding<V, D, E, Env>>,
}

impl<V, D, E, Env> FieldBindings<V, D, E, Env> {
    pub(crate) fn new(entries: BTreeMap<FieldKey, FieldBinding<V, D, E, Env>>) -> Self {
        Self { entries }
    }

    pub(crate) fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: FieldKey) -> Option<&FieldBinding<V, D, E, Env>> {
        self.entries.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldBinding<V, D, E, Env>)> {
        self.entries.iter().map(|(key, binding)| (*key, binding))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
