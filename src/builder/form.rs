//! Builder for constructing forms.

use crate::builder::error::BuildError;
use crate::builder::field::{FieldBuilder, FieldSpec};
use crate::core::FieldKey;
use crate::machine::{sync_executor, Form, SharedExecutor, SubmitExecutor};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builder for constructing forms with a fluent API.
///
/// A submit executor is required; fields are optional (a form with no
/// schema fields still supports the value/Change flow but generates no
/// handlers).
pub struct FormBuilder<V, D, E, Env> {
    fields: Vec<FieldSpec<V, E, Env>>,
    executor: Option<SharedExecutor<V, D, E, Env>>,
}

impl<V, D, E, Env> FormBuilder<V, D, E, Env>
where
    V: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    Env: Clone + Send + Sync + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            executor: None,
        }
    }

    /// Declare a field using a builder.
    /// Returns an error if the builder fails validation.
    pub fn field(mut self, field: FieldBuilder<V, E, Env>) -> Result<Self, BuildError> {
        let spec = field.build()?;
        self.fields.push(spec);
        Ok(self)
    }

    /// Declare a pre-built field.
    pub fn add_field(mut self, spec: FieldSpec<V, E, Env>) -> Self {
        self.fields.push(spec);
        self
    }

    /// Set the submit executor (required).
    pub fn on_submit<X>(mut self, executor: X) -> Self
    where
        X: SubmitExecutor<V, D, E, Env> + 'static,
    {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Set a synchronous submit function as the executor.
    pub fn on_submit_with<F>(self, f: F) -> Self
    where
        F: Fn(&BTreeMap<FieldKey, V>) -> Result<D, E> + Send + Sync + 'static,
    {
        self.on_submit(sync_executor(f))
    }

    /// Build the form.
    /// Returns an error if required configuration is missing.
    pub fn build(self) -> Result<Form<V, D, E, Env>, BuildError> {
        let executor = self.executor.ok_or(BuildError::MissingSubmitExecutor)?;

        let mut declared = Vec::with_capacity(self.fields.len());
        let mut initial_values = BTreeMap::new();
        let mut validators = BTreeMap::new();
        for spec in self.fields {
            if initial_values.contains_key(&spec.key) {
                return Err(BuildError::DuplicateField(spec.key));
            }
            declared.push(spec.key);
            initial_values.insert(spec.key, spec.initial);
            if let Some(validator) = spec.validator {
                validators.insert(spec.key, validator);
            }
        }

        Ok(Form::assemble(declared, initial_values, validators, executor))
    }
}

impl<V, D, E, Env> Default for FormBuilder<V, D, E, Env>
where
    V: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    Env: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
