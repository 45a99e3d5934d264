//! Builder for declaring form fields.

use crate::builder::error::BuildError;
use crate::core::FieldKey;
use crate::machine::{sync_validator, SharedValidator, Validate};
use std::sync::Arc;

/// One declared field: its key, initial value and optional validator.
///
/// A field without a validator participates in the value flow but is
/// always considered valid and generates no handler.
pub struct FieldSpec<V, E, Env> {
    pub(crate) key: FieldKey,
    pub(crate) initial: V,
    pub(crate) validator: Option<SharedValidator<V, E, Env>>,
}

/// Builder for declaring fields with a fluent API.
pub struct FieldBuilder<V, E, Env> {
    key: FieldKey,
    initial: Option<V>,
    validator: Option<SharedValidator<V, E, Env>>,
}

impl<V, E, Env> FieldBuilder<V, E, Env>
where
    V: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
    Env: Clone + Send + Sync + 'static,
{
    /// Create a builder for the field (required: key).
    pub fn new(key: FieldKey) -> Self {
        Self {
            key,
            initial: None,
            validator: None,
        }
    }

    /// Set the field's initial value (required).
    pub fn initial(mut self, value: V) -> Self {
        self.initial = Some(value);
        self
    }

    /// Attach a validator (optional). This makes the field a schema field:
    /// it is validated on submit and gets a generated handler.
    pub fn validate<X>(mut self, validator: X) -> Self
    where
        X: Validate<V, E, Env> + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Attach a synchronous validation function (optional).
    pub fn validate_with<F>(self, f: F) -> Self
    where
        F: Fn(&V) -> Result<(), E> + Send + Sync + 'static,
    {
        self.validate(sync_validator(f))
    }

    /// Build the field spec.
    pub fn build(self) -> Result<FieldSpec<V, E, Env>, BuildError> {
        let initial = self
            .initial
            .ok_or(BuildError::MissingInitialValue(self.key))?;
        Ok(FieldSpec {
            key: self.key,
            initial,
            validator: self.validator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: FieldKey = FieldKey::new("name");

    #[test]
    fn builder_requires_an_initial_value() {
        let result = FieldBuilder::<String, &'static str, ()>::new(NAME).build();
        assert!(matches!(result, Err(BuildError::MissingInitialValue(key)) if key == NAME));
    }

    #[test]
    fn fluent_api_builds_a_plain_field() {
        let spec = FieldBuilder::<String, &'static str, ()>::new(NAME)
            .initial("Ada".to_string())
            .build()
            .unwrap();

        assert_eq!(spec.key, NAME);
        assert_eq!(spec.initial, "Ada");
        assert!(spec.validator.is_none());
    }

    #[test]
    fn validate_with_attaches_a_schema_entry() {
        let spec = FieldBuilder::<String, &'static str, ()>::new(NAME)
            .initial(String::new())
            .validate_with(|value: &String| {
                if value.is_empty() {
                    Err("required")
                } else {
                    Ok(())
                }
            })
            .build()
            .unwrap();

        assert!(spec.validator.is_some());
    }
}
