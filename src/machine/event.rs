//! The event alphabet driving the form machine.

use crate::core::FieldKey;

/// External events accepted by the orchestrator.
///
/// Every event is applied synchronously; `ChangeWithValidate`, `Validate`
/// and `Submit` additionally start an asynchronous operation whose
/// completion re-enters the machine through a staleness-checked apply step.
#[derive(Clone, Debug)]
pub enum FormEvent<V> {
    /// Write a field value. Never triggers validation and never changes
    /// the form-wide state.
    Change { field: FieldKey, value: V },
    /// Write a field value and validate it, superseding any older
    /// outstanding validation request for the same field.
    ChangeWithValidate { field: FieldKey, value: V },
    /// Validate the field's current value without changing it.
    Validate { field: FieldKey },
    /// Declared-field-checked variant of `Change`; an unknown field is
    /// logged and not applied.
    Set { field: FieldKey, value: V },
    /// Validate every non-ignored field, then run the submit executor.
    Submit { ignore: Vec<FieldKey> },
    /// Abort the in-flight validation sweep or submit, if any.
    Cancel,
}

impl<V> FormEvent<V> {
    /// A submit that validates every declared field.
    pub fn submit() -> Self {
        Self::Submit { ignore: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_shorthand_ignores_nothing() {
        let event: FormEvent<String> = FormEvent::submit();
        match event {
            FormEvent::Submit { ignore } => assert!(ignore.is_empty()),
            other => panic!("expected Submit, got {other:?}"),
        }
    }
}
