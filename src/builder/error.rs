//! Build errors for form and field builders.

use crate::core::FieldKey;
use thiserror::Error;

/// Errors that can occur when building forms and fields.
///
/// Construction is the only surface where misuse is an error; at runtime
/// misuse degrades to development-mode log warnings.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Submit executor not specified. Call .on_submit(executor) before .build()")]
    MissingSubmitExecutor,

    #[error("Field '{0}' has no initial value. Call .initial(value) before .build()")]
    MissingInitialValue(FieldKey),

    #[error("Field '{0}' is declared more than once")]
    DuplicateField(FieldKey),
}
