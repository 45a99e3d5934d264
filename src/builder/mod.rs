//! Builder API for ergonomic form construction.
//!
//! This module provides fluent builders and macros for creating forms
//! with minimal boilerplate while maintaining type safety.

pub mod error;
pub mod field;
pub mod form;
pub mod macros;

pub use error::BuildError;
pub use field::{FieldBuilder, FieldSpec};
pub use form::FormBuilder;
