//! Formwork: a form lifecycle state machine library
//!
//! Formwork manages the lifecycle of a structured multi-field form:
//! per-field values, per-field validation errors, and form-wide submission
//! state, driven by a finite set of events. It follows the "pure core, imperative shell"
//! philosophy: state enums, the context record, the transition-permission
//! table and the projection are pure functions, while validation and
//! submission run as suspended Stillwater effects whose completion
//! re-enters the machine through staleness-checked apply steps.
//!
//! # Core Concepts
//!
//! - **Form**: the orchestrator owning the authoritative context
//! - **Events**: `Change`, `ChangeWithValidate`, `Validate`, `Set`,
//!   `Submit`, `Cancel`
//! - **Snapshots**: deterministic, denormalized views recomputed on every
//!   context change and broadcast to subscribers with per-field handlers
//! - **Tickets**: per-field monotonically increasing request counters that
//!   keep stale validation results from overwriting fresher state
//!
//! # Example
//!
//! ```rust
//! use formwork::{field_keys, FieldBuilder, Form};
//!
//! field_keys! {
//!     pub NAME = "name";
//! }
//!
//! let form: Form<String, u32, &'static str, ()> = Form::builder()
//!     .field(FieldBuilder::new(NAME).initial(String::new()).validate_with(
//!         |value: &String| if value.is_empty() { Err("required") } else { Ok(()) },
//!     ))?
//!     .on_submit_with(|_values| Ok(42))
//!     .build()?;
//!
//! let subscription = form.subscribe(|snapshot, handlers| {
//!     let _ = (snapshot.is_submitting, handlers.get(NAME));
//! })?;
//!
//! form.set_field(NAME, "Ada".to_string())?;
//! assert!(form.snapshot()?.is_idle);
//! subscription.unsubscribe();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod core;
pub mod machine;
pub mod observe;

// Re-export commonly used types
pub use builder::{BuildError, FieldBuilder, FieldSpec, FormBuilder};
pub use core::{
    FieldKey, FieldState, FieldStatus, FormContext, FormState, StateLog, TransitionCause,
    ValidationTicket,
};
pub use machine::{
    sync_executor, sync_validator, Form, FormError, FormEvent, FormId, FormResult, SubmitExecutor,
    Validate,
};
pub use observe::{FieldBinding, FieldBindings, FormSnapshot, Subscription};
