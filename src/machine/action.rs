//! Effectful seams between the orchestrator and its external collaborators.
//!
//! Validation and submission are the machine's two suspension points. Both
//! are represented as effect factories so the orchestrator stays oblivious
//! to how the work is performed: it builds the effect, runs it against the
//! caller's environment, and feeds the outcome back through a staleness
//! check.

use crate::core::FieldKey;
use std::collections::BTreeMap;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;

/// Field validation unit: maps a field's value to pass/fail.
///
/// Implementations must not mutate shared state and must be idempotent for
/// identical inputs. An effect-channel failure is treated exactly like a
/// returned validation error. Fields without a validator are always valid.
///
/// The trait is blanket-implemented for closures returning effects, and
/// [`sync_validator`] lifts a plain `Fn(&V) -> Result<(), E>` into the
/// effect seam.
pub trait Validate<V, E, Env>: Send + Sync {
    fn validate(&self, value: &V) -> BoxedEffect<(), E, Env>;
}

impl<V, E, Env, F> Validate<V, E, Env> for F
where
    F: Fn(&V) -> BoxedEffect<(), E, Env> + Send + Sync,
{
    fn validate(&self, value: &V) -> BoxedEffect<(), E, Env> {
        (self)(value)
    }
}

/// Submit executor: produces the submit result from the full value
/// snapshot, or fails with a form-level error.
///
/// The orchestrator invokes it at most once per submit attempt and never
/// retries on failure; retry is a second submit dispatch by the caller.
pub trait SubmitExecutor<V, D, E, Env>: Send + Sync {
    fn execute(&self, values: &BTreeMap<FieldKey, V>) -> BoxedEffect<D, E, Env>;
}

impl<V, D, E, Env, F> SubmitExecutor<V, D, E, Env> for F
where
    F: Fn(&BTreeMap<FieldKey, V>) -> BoxedEffect<D, E, Env> + Send + Sync,
{
    fn execute(&self, values: &BTreeMap<FieldKey, V>) -> BoxedEffect<D, E, Env> {
        (self)(values)
    }
}

pub(crate) type SharedValidator<V, E, Env> = Arc<dyn Validate<V, E, Env>>;
pub(crate) type SharedExecutor<V, D, E, Env> = Arc<dyn SubmitExecutor<V, D, E, Env>>;

/// Lift a synchronous validation function into the effect seam.
///
/// The function runs when the effect runs, not when it is built.
///
/// # Example
///
/// ```rust
/// use formwork::sync_validator;
/// use formwork::Validate;
///
/// let required = sync_validator::<String, &'static str, (), _>(|value| {
///     if value.is_empty() { Err("required") } else { Ok(()) }
/// });
/// let _effect = required.validate(&"Ada".to_string());
/// ```
pub fn sync_validator<V, E, Env, F>(f: F) -> impl Validate<V, E, Env>
where
    V: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
    Env: Clone + Send + Sync + 'static,
    F: Fn(&V) -> Result<(), E> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    move |value: &V| {
        let f = Arc::clone(&f);
        let value = value.clone();
        from_fn(move |_env: &Env| f(&value)).boxed()
    }
}

/// Lift a synchronous submit function into the effect seam.
pub fn sync_executor<V, D, E, Env, F>(f: F) -> impl SubmitExecutor<V, D, E, Env>
where
    V: Clone + Send + Sync + 'static,
    D: Send + Sync + 'static,
    E: Send + Sync + 'static,
    Env: Clone + Send + Sync + 'static,
    F: Fn(&BTreeMap<FieldKey, V>) -> Result<D, E> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    move |values: &BTreeMap<FieldKey, V>| {
        let f = Arc::clone(&f);
        let values = values.clone();
        from_fn(move |_env: &Env| f(&values)).boxed()
    }
}
