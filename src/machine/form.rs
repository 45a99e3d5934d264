//! The form orchestrator.
//!
//! `Form` owns the authoritative context behind a single lock and applies
//! every transition through the pure permission table. Validation and
//! submission run as suspended effects with no lock held; their completion
//! re-enters the machine through ticket- and epoch-checked apply steps, so
//! a stale or cancelled result can never overwrite fresher state.

use crate::core::transition;
use crate::core::{
    FieldKey, FieldStatus, FormContext, FormState, LoggedTransition, StateLog, TransitionCause,
    ValidationTicket,
};
use crate::machine::action::{SharedExecutor, SharedValidator};
use crate::machine::error::{FormError, FormResult};
use crate::machine::event::FormEvent;
use crate::observe::{project, FieldBinding, FieldBindings, FormSnapshot, ListenerFn, Listeners, Subscription};
use chrono::Utc;
use log::{debug, trace, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use stillwater::prelude::*;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use uuid::Uuid;

/// Unique identifier of one form instance, for correlating log lines and
/// snapshots when several forms are alive at once.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FormId(Uuid);

impl FormId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Machine state guarded by the single context lock.
pub(crate) struct Shared<V, D, E> {
    pub(crate) context: FormContext<V, D, E>,
    pub(crate) state: FormState,
    pub(crate) log: StateLog,
    pub(crate) tickets: BTreeMap<FieldKey, ValidationTicket>,
    pub(crate) settled: BTreeSet<FieldKey>,
    pub(crate) epoch: u64,
    pub(crate) submit_count: u32,
}

pub(crate) struct FormCore<V, D, E, Env> {
    pub(crate) id: FormId,
    pub(crate) shared: RwLock<Shared<V, D, E>>,
    pub(crate) declared: Vec<FieldKey>,
    pub(crate) initial_values: BTreeMap<FieldKey, V>,
    pub(crate) validators: BTreeMap<FieldKey, SharedValidator<V, E, Env>>,
    pub(crate) executor: SharedExecutor<V, D, E, Env>,
    pub(crate) listeners: RwLock<Listeners<V, D, E, Env>>,
    pub(crate) warned_missing_schema: AtomicBool,
}

/// The form orchestrator: a hierarchical state machine coordinating
/// field-level and form-level transitions.
///
/// Cloning a `Form` clones a handle to the same instance; all clones share
/// one context, one listener registry, and one lifecycle.
///
/// # Example
///
/// ```rust
/// use formwork::{FieldBuilder, FieldKey, Form};
///
/// const NAME: FieldKey = FieldKey::new("name");
///
/// let form: Form<String, u32, &'static str, ()> = Form::builder()
///     .field(FieldBuilder::new(NAME).initial(String::new()).validate_with(
///         |value: &String| if value.is_empty() { Err("required") } else { Ok(()) },
///     ))?
///     .on_submit_with(|_values| Ok(42))
///     .build()?;
///
/// form.set_field(NAME, "Ada".to_string())?;
/// assert_eq!(form.snapshot()?.values.get(&NAME).map(String::as_str), Some("Ada"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Form<V, D, E, Env> {
    pub(crate) core: Arc<FormCore<V, D, E, Env>>,
}

impl<V, D, E, Env> Clone for Form<V, D, E, Env> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<V, D, E, Env> Form<V, D, E, Env>
where
    V: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    Env: Clone + Send + Sync + 'static,
{
    /// Start building a form. See [`crate::builder::FormBuilder`].
    pub fn builder() -> crate::builder::FormBuilder<V, D, E, Env> {
        crate::builder::FormBuilder::new()
    }

    pub(crate) fn assemble(
        declared: Vec<FieldKey>,
        initial_values: BTreeMap<FieldKey, V>,
        validators: BTreeMap<FieldKey, SharedValidator<V, E, Env>>,
        executor: SharedExecutor<V, D, E, Env>,
    ) -> Self {
        // The initial context write is the WaitingInit -> Idle traversal;
        // it completes before the handle is handed out, so observers only
        // ever see Idle.
        let log = StateLog::new().record(LoggedTransition {
            from: FormState::WaitingInit,
            to: FormState::Idle,
            cause: TransitionCause::Init,
            timestamp: Utc::now(),
            submit_attempt: 0,
        });
        let shared = Shared {
            context: FormContext::new(initial_values.clone()),
            state: FormState::Idle,
            log,
            tickets: BTreeMap::new(),
            settled: BTreeSet::new(),
            epoch: 0,
            submit_count: 0,
        };
        Self {
            core: Arc::new(FormCore {
                id: FormId::new(),
                shared: RwLock::new(shared),
                declared,
                initial_values,
                validators,
                executor,
                listeners: RwLock::new(Listeners::new()),
                warned_missing_schema: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> FormId {
        self.core.id
    }

    /// The reported form state, with `WaitingInit` normalized to `Idle`.
    pub fn state(&self) -> FormResult<FormState> {
        Ok(read_lock(&self.core.shared, "reading form state")?
            .state
            .reported())
    }

    /// Denormalized view of the current context. Deterministic: the same
    /// context always projects to the same snapshot.
    pub fn snapshot(&self) -> FormResult<FormSnapshot<V, D, E>> {
        let shared = read_lock(&self.core.shared, "creating form snapshot")?;
        Ok(project(self.core.id, &shared))
    }

    /// Per-field handler objects for every schema field.
    pub fn handlers(&self) -> FormResult<FieldBindings<V, D, E, Env>> {
        let snapshot = self.snapshot()?;
        Ok(self.bindings(&snapshot))
    }

    /// Register a listener invoked with the snapshot and per-field
    /// handlers on every context change, starting with the current one.
    ///
    /// Listeners are independent; removing one does not affect others.
    pub fn subscribe<F>(&self, listener: F) -> FormResult<Subscription>
    where
        F: Fn(&FormSnapshot<V, D, E>, &FieldBindings<V, D, E, Env>) + Send + Sync + 'static,
    {
        let listener: ListenerFn<V, D, E, Env> = Arc::new(listener);
        let id = write_lock(&self.core.listeners, "registering subscriber")?
            .add(Arc::clone(&listener));

        let snapshot = self.snapshot()?;
        let bindings = self.bindings(&snapshot);
        listener(&snapshot, &bindings);

        let core = Arc::clone(&self.core);
        Ok(Subscription::new(move || {
            if let Ok(mut listeners) = core.listeners.write() {
                listeners.remove(id);
            }
        }))
    }

    /// Apply a `Change`: write the value without validating. Works in any
    /// state and never changes the form-wide state.
    pub fn set_field(&self, field: FieldKey, value: V) -> FormResult<()> {
        {
            let mut shared = write_lock(&self.core.shared, "writing field value")?;
            if !shared.context.values.contains_key(&field) {
                debug!(
                    "form {}: change introduces undeclared field '{field}'",
                    self.core.id
                );
            }
            shared.context.values.insert(field, value);
        }
        self.notify()
    }

    /// Declared-field-checked variant of [`Form::set_field`]. A key that
    /// was never declared is logged as a development warning and ignored.
    pub fn set(&self, field: FieldKey, value: V) -> FormResult<()> {
        if !self.core.declared.contains(&field) {
            warn!(
                "form {}: set() on undeclared field '{field}' ignored",
                self.core.id
            );
            return Ok(());
        }
        self.set_field(field, value)
    }

    /// Apply a `ChangeWithValidate`: write the value, then validate it.
    ///
    /// The write and the validation request are claimed atomically; the
    /// result is applied only if no newer request for the field has been
    /// issued in the meantime.
    pub async fn set_field_with_validate(
        &self,
        field: FieldKey,
        value: V,
        env: &Env,
    ) -> FormResult<ValidationTicket> {
        let ticket = {
            let mut shared = write_lock(&self.core.shared, "writing field value for validation")?;
            shared.context.values.insert(field, value.clone());
            claim(&mut shared, field)
        };
        self.notify()?;

        let result = self.run_validator(field, &value, env).await;
        self.apply_validation(field, ticket, result)?;
        Ok(ticket)
    }

    /// Validate the field's current value without changing it. Returns
    /// `None` (after a development warning) for a field with no value.
    pub async fn validate_field(
        &self,
        field: FieldKey,
        env: &Env,
    ) -> FormResult<Option<ValidationTicket>> {
        let (ticket, value) = {
            let mut shared = write_lock(&self.core.shared, "starting field validation")?;
            let Some(value) = shared.context.values.get(&field).cloned() else {
                warn!(
                    "form {}: validate() on unknown field '{field}' ignored",
                    self.core.id
                );
                return Ok(None);
            };
            (claim(&mut shared, field), value)
        };
        self.notify()?;

        let result = self.run_validator(field, &value, env).await;
        self.apply_validation(field, ticket, result)?;
        Ok(Some(ticket))
    }

    /// Submit the form, validating every declared field first.
    pub async fn submit(&self, env: &Env) -> FormResult<()> {
        self.submit_ignoring(&[], env).await
    }

    /// Submit the form, skipping validation of the listed fields.
    ///
    /// The sweep claims a fresh ticket per field, so any older in-flight
    /// per-field validation becomes stale. Failures are accumulated rather
    /// than fail-fast: one pass reports every failing field. A field's
    /// in-flight status never blocks submission, but a recorded error does.
    pub async fn submit_ignoring(&self, ignore: &[FieldKey], env: &Env) -> FormResult<()> {
        let epoch = {
            let mut shared = write_lock(&self.core.shared, "preparing submit")?;
            if shared.state == FormState::Submitting {
                return Err(FormError::AlreadySubmitting);
            }
            shared.epoch += 1;
            shared.submit_count = shared.submit_count.saturating_add(1);
            self.apply_transition(&mut shared, FormState::Validating, TransitionCause::SubmitRequested)?;
            shared.epoch
        };
        self.notify()?;

        let sweep: Vec<FieldKey> = self
            .core
            .declared
            .iter()
            .copied()
            .filter(|key| !ignore.contains(key) && self.core.validators.contains_key(key))
            .collect();

        let mut checks: Vec<Validation<(), NonEmptyVec<FieldKey>>> = Vec::new();
        for field in sweep {
            let (ticket, value) = {
                let mut shared = write_lock(&self.core.shared, "claiming sweep validation")?;
                if shared.epoch != epoch {
                    return Ok(());
                }
                let Some(value) = shared.context.values.get(&field).cloned() else {
                    continue;
                };
                (claim(&mut shared, field), value)
            };
            self.notify()?;

            let result = self.run_validator(field, &value, env).await;
            checks.push(match &result {
                Ok(()) => Validation::success(()),
                Err(_) => Validation::fail(field),
            });

            {
                let mut shared = write_lock(&self.core.shared, "applying sweep validation")?;
                if shared.epoch != epoch {
                    trace!(
                        "form {}: cancelled sweep result for '{field}' dropped",
                        self.core.id
                    );
                    return Ok(());
                }
                if shared.tickets.get(&field).copied() == Some(ticket) {
                    shared.settled.insert(field);
                    shared.context.settle_field(field, result);
                }
            }
            self.notify()?;
        }

        match Validation::all_vec(checks).map(|_| ()) {
            Validation::Failure(failed) => {
                {
                    let mut shared =
                        write_lock(&self.core.shared, "recording rejected validation sweep")?;
                    if shared.epoch != epoch {
                        return Ok(());
                    }
                    debug!(
                        "form {}: validation rejected submit ({} field(s) failed)",
                        self.core.id,
                        failed.len()
                    );
                    self.apply_transition(
                        &mut shared,
                        FormState::Idle,
                        TransitionCause::ValidationRejected,
                    )?;
                }
                self.notify()
            }
            Validation::Success(()) => {
                let values = {
                    let mut shared = write_lock(&self.core.shared, "moving submit to executor")?;
                    if shared.epoch != epoch {
                        return Ok(());
                    }
                    self.apply_transition(
                        &mut shared,
                        FormState::Submitting,
                        TransitionCause::ValidationPassed,
                    )?;
                    shared.context.values.clone()
                };
                self.notify()?;

                let result = self.core.executor.execute(&values).run(env).await;

                {
                    let mut shared = write_lock(&self.core.shared, "completing submit")?;
                    if shared.epoch != epoch {
                        trace!("form {}: cancelled submit result dropped", self.core.id);
                        return Ok(());
                    }
                    match result {
                        Ok(data) => {
                            shared.context.record_submit_success(data);
                            self.apply_transition(
                                &mut shared,
                                FormState::Submitted,
                                TransitionCause::SubmitSucceeded,
                            )?;
                        }
                        Err(error) => {
                            shared.context.record_submit_failure(error);
                            self.apply_transition(
                                &mut shared,
                                FormState::Error,
                                TransitionCause::SubmitFailed,
                            )?;
                        }
                    }
                }
                self.notify()
            }
        }
    }

    /// Abort the in-flight validation sweep or submit, if any.
    ///
    /// The form state flips immediately; the underlying effect is not
    /// interrupted, its eventual result is discarded by the epoch check.
    /// Values, errors and submit data are left untouched.
    pub fn cancel(&self) -> FormResult<()> {
        let cancelled = {
            let mut shared = write_lock(&self.core.shared, "cancelling in-flight operation")?;
            if !shared.state.has_operation_in_flight() {
                trace!(
                    "form {}: cancel with no operation in flight ignored",
                    self.core.id
                );
                false
            } else {
                shared.epoch += 1;
                let validating: Vec<FieldKey> = shared
                    .context
                    .values
                    .keys()
                    .copied()
                    .filter(|key| shared.context.status(*key) == FieldStatus::Validating)
                    .collect();
                for field in validating {
                    shared.context.set_status(field, FieldStatus::Idle);
                }
                self.apply_transition(&mut shared, FormState::Idle, TransitionCause::Cancelled)?;
                true
            }
        };
        if cancelled {
            self.notify()
        } else {
            Ok(())
        }
    }

    /// Restore the initial values and clear all errors and submit
    /// outcomes. Tickets are kept so results of operations dispatched
    /// before the reset can never land after it.
    pub fn reset(&self) -> FormResult<()> {
        {
            let mut shared = write_lock(&self.core.shared, "resetting form")?;
            shared.epoch += 1;
            shared.context = FormContext::new(self.core.initial_values.clone());
            shared.settled.clear();
            self.apply_transition(&mut shared, FormState::Idle, TransitionCause::Reset)?;
        }
        self.notify()
    }

    /// Drive the machine with an explicit event.
    pub async fn dispatch(&self, event: FormEvent<V>, env: &Env) -> FormResult<()> {
        match event {
            FormEvent::Change { field, value } => self.set_field(field, value),
            FormEvent::Set { field, value } => self.set(field, value),
            FormEvent::ChangeWithValidate { field, value } => self
                .set_field_with_validate(field, value, env)
                .await
                .map(|_| ()),
            FormEvent::Validate { field } => self.validate_field(field, env).await.map(|_| ()),
            FormEvent::Submit { ignore } => self.submit_ignoring(&ignore, env).await,
            FormEvent::Cancel => self.cancel(),
        }
    }

    async fn run_validator(&self, field: FieldKey, value: &V, env: &Env) -> Result<(), E> {
        match self.core.validators.get(&field) {
            Some(validator) => validator.validate(value).run(env).await,
            None => Ok(()),
        }
    }

    /// Settle one field's validation result, unless a newer request for
    /// the field has superseded it.
    fn apply_validation(
        &self,
        field: FieldKey,
        ticket: ValidationTicket,
        result: Result<(), E>,
    ) -> FormResult<()> {
        {
            let mut shared = write_lock(&self.core.shared, "applying validation result")?;
            if shared.tickets.get(&field).copied() != Some(ticket) {
                trace!(
                    "form {}: stale validation result for '{field}' dropped",
                    self.core.id
                );
                return Ok(());
            }
            shared.settled.insert(field);
            shared.context.settle_field(field, result);
        }
        self.notify()
    }

    fn apply_transition(
        &self,
        shared: &mut Shared<V, D, E>,
        to: FormState,
        cause: TransitionCause,
    ) -> FormResult<()> {
        let from = shared.state;
        if from == to {
            return Ok(());
        }
        if !transition::is_permitted(from, to) {
            return Err(FormError::InvalidTransition { from, to });
        }
        debug!("form {}: {from} -> {to}", self.core.id);
        shared.log = shared.log.record(LoggedTransition {
            from,
            to,
            cause,
            timestamp: Utc::now(),
            submit_attempt: shared.submit_count,
        });
        shared.state = to;
        Ok(())
    }

    fn bindings(&self, snapshot: &FormSnapshot<V, D, E>) -> FieldBindings<V, D, E, Env> {
        if self.core.validators.is_empty() {
            if !self.core.warned_missing_schema.swap(true, Ordering::Relaxed) {
                warn!(
                    "form {}: no schema declared; field handler generation yields an empty set",
                    self.core.id
                );
            }
            return FieldBindings::empty();
        }

        let mut entries = BTreeMap::new();
        for key in self.core.validators.keys().copied() {
            let Some(value) = snapshot.values.get(&key).cloned() else {
                continue;
            };
            entries.insert(
                key,
                FieldBinding::new(
                    self.clone(),
                    key,
                    snapshot.field_state(key),
                    value,
                    snapshot.errors.get(&key).cloned(),
                ),
            );
        }
        FieldBindings::new(entries)
    }

    fn notify(&self) -> FormResult<()> {
        // The registry is cloned out so listeners may subscribe or
        // dispatch re-entrantly without holding any lock.
        let listeners = read_lock(&self.core.listeners, "reading subscribers")?.active();
        if listeners.is_empty() {
            return Ok(());
        }
        let snapshot = self.snapshot()?;
        let bindings = self.bindings(&snapshot);
        for listener in listeners {
            listener(&snapshot, &bindings);
        }
        Ok(())
    }
}

/// Claim the next validation ticket for a field and mark it in flight.
fn claim<V, D, E>(shared: &mut Shared<V, D, E>, field: FieldKey) -> ValidationTicket {
    let ticket = shared
        .tickets
        .get(&field)
        .copied()
        .unwrap_or_default()
        .next();
    shared.tickets.insert(field, ticket);
    shared.context.set_status(field, FieldStatus::Validating);
    ticket
}

pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
