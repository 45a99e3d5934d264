//! Explicit listener registry backing the subscription surface.

use crate::observe::binding::FieldBindings;
use crate::observe::snapshot::FormSnapshot;
use std::sync::Arc;

pub(crate) type ListenerFn<V, D, E, Env> =
    Arc<dyn Fn(&FormSnapshot<V, D, E>, &FieldBindings<V, D, E, Env>) + Send + Sync>;

/// Ordered set of listener closures with add/remove by id.
///
/// Broadcast order is registration order. The registry hands out clones of
/// the active set so notification never holds the registry lock.
pub(crate) struct Listeners<V, D, E, Env> {
    next_id: u64,
    entries: Vec<(u64, ListenerFn<V, D, E, Env>)>,
}

impl<V, D, E, Env> Listeners<V, D, E, Env> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, listener: ListenerFn<V, D, E, Env>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push((id, listener));
        id
    }

    /// Remove a listener by id; removing an unknown id is a no-op, which
    /// makes repeated unsubscription harmless.
    pub(crate) fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry, _)| *entry != id);
    }

    pub(crate) fn active(&self) -> Vec<ListenerFn<V, D, E, Env>> {
        self.entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Handle returned from `subscribe`; detaches the listener on demand.
///
/// Calling [`Subscription::unsubscribe`] more than once is a no-op.
/// Dropping the handle does not unsubscribe.
pub struct Subscription {
    cancel: Arc<dyn Fn() + Send + Sync>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Arc::new(cancel),
        }
    }

    pub fn unsubscribe(&self) {
        (self.cancel)()
    }
}
