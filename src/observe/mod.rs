//! Subscription and projection layer.
//!
//! Converts the raw machine context into a denormalized [`FormSnapshot`]
//! and broadcasts it, together with per-field [`FieldBinding`] handlers,
//! to an ordered set of listeners. Projection is pure; the registry is an
//! explicit add/remove listener set, not implicit event-loop wiring.

mod binding;
mod registry;
mod snapshot;

pub use binding::{FieldBinding, FieldBindings};
pub use registry::Subscription;
pub use snapshot::FormSnapshot;

pub(crate) use registry::{ListenerFn, Listeners};
pub(crate) use snapshot::project;
