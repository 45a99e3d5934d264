//! Field identity and validation request sequencing.

use std::fmt::{Display, Formatter};

/// Identifier of one named, independently validated slot in the form.
///
/// Keys are static strings so they can be declared as constants and
/// compared cheaply; the [`field_keys!`](crate::field_keys) macro generates
/// typed constants for a form's declared fields.
///
/// # Example
///
/// ```rust
/// use formwork::FieldKey;
///
/// const EMAIL: FieldKey = FieldKey::new("email");
/// assert_eq!(EMAIL.as_str(), "email");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Monotonically increasing per-field validation request counter.
///
/// Every validation request for a field claims the next ticket; a result is
/// applied only while its ticket is still the field's latest. Sequence
/// numbers, not timestamps, keep staleness detection correct under clock
/// coarseness: two back-to-back requests for identical values still get
/// distinct tickets, and the older one is invalidated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ValidationTicket(pub u64);

impl ValidationTicket {
    /// The next ticket in the sequence (pure).
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
