//! Macros for ergonomic field declaration.

/// Declare typed [`FieldKey`](crate::FieldKey) constants for a form.
///
/// Dispatching through a generated constant proves at the type level that
/// the field name exists; stringly-keyed access remains available through
/// `FieldKey::new`.
///
/// # Example
///
/// ```
/// use formwork::field_keys;
///
/// field_keys! {
///     pub NAME = "name";
///     pub EMAIL = "email";
/// }
///
/// assert_eq!(NAME.as_str(), "name");
/// assert_eq!(EMAIL.as_str(), "email");
/// ```
#[macro_export]
macro_rules! field_keys {
    (
        $(
            $(#[$meta:meta])*
            $vis:vis $name:ident = $key:literal;
        )+
    ) => {
        $(
            $(#[$meta])*
            $vis const $name: $crate::FieldKey = $crate::FieldKey::new($key);
        )+
    };
}
