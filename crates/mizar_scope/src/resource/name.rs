//! Validated resource names.

use core::fmt;

use thiserror::Error;

/// The name a resource is registered under when no name is given.
pub const DEFAULT_NAME: &str = "default";

/// Error returned when a resource name fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid resource name {name:?}: names must be one or more word characters")]
pub struct InvalidName {
    /// The rejected name.
    pub name: String,
}

/// A validated resource name.
///
/// Names must be non-empty and consist of word characters only (alphanumeric
/// or `_`). Every registration carries a name; unnamed registrations use
/// [`DEFAULT_NAME`].
///
/// # Example
///
/// ```
/// use mizar_scope::ResourceName;
///
/// assert!(ResourceName::new("primary_db").is_ok());
/// assert!(ResourceName::new("no spaces").is_err());
/// assert_eq!(ResourceName::default().as_str(), "default");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName(String);

impl ResourceName {
    /// Validates `name` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidName`] if `name` is empty or contains a character
    /// that is neither alphanumeric nor `_`.
    pub fn new(name: impl AsRef<str>) -> Result<Self, InvalidName> {
        let name = name.as_ref();
        if name.is_empty() || !name.chars().all(is_word_char) {
            return Err(InvalidName {
                name: name.to_owned(),
            });
        }
        Ok(Self(name.to_owned()))
    }

    /// Wraps `name` without validating it.
    ///
    /// Lookups accept arbitrary strings; an unregisterable name simply never
    /// matches anything.
    pub(crate) fn raw(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResourceName {
    fn default() -> Self {
        Self(DEFAULT_NAME.to_owned())
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
