use std::{fmt, ops::Deref};

/// A leaf value of the hierarchy.
///
/// Subcomponents are not decomposed any further. They borrow from the message
/// they were read from, compare by value and display as their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subcomponent<'a>(&'a str);

impl<'a> Subcomponent<'a> {
    /// Wraps a raw leaf value.
    #[must_use]
    pub const fn new(value: &'a str) -> Self {
        Self(value)
    }

    /// Returns the string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.0
    }
}

impl AsRef<str> for Subcomponent<'_> {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl Deref for Subcomponent<'_> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl fmt::Display for Subcomponent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl PartialEq<str> for Subcomponent<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Subcomponent<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'a> From<&'a str> for Subcomponent<'a> {
    fn from(value: &'a str) -> Self {
        Self(value)
    }
}
