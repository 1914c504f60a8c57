use std::{fmt, num::NonZeroUsize};

use crate::domain::{
    Component, ComponentMut,
    encoding::{self, COMPONENT_SEPARATOR, SUBCOMPONENT_SEPARATOR},
};

/// A read view of one field of a segment.
///
/// The field is split into its components on construction. Components borrow
/// from the segment; the joined text is recovered by [`Display`](fmt::Display)
/// rather than stored alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
    components: Vec<&'a str>,
}

impl<'a> Field<'a> {
    /// Splits a raw field string on the component separator.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        Self {
            components: raw.split(COMPONENT_SEPARATOR).collect(),
        }
    }

    /// All components, in order.
    #[must_use]
    pub fn components(&self) -> &[&'a str] {
        &self.components
    }

    /// The component at the 1-based `index`, or `""` if there is none.
    #[must_use]
    pub fn component(&self, index: usize) -> &'a str {
        index
            .checked_sub(1)
            .and_then(|i| self.components.get(i))
            .copied()
            .unwrap_or_default()
    }

    /// The component at the 1-based `index`.
    ///
    /// Returns `None` if `index` is 0 or past the last component.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<Component<'a>> {
        index
            .checked_sub(1)
            .and_then(|i| self.components.get(i))
            .map(|&raw| Component::parse(raw))
    }

    /// The number of components. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the field carries no text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.iter().all(|c| c.is_empty())
    }
}

impl<'a> From<&'a str> for Field<'a> {
    fn from(raw: &'a str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.components.join(COMPONENT_SEPARATOR))
    }
}

/// A write-through view of a raw field string.
///
/// Usually obtained from [`Segment::field_mut`](crate::domain::Segment::field_mut),
/// in which case it points straight into the segment's field slot. It can
/// also wrap any standalone `String`.
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use hl7::domain::FieldMut;
///
/// let mut raw = String::from("DOE^JOHN");
/// let mut field = FieldMut::new(&mut raw);
/// field.set(NonZeroUsize::new(4).unwrap(), "III");
///
/// assert_eq!(raw, "DOE^JOHN^^III");
/// ```
#[derive(Debug)]
pub struct FieldMut<'a> {
    raw: &'a mut String,
}

impl<'a> FieldMut<'a> {
    /// Wraps a raw field string for in-place editing.
    #[must_use]
    pub const fn new(raw: &'a mut String) -> Self {
        Self { raw }
    }

    /// The current raw text of the field.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    /// A read view of the field's current state.
    #[must_use]
    pub fn view(&self) -> Field<'_> {
        Field::parse(self.raw.as_str())
    }

    /// The component at the 1-based `index`, or `""` if there is none.
    #[must_use]
    pub fn component(&self, index: usize) -> &str {
        encoding::child(self.raw.as_str(), COMPONENT_SEPARATOR, index).unwrap_or_default()
    }

    /// The subcomponent at the 1-based `component` and `subcomponent`
    /// indices, or `""` if either is missing.
    #[must_use]
    pub fn subcomponent(&self, component: usize, subcomponent: usize) -> &str {
        encoding::child(self.component(component), SUBCOMPONENT_SEPARATOR, subcomponent)
            .unwrap_or_default()
    }

    /// The number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        encoding::child_count(self.raw.as_str(), COMPONENT_SEPARATOR)
    }

    /// Whether the field carries no text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.split(COMPONENT_SEPARATOR).all(str::is_empty)
    }

    /// Overwrites the component at `index`, padding with empty components if
    /// the field is shorter.
    pub fn set(&mut self, index: NonZeroUsize, value: &str) {
        encoding::replace_child(self.raw, COMPONENT_SEPARATOR, index, value);
    }

    /// Overwrites the whole field.
    pub fn replace(&mut self, value: &str) {
        value.clone_into(self.raw);
    }

    /// A write-through view of the component at `index`.
    ///
    /// The component (and any components before it) is created empty if the
    /// field is shorter.
    pub fn component_mut(&mut self, index: NonZeroUsize) -> ComponentMut<'_> {
        ComponentMut::new(self.raw, index)
    }
}

impl fmt::Display for FieldMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.raw.as_str())
    }
}
