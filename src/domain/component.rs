use std::{fmt, num::NonZeroUsize};

use crate::domain::{
    Subcomponent,
    encoding::{self, COMPONENT_SEPARATOR, SUBCOMPONENT_SEPARATOR},
};

/// A read view of one component of a field.
///
/// The component is split into its subcomponents on construction. The
/// subcomponents borrow from the message, so reading never copies text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component<'a> {
    subcomponents: Vec<&'a str>,
}

impl<'a> Component<'a> {
    /// Splits a raw component string on the subcomponent separator.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        Self {
            subcomponents: raw.split(SUBCOMPONENT_SEPARATOR).collect(),
        }
    }

    /// All subcomponents, in order.
    #[must_use]
    pub fn subcomponents(&self) -> &[&'a str] {
        &self.subcomponents
    }

    /// The subcomponent at the 1-based `index`, or `""` if there is none.
    #[must_use]
    pub fn subcomponent(&self, index: usize) -> &'a str {
        self.at(index).map_or("", |sub| sub.as_str())
    }

    /// The subcomponent at the 1-based `index`.
    ///
    /// Returns `None` if `index` is 0 or past the last subcomponent. A present
    /// but empty subcomponent is `Some`.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<Subcomponent<'a>> {
        index
            .checked_sub(1)
            .and_then(|i| self.subcomponents.get(i))
            .map(|&raw| Subcomponent::new(raw))
    }

    /// The number of subcomponents. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subcomponents.len()
    }

    /// Whether the component carries no text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subcomponents.iter().all(|sub| sub.is_empty())
    }
}

impl<'a> From<&'a str> for Component<'a> {
    fn from(raw: &'a str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for Component<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.subcomponents.join(SUBCOMPONENT_SEPARATOR))
    }
}

/// A write-through view of one component inside a raw field string.
///
/// Obtained from [`FieldMut::component_mut`](crate::domain::FieldMut::component_mut).
/// Each mutation rejoins the component into the field before returning, so
/// the owning segment always holds the current text.
#[derive(Debug)]
pub struct ComponentMut<'a> {
    field: &'a mut String,
    index: NonZeroUsize,
}

impl<'a> ComponentMut<'a> {
    pub(crate) fn new(field: &'a mut String, index: NonZeroUsize) -> Self {
        if !encoding::ensure_child(field, COMPONENT_SEPARATOR, index) {
            tracing::warn!("component {index} is past the position limit and reads as empty");
        }
        Self { field, index }
    }

    /// The current raw text of the component.
    #[must_use]
    pub fn as_str(&self) -> &str {
        encoding::child(self.field.as_str(), COMPONENT_SEPARATOR, self.index.get())
            .unwrap_or_default()
    }

    /// A read view of the component's current state.
    #[must_use]
    pub fn view(&self) -> Component<'_> {
        Component::parse(self.as_str())
    }

    /// The subcomponent at the 1-based `index`, or `""` if there is none.
    #[must_use]
    pub fn subcomponent(&self, index: usize) -> &str {
        encoding::child(self.as_str(), SUBCOMPONENT_SEPARATOR, index).unwrap_or_default()
    }

    /// The number of subcomponents.
    #[must_use]
    pub fn len(&self) -> usize {
        encoding::child_count(self.as_str(), SUBCOMPONENT_SEPARATOR)
    }

    /// Whether the component carries no text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_str().split(SUBCOMPONENT_SEPARATOR).all(str::is_empty)
    }

    /// Overwrites the subcomponent at `index`, padding with empty
    /// subcomponents if the component is shorter.
    pub fn set(&mut self, index: NonZeroUsize, value: &str) {
        let mut component = self.as_str().to_owned();
        encoding::replace_child(&mut component, SUBCOMPONENT_SEPARATOR, index, value);
        self.replace(&component);
    }

    /// Overwrites the whole component.
    pub fn replace(&mut self, value: &str) {
        encoding::replace_child(self.field, COMPONENT_SEPARATOR, self.index, value);
    }
}

impl fmt::Display for ComponentMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn splits_on_ampersand() {
        let component = Component::parse("A&B&C");
        assert_eq!(component.subcomponents(), &["A", "B", "C"]);
        assert_eq!(component.len(), 3);
        assert_eq!(component.subcomponent(2), "B");
    }

    #[test]
    fn absent_differs_from_empty() {
        let component = Component::parse("A&&C");
        assert_eq!(component.at(2), Some(Subcomponent::new("")));
        assert_eq!(component.at(4), None);
        assert_eq!(component.at(0), None);
        assert_eq!(component.subcomponent(4), "");
    }

    #[test]
    fn displays_joined() {
        assert_eq!(Component::parse("A&&C").to_string(), "A&&C");
        assert_eq!(Component::parse("").to_string(), "");
    }

    #[test]
    fn empty_component_has_one_empty_subcomponent() {
        let component = Component::parse("");
        assert_eq!(component.len(), 1);
        assert!(component.is_empty());
        assert!(Component::parse("&").is_empty());
        assert!(!Component::parse("&x").is_empty());
    }

    #[test]
    fn mut_view_creates_missing_component() {
        let mut field = String::from("A");
        let component = ComponentMut::new(&mut field, nz(3));
        assert_eq!(component.as_str(), "");
        assert!(component.is_empty());
        drop(component);
        assert_eq!(field, "A^^");
    }

    #[test]
    fn mut_view_writes_through_to_field() {
        let mut field = String::from("DOE^JOHN");
        let mut component = ComponentMut::new(&mut field, nz(2));
        component.set(nz(3), "JR");
        assert_eq!(component.as_str(), "JOHN&&JR");
        assert_eq!(component.subcomponent(3), "JR");
        assert_eq!(component.len(), 3);
        assert_eq!(field, "DOE^JOHN&&JR");
    }

    #[test]
    fn mut_view_replace_overwrites_whole_component() {
        let mut field = String::from("A^B&C^D");
        ComponentMut::new(&mut field, nz(2)).replace("X");
        assert_eq!(field, "A^X^D");
    }
}
