use std::{fmt, num::NonZeroUsize, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::domain::encoding::MAX_POSITION;

static PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{2,3}[0-9]?)-(\d+)(?:\.(\d+))?(?:\.(\d+))?$")
        .expect("path pattern is valid")
});

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,3}[0-9]?$").expect("segment name pattern is valid"));

/// A parsed path addressing a field, component or subcomponent.
///
/// Format: `{NAME}-{FIELD}[.{COMPONENT}[.{SUBCOMPONENT}]]`, where:
/// - `NAME` is a segment name of two or three uppercase letters, optionally
///   followed by one digit (e.g. `PID`, `ZX1`)
/// - `FIELD`, `COMPONENT` and `SUBCOMPONENT` are 1-based positive integers no
///   larger than [`MAX_POSITION`]
///
/// Examples: `PID-5`, `PID-5.1`, `PID-3.4.2`
///
/// Parsing only checks the syntax. Whether the segment or any of the
/// positions exist is decided when the path is applied to a message.
///
/// ```
/// use hl7::PathLocator;
///
/// let path: PathLocator = "PID-5.2".parse().unwrap();
/// assert_eq!(path.segment(), "PID");
/// assert_eq!(path.field().get(), 5);
/// assert_eq!(path.component().map(|c| c.get()), Some(2));
/// assert_eq!(path.subcomponent(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathLocator {
    segment: String,
    field: NonZeroUsize,
    component: Option<NonZeroUsize>,
    subcomponent: Option<NonZeroUsize>,
}

impl PathLocator {
    /// Creates a locator from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment name is not two or three uppercase
    /// letters optionally followed by a digit, or if a subcomponent is given
    /// without a component.
    pub fn new(
        segment: &str,
        field: NonZeroUsize,
        component: Option<NonZeroUsize>,
        subcomponent: Option<NonZeroUsize>,
    ) -> Result<Self, Error> {
        if !NAME_PATTERN.is_match(segment) {
            return Err(Error::SegmentName(segment.to_owned()));
        }
        if component.is_none() && subcomponent.is_some() {
            return Err(Error::MissingComponent);
        }
        if let Some(position) = [Some(field), component, subcomponent]
            .into_iter()
            .flatten()
            .find(|position| position.get() > MAX_POSITION)
        {
            return Err(Error::Index(segment.to_owned(), position.to_string()));
        }
        Ok(Self {
            segment: segment.to_owned(),
            field,
            component,
            subcomponent,
        })
    }

    /// The segment name.
    #[must_use]
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// The 1-based field number.
    #[must_use]
    pub const fn field(&self) -> NonZeroUsize {
        self.field
    }

    /// The 1-based component number, if the path addresses a component.
    #[must_use]
    pub const fn component(&self) -> Option<NonZeroUsize> {
        self.component
    }

    /// The 1-based subcomponent number, if the path addresses a
    /// subcomponent.
    #[must_use]
    pub const fn subcomponent(&self) -> Option<NonZeroUsize> {
        self.subcomponent
    }
}

fn parse_index(path: &str, digits: &str) -> Result<NonZeroUsize, Error> {
    let value = digits
        .parse::<usize>()
        .map_err(|_| Error::Index(path.to_owned(), digits.to_owned()))?;
    if value > MAX_POSITION {
        return Err(Error::Index(path.to_owned(), digits.to_owned()));
    }
    NonZeroUsize::new(value).ok_or_else(|| Error::ZeroIndex(path.to_owned()))
}

impl FromStr for PathLocator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = PATH_PATTERN
            .captures(s)
            .ok_or_else(|| Error::Syntax(s.to_owned()))?;

        let index = |group: usize| {
            captures
                .get(group)
                .map(|digits| parse_index(s, digits.as_str()))
                .transpose()
        };

        let field = index(2)?.ok_or_else(|| Error::Syntax(s.to_owned()))?;
        let component = index(3)?;
        let subcomponent = index(4)?;

        Ok(Self {
            segment: captures[1].to_owned(),
            field,
            component,
            subcomponent,
        })
    }
}

impl TryFrom<&str> for PathLocator {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

impl fmt::Display for PathLocator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.segment, self.field)?;
        if let Some(component) = self.component {
            write!(f, ".{component}")?;
        }
        if let Some(subcomponent) = self.subcomponent {
            write!(f, ".{subcomponent}")?;
        }
        Ok(())
    }
}

/// Errors that can occur while parsing or constructing a path.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The string does not match `NAME-field[.component[.subcomponent]]`.
    #[error("Invalid path syntax: {0}")]
    Syntax(String),

    /// A position is too large to address.
    #[error("Invalid index in path '{0}': {1} is out of range")]
    Index(String, String),

    /// Positions are 1-based.
    #[error("Invalid index in path '{0}': positions start at 1")]
    ZeroIndex(String),

    /// The segment name does not match `[A-Z]{{2,3}}[0-9]?`.
    #[error("Invalid segment name '{0}': expected two or three uppercase letters and an optional digit")]
    SegmentName(String),

    /// A subcomponent was given without a component.
    #[error("A subcomponent requires a component")]
    MissingComponent,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test_case("PID-5", "PID", 5, None, None; "field only")]
    #[test_case("PID-5.1", "PID", 5, Some(1), None; "component")]
    #[test_case("PID-3.4.2", "PID", 3, Some(4), Some(2); "subcomponent")]
    #[test_case("MSH-9", "MSH", 9, None, None; "header")]
    #[test_case("ZX1-12", "ZX1", 12, None, None; "custom segment with digit")]
    #[test_case("PV-1", "PV", 1, None, None; "two letter name")]
    #[test_case("PID-005.01", "PID", 5, Some(1), None; "leading zeros")]
    fn parses_valid_paths(
        input: &str,
        segment: &str,
        field: usize,
        component: Option<usize>,
        subcomponent: Option<usize>,
    ) {
        let path = PathLocator::from_str(input).unwrap();
        assert_eq!(path.segment(), segment);
        assert_eq!(path.field().get(), field);
        assert_eq!(path.component().map(NonZeroUsize::get), component);
        assert_eq!(path.subcomponent().map(NonZeroUsize::get), subcomponent);
    }

    #[test_case(""; "empty")]
    #[test_case("PID"; "no field")]
    #[test_case("PID-"; "dash only")]
    #[test_case("pid-5"; "lowercase")]
    #[test_case("P-5"; "name too short")]
    #[test_case("PIDX-5"; "name too long")]
    #[test_case("PI12-5"; "two digits")]
    #[test_case("PID-5.1.2.3"; "too deep")]
    #[test_case("PID-5."; "trailing dot")]
    #[test_case("PID-a"; "non numeric field")]
    #[test_case("PID-5.x"; "non numeric component")]
    #[test_case(" PID-5"; "leading whitespace")]
    #[test_case("PID-5 "; "trailing whitespace")]
    #[test_case("PID--5"; "negative")]
    fn rejects_malformed_syntax(input: &str) {
        assert!(matches!(
            PathLocator::from_str(input),
            Err(Error::Syntax(_))
        ));
    }

    #[test_case("PID-0"; "zero field")]
    #[test_case("PID-5.0"; "zero component")]
    #[test_case("PID-5.1.0"; "zero subcomponent")]
    fn rejects_zero_positions(input: &str) {
        assert!(matches!(
            PathLocator::from_str(input),
            Err(Error::ZeroIndex(_))
        ));
    }

    #[test_case("PID-99999999999999999999999"; "overflows usize")]
    #[test_case("PID-18446744073709551615"; "usize max")]
    #[test_case("PID-10000"; "field past the limit")]
    #[test_case("PID-5.10000"; "component past the limit")]
    #[test_case("PID-5.1.10000"; "subcomponent past the limit")]
    fn rejects_out_of_range_positions(input: &str) {
        assert!(matches!(
            PathLocator::from_str(input),
            Err(Error::Index(_, _))
        ));
    }

    #[test]
    fn accepts_the_largest_position() {
        let path = PathLocator::from_str("PID-9999.9999.9999").unwrap();
        assert_eq!(path.field().get(), MAX_POSITION);
        assert_eq!(path.subcomponent().map(NonZeroUsize::get), Some(MAX_POSITION));
    }

    #[test_case("PID-5"; "field")]
    #[test_case("PID-5.1"; "component")]
    #[test_case("OBX-5.1.2"; "subcomponent")]
    fn display_matches_input(input: &str) {
        assert_eq!(PathLocator::from_str(input).unwrap().to_string(), input);
    }

    #[test]
    fn new_validates_parts() {
        let path = PathLocator::new("PID", nz(5), Some(nz(1)), None).unwrap();
        assert_eq!(path.to_string(), "PID-5.1");

        assert!(matches!(
            PathLocator::new("pid", nz(5), None, None),
            Err(Error::SegmentName(_))
        ));
        assert_eq!(
            PathLocator::new("PID", nz(5), None, Some(nz(1))),
            Err(Error::MissingComponent)
        );
        assert!(matches!(
            PathLocator::new("PID", nz(5), Some(nz(MAX_POSITION + 1)), None),
            Err(Error::Index(_, _))
        ));
    }

    #[test]
    fn error_display() {
        let error = Error::Syntax("bad".to_string());
        assert_eq!(format!("{error}"), "Invalid path syntax: bad");

        let error = Error::ZeroIndex("PID-0".to_string());
        assert_eq!(
            format!("{error}"),
            "Invalid index in path 'PID-0': positions start at 1"
        );
    }
}
