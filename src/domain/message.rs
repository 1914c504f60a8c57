//! The message: an ordered list of segments with a by-name index.

use std::{collections::HashMap, convert::Infallible, fmt, str::FromStr};

use tracing::instrument;

use crate::domain::{
    PathLocator, Segment,
    encoding::{self, COMPONENT_SEPARATOR, SEGMENT_TERMINATOR, SUBCOMPONENT_SEPARATOR},
};

/// Positions in the segment list sharing one name.
///
/// A name seen once is stored as a single position; the list form is only
/// used once a name repeats. Callers never see the difference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Group {
    One(usize),
    Many(Vec<usize>),
}

impl Group {
    fn first(&self) -> usize {
        match self {
            Self::One(position) => *position,
            Self::Many(positions) => positions[0],
        }
    }

    fn positions(&self) -> &[usize] {
        match self {
            Self::One(position) => std::slice::from_ref(position),
            Self::Many(positions) => positions,
        }
    }

    fn push(&mut self, position: usize) {
        match self {
            Self::One(first) => *self = Self::Many(vec![*first, position]),
            Self::Many(positions) => positions.push(position),
        }
    }
}

/// A parsed message.
///
/// Segments are kept in parse order. A derived index maps each segment name
/// to the segments carrying it, so named lookups do not scan the list. The
/// list and the index are only ever extended together.
///
/// Two access styles address the same storage:
///
/// - path strings through [`get`](Self::get) and [`set`](Self::set), which
///   are forgiving: malformed paths and missing entities read as `""` and
///   malformed writes are ignored;
/// - positional access through [`segment`](Self::segment),
///   [`Segment::at`] and friends, or [`read`](Self::read), which return
///   `None` for anything missing so absence can be told apart from an empty
///   value.
///
/// `Message` does no internal locking. Mutation needs `&mut` access, so
/// sharing one message between threads requires external synchronisation.
///
/// ```
/// use hl7::Message;
///
/// let mut message = Message::parse("MSH|^~\\&|A|B|C|D|20240101||ADT^A01\rPID|1||X||DOE^JOHN");
///
/// assert_eq!(message.get("PID-5.1"), "DOE");
/// assert_eq!(message.get("MSH-9"), "ADT^A01");
///
/// message.set("PID-5.3", "Q");
/// assert_eq!(message.get("PID-5"), "DOE^JOHN^Q");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    segments: Vec<Segment>,
    index: HashMap<String, Group>,
}

impl Message {
    /// Creates a message with no segments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw message text.
    ///
    /// Lines may be terminated by CR, LF or CRLF. Empty and whitespace-only
    /// lines are skipped. Parsing never fails: text without any segment lines
    /// gives an empty message.
    #[must_use]
    #[instrument(level = "trace", skip_all, fields(bytes = text.len()))]
    pub fn parse(text: &str) -> Self {
        let mut message = Self::new();
        for line in text
            .split(['\r', '\n'])
            .filter(|line| !line.trim().is_empty())
        {
            message.push_segment(Segment::parse(line));
        }
        tracing::trace!(segments = message.segments.len(), "parsed message");
        message
    }

    /// Appends a segment, keeping the name index in step.
    pub fn push_segment(&mut self, segment: Segment) {
        let position = self.segments.len();
        self.index
            .entry(segment.name().to_owned())
            .and_modify(|group| group.push(position))
            .or_insert(Group::One(position));
        self.segments.push(segment);
    }

    /// All segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the message has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first segment called `name`, or `None` if there is none.
    #[must_use]
    pub fn segment(&self, name: &str) -> Option<&Segment> {
        let position = self.index.get(name)?.first();
        self.segments.get(position)
    }

    /// The first segment called `name`, for in-place editing.
    pub fn segment_mut(&mut self, name: &str) -> Option<&mut Segment> {
        let position = self.index.get(name)?.first();
        self.segments.get_mut(position)
    }

    /// Every segment called `name`, in message order.
    ///
    /// Empty if there is no such segment.
    #[must_use]
    pub fn segments_named(&self, name: &str) -> Vec<&Segment> {
        self.index.get(name).map_or_else(Vec::new, |group| {
            group
                .positions()
                .iter()
                .filter_map(|&position| self.segments.get(position))
                .collect()
        })
    }

    /// Whether the message contains a segment called `name`.
    #[must_use]
    pub fn has_segment(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Distinct segment names, in order of first appearance.
    pub fn segment_names(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .enumerate()
            .filter(move |(position, segment)| {
                self.index
                    .get(segment.name())
                    .is_some_and(|group| group.first() == *position)
            })
            .map(|(_, segment)| segment.name())
    }

    /// Reads the value at `path`.
    ///
    /// Returns `None` if the segment, field, component or subcomponent does
    /// not exist. A present but empty value is `Some("")`.
    #[must_use]
    pub fn read(&self, path: &PathLocator) -> Option<&str> {
        let field = self.segment(path.segment())?.raw_field(path.field().get())?;
        let Some(component) = path.component() else {
            return Some(field);
        };
        let component = encoding::child(field, COMPONENT_SEPARATOR, component.get())?;
        let Some(subcomponent) = path.subcomponent() else {
            return Some(component);
        };
        encoding::child(component, SUBCOMPONENT_SEPARATOR, subcomponent.get())
    }

    /// Reads the value at a path string such as `PID-5.1`.
    ///
    /// Returns `""` if the path is malformed or anything it names is
    /// missing. Use [`read`](Self::read) to tell those cases apart.
    #[must_use]
    pub fn get(&self, path: &str) -> &str {
        match path.parse::<PathLocator>() {
            Ok(locator) => self.read(&locator).unwrap_or_default(),
            Err(e) => {
                tracing::warn!("{e}");
                ""
            }
        }
    }

    /// Writes `value` at `path`, creating whatever is missing.
    ///
    /// A missing segment is appended as `NAME|`. Missing fields, components
    /// and subcomponents are padded with empty values up to the addressed
    /// position. A field-level path overwrites the whole raw field.
    ///
    /// Field 1 of a header segment is the field separator; writes to it are
    /// ignored.
    #[instrument(level = "debug", skip_all, fields(path = %path))]
    pub fn write(&mut self, path: &PathLocator, value: &str) {
        if encoding::is_header(path.segment()) && path.field().get() == 1 {
            tracing::warn!("ignoring write to {path}: the field separator is fixed");
            return;
        }

        let existing = self.index.get(path.segment()).map(Group::first);
        let position = match existing {
            Some(position) => position,
            None => {
                tracing::debug!("creating segment {}", path.segment());
                self.push_segment(Segment::new(path.segment()));
                self.segments.len() - 1
            }
        };

        let Some(mut field) = self.segments[position].field_mut(path.field()) else {
            return;
        };
        match (path.component(), path.subcomponent()) {
            (None, _) => field.replace(value),
            (Some(component), None) => field.set(component, value),
            (Some(component), Some(subcomponent)) => {
                field.component_mut(component).set(subcomponent, value);
            }
        }
    }

    /// Writes `value` at a path string such as `PID-5.1`.
    ///
    /// Malformed paths are ignored; nothing is written.
    pub fn set(&mut self, path: &str, value: &str) {
        match path.parse::<PathLocator>() {
            Ok(locator) => self.write(&locator, value),
            Err(e) => tracing::warn!("{e}"),
        }
    }
}

impl FromStr for Message {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for Message {
    /// Segments joined with CRLF, with no trailing terminator.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(SEGMENT_TERMINATOR)?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
