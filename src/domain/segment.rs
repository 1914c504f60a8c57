use std::{fmt, num::NonZeroUsize};

use crate::domain::{
    Field, FieldMut,
    encoding::{
        self, COMPONENT_SEPARATOR, FIELD_SEPARATOR, MAX_POSITION, SUBCOMPONENT_SEPARATOR,
    },
};

/// One line of a message.
///
/// A segment stores its raw field strings in order. Position 0 holds the
/// segment name, which is also kept in `name`. Field views are derived from
/// these strings on demand and write back into them, so the raw strings are
/// the only copy of the segment's content.
///
/// Field numbers are 1-based. In header segments (`MSH`, `BHS`, `FHS`) field 1
/// is the field separator itself, so field `n` is stored at position `n - 1`:
///
/// ```
/// use hl7::domain::Segment;
///
/// let msh = Segment::parse(r"MSH|^~\&|SENDER");
/// assert_eq!(msh.field(1), "|");
/// assert_eq!(msh.field(2), r"^~\&");
/// assert_eq!(msh.field(3), "SENDER");
///
/// let pid = Segment::parse("PID|1||X");
/// assert_eq!(pid.field(1), "1");
/// assert_eq!(pid.field(3), "X");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    name: String,
    fields: Vec<String>,
}

/// Where a 1-based field number lives in the raw field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Field 1 of a header segment.
    Separator,
    Position(usize),
}

impl Segment {
    /// Parses one line of text into a segment.
    ///
    /// Parsing is lossless: the line is split on the field separator and
    /// nothing is trimmed or validated.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let fields: Vec<String> = line.split(FIELD_SEPARATOR).map(str::to_owned).collect();
        let name = fields.first().cloned().unwrap_or_default();
        Self { name, fields }
    }

    /// Creates an empty segment, serialized as `NAME|`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            fields: vec![name.to_owned(), String::new()],
        }
    }

    /// The segment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is a header segment, whose field 1 is the separator.
    #[must_use]
    pub fn is_header(&self) -> bool {
        encoding::is_header(&self.name)
    }

    fn slot(&self, index: usize) -> Option<Slot> {
        match index {
            0 => None,
            1 if self.is_header() => Some(Slot::Separator),
            i if self.is_header() => Some(Slot::Position(i - 1)),
            i => Some(Slot::Position(i)),
        }
    }

    /// The raw text of field `index`, or `None` if the segment has no such
    /// field. A field that is present but empty is `Some("")`.
    #[must_use]
    pub fn raw_field(&self, index: usize) -> Option<&str> {
        match self.slot(index)? {
            Slot::Separator => self.has_separator().then_some(FIELD_SEPARATOR),
            Slot::Position(position) => self.fields.get(position).map(String::as_str),
        }
    }

    /// The raw text of field `index`, or `""` if there is none.
    #[must_use]
    pub fn field(&self, index: usize) -> &str {
        self.raw_field(index).unwrap_or_default()
    }

    /// Field `index` as a component view. A missing field reads as a single
    /// empty component.
    #[must_use]
    pub fn field_object(&self, index: usize) -> Field<'_> {
        Field::parse(self.field(index))
    }

    /// Field `index` as a component view, or `None` if the field is missing.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<Field<'_>> {
        self.raw_field(index).map(Field::parse)
    }

    /// Component `component` of field `field`, or `""` if either is missing.
    #[must_use]
    pub fn component(&self, field: usize, component: usize) -> &str {
        encoding::child(self.field(field), COMPONENT_SEPARATOR, component).unwrap_or_default()
    }

    /// Subcomponent `subcomponent` of component `component` of field
    /// `field`, or `""` if any level is missing.
    #[must_use]
    pub fn subcomponent(&self, field: usize, component: usize, subcomponent: usize) -> &str {
        encoding::child(
            self.component(field, component),
            SUBCOMPONENT_SEPARATOR,
            subcomponent,
        )
        .unwrap_or_default()
    }

    /// The number of addressable fields.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.is_header() && self.has_separator() {
            self.fields.len()
        } else {
            self.fields.len() - 1
        }
    }

    /// Whether the line carries at least one field separator after its name.
    fn has_separator(&self) -> bool {
        self.fields.len() > 1
    }

    /// Whether the segment has no fields besides its name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw text of every addressable field, starting at field 1.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        (1..=self.len()).map(move |index| self.field(index))
    }

    /// A write-through view of field `index`.
    ///
    /// Missing fields up to `index` are created empty. Returns `None` for
    /// field 1 of a header segment, which is the separator and is fixed, and
    /// for indices past [`MAX_POSITION`].
    pub fn field_mut(&mut self, index: NonZeroUsize) -> Option<FieldMut<'_>> {
        if index.get() > MAX_POSITION {
            tracing::warn!("ignoring {}-{index}: the limit is {MAX_POSITION}", self.name);
            return None;
        }
        let Slot::Position(position) = self.slot(index.get())? else {
            return None;
        };
        let len = position.checked_add(1)?;
        if self.fields.len() < len {
            self.fields.resize(len, String::new());
        }
        Some(FieldMut::new(&mut self.fields[position]))
    }

    /// Overwrites field `index`, creating empty fields before it if needed.
    ///
    /// Writes to the separator field of a header segment are ignored.
    pub fn set_field(&mut self, index: NonZeroUsize, value: &str) {
        if self.slot(index.get()) == Some(Slot::Separator) {
            tracing::warn!(
                "ignoring write to {}-{index}: the field separator is fixed",
                self.name
            );
            return;
        }
        if let Some(mut field) = self.field_mut(index) {
            field.replace(value);
        }
    }
}

impl From<&str> for Segment {
    fn from(line: &str) -> Self {
        Self::parse(line)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.fields.join(FIELD_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn name_is_first_field() {
        let segment = Segment::parse("PID|1||X||DOE^JOHN");
        assert_eq!(segment.name(), "PID");
        assert!(!segment.is_header());
        assert_eq!(segment.len(), 5);
    }

    #[test_case(1, "1"; "first field")]
    #[test_case(2, ""; "present but empty")]
    #[test_case(5, "DOE^JOHN"; "last field")]
    #[test_case(6, ""; "past the end")]
    #[test_case(0, ""; "zero is not a field")]
    fn field_reads_are_permissive(index: usize, expected: &str) {
        let segment = Segment::parse("PID|1||X||DOE^JOHN");
        assert_eq!(segment.field(index), expected);
    }

    #[test]
    fn indexed_read_distinguishes_absent_from_empty() {
        let segment = Segment::parse("PID|1|");
        let empty = segment.at(2).expect("field 2 is present");
        assert!(empty.is_empty());
        assert_eq!(empty.to_string(), "");
        assert!(segment.at(99).is_none());
        assert!(segment.at(0).is_none());
    }

    #[test]
    fn component_shortcuts() {
        let segment = Segment::parse("PID|1||X||DOE^JOHN&J^^III");
        assert_eq!(segment.component(5, 1), "DOE");
        assert_eq!(segment.component(5, 2), "JOHN&J");
        assert_eq!(segment.component(5, 9), "");
        assert_eq!(segment.subcomponent(5, 2, 2), "J");
        assert_eq!(segment.subcomponent(5, 2, 3), "");
        assert_eq!(segment.subcomponent(9, 1, 1), "");
        assert_eq!(segment.field_object(5).component(4), "III");
    }

    #[test]
    fn header_numbering_counts_the_separator() {
        let segment = Segment::parse(r"MSH|^~\&|A|B|C|D|20240101||ADT^A01|1|P|2.4");
        assert!(segment.is_header());
        assert_eq!(segment.field(1), "|");
        assert_eq!(segment.field(2), r"^~\&");
        assert_eq!(segment.field(9), "ADT^A01");
        assert_eq!(segment.component(9, 2), "A01");
        assert_eq!(segment.field(12), "2.4");
        assert_eq!(segment.len(), 12);
    }

    #[test]
    fn header_separator_is_read_only() {
        let mut segment = Segment::parse(r"MSH|^~\&|A");
        assert!(segment.field_mut(nz(1)).is_none());
        segment.set_field(nz(1), "#");
        assert_eq!(segment.to_string(), r"MSH|^~\&|A");
    }

    #[test]
    fn bare_header_has_no_separator_field() {
        let mut segment = Segment::parse("MSH");
        assert!(segment.is_header());
        assert_eq!(segment.at(1), None);
        assert_eq!(segment.field(1), "");
        assert_eq!(segment.len(), 0);
        assert!(segment.is_empty());
        assert_eq!(segment.fields().count(), 0);

        segment.set_field(nz(3), "APP");
        assert_eq!(segment.to_string(), "MSH||APP");
        assert_eq!(segment.field(1), "|");
        assert_eq!(segment.len(), 3);
    }

    #[test]
    fn writes_past_the_position_limit_are_ignored() {
        let mut segment = Segment::parse("PID|1");
        assert!(segment.field_mut(nz(usize::MAX)).is_none());
        assert!(segment.field_mut(nz(MAX_POSITION + 1)).is_none());
        segment.set_field(nz(usize::MAX), "X");
        assert_eq!(segment.to_string(), "PID|1");

        let mut header = Segment::parse(r"MSH|^~\&");
        header.set_field(nz(usize::MAX), "X");
        assert_eq!(header.to_string(), r"MSH|^~\&");
    }

    #[test]
    fn write_extends_with_empty_fields() {
        let mut segment = Segment::parse("PID|1");
        segment.set_field(nz(4), "X");
        assert_eq!(segment.to_string(), "PID|1|||X");
        assert_eq!(segment.len(), 4);
        assert_eq!(segment.at(3).map(|f| f.to_string()), Some(String::new()));
    }

    #[test]
    fn field_view_writes_are_visible_through_the_segment() {
        let mut segment = Segment::parse("PID|1||X||DOE^JOHN");
        let mut field = segment.field_mut(nz(5)).unwrap();
        field.set(nz(3), "Q");
        field.component_mut(nz(1)).set(nz(2), "SR");
        assert_eq!(segment.field(5), "DOE&SR^JOHN^Q");
        assert_eq!(segment.to_string(), "PID|1||X||DOE&SR^JOHN^Q");
    }

    #[test]
    fn synthesized_segment_is_name_and_one_empty_field() {
        let segment = Segment::new("ZZZ");
        assert_eq!(segment.to_string(), "ZZZ|");
        assert_eq!(segment.len(), 1);
        assert_eq!(segment.at(1).map(|f| f.to_string()), Some(String::new()));
    }

    #[test]
    fn round_trips_exactly() {
        for line in [
            "PID|1||X||DOE^JOHN",
            "OBX|1|NM|^^^GLU||5.5|mmol/L|||||F",
            "EVN||",
            "NTE",
            r"MSH|^~\&|A|B",
        ] {
            assert_eq!(Segment::parse(line).to_string(), line);
        }
    }

    #[test]
    fn fields_iterates_addressable_fields() {
        let segment = Segment::parse(r"MSH|^~\&|A");
        let fields: Vec<_> = segment.fields().collect();
        assert_eq!(fields, vec!["|", r"^~\&", "A"]);

        let segment = Segment::parse("NTE");
        assert!(segment.is_empty());
        assert_eq!(segment.fields().count(), 0);
    }
}
