use std::collections::BTreeMap;

use crate::domain::{
    Message,
    encoding::{self, ENCODING_CHARACTERS, FIELD_SEPARATOR, SEGMENT_TERMINATOR},
};

/// Builds a [`Message`] segment by segment from field-index maps.
///
/// Each call to [`segment`](Self::segment) assembles one raw line directly.
/// [`build`](Self::build) joins the lines and runs them through
/// [`Message::parse`], so built messages obey exactly the same invariants as
/// parsed ones.
///
/// Field numbering follows the rest of the crate: fields are 1-based, and in
/// header segments field 1 is the separator and field 2 the encoding
/// characters (defaulting to `^~\&`).
///
/// ```
/// use hl7::MessageBuilder;
///
/// let message = MessageBuilder::new()
///     .segment("MSH", [(3, "LAB"), (9, "ORU^R01")])
///     .segment("PID", [(3, "12345"), (5, "DOE^JANE")])
///     .build();
///
/// assert_eq!(message.get("MSH-9.2"), "R01");
/// assert_eq!(message.get("PID-5.2"), "JANE");
/// assert_eq!(
///     message.to_string(),
///     "MSH|^~\\&|LAB||||||ORU^R01\r\nPID|||12345||DOE^JANE"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBuilder {
    lines: Vec<String>,
}

impl MessageBuilder {
    /// Creates a builder with no segments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a segment called `name` with the given `(field, value)` pairs.
    ///
    /// Gaps between fields are filled with empty fields. Field 0, and field 1
    /// of a header segment, are not addressable and are skipped. A later
    /// value for the same field replaces an earlier one. A segment with no
    /// fields is written as `NAME|`.
    #[must_use]
    pub fn segment<I, V>(mut self, name: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = (usize, V)>,
        V: Into<String>,
    {
        let header = encoding::is_header(name);
        let offset = usize::from(header);

        let mut positions: BTreeMap<usize, String> = BTreeMap::new();
        for (index, value) in fields {
            if index <= offset {
                tracing::warn!("skipping {name}-{index}: the field is not addressable");
                continue;
            }
            positions.insert(index - offset, value.into());
        }
        if header {
            positions
                .entry(1)
                .or_insert_with(|| ENCODING_CHARACTERS.to_owned());
        }

        let last = positions.keys().next_back().copied().unwrap_or(1);
        let mut raw = vec![name.to_owned()];
        raw.extend((1..=last).map(|position| positions.remove(&position).unwrap_or_default()));

        self.lines.push(raw.join(FIELD_SEPARATOR));
        self
    }

    /// The raw text of the message built so far, segments joined with CRLF.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines.join(SEGMENT_TERMINATOR)
    }

    /// Parses the assembled text into a [`Message`].
    #[must_use]
    pub fn build(self) -> Message {
        Message::parse(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_gaps_with_empty_fields() {
        let builder = MessageBuilder::new().segment("PID", [(1, "1"), (5, "DOE^JOHN")]);
        assert_eq!(builder.to_text(), "PID|1||||DOE^JOHN");
    }

    #[test]
    fn fields_may_arrive_in_any_order() {
        let builder = MessageBuilder::new().segment("OBX", [(5, "5.5"), (2, "NM"), (1, "1")]);
        assert_eq!(builder.to_text(), "OBX|1|NM|||5.5");
    }

    #[test]
    fn header_defaults_encoding_characters() {
        let builder = MessageBuilder::new().segment("MSH", [(9, "ADT^A01")]);
        assert_eq!(builder.to_text(), "MSH|^~\\&|||||||ADT^A01");

        let message = builder.build();
        assert_eq!(message.get("MSH-1"), "|");
        assert_eq!(message.get("MSH-2"), "^~\\&");
        assert_eq!(message.get("MSH-9"), "ADT^A01");
    }

    #[test]
    fn header_separator_and_field_zero_are_skipped() {
        let builder = MessageBuilder::new()
            .segment("MSH", [(1, "#"), (2, "^~\\&"), (3, "APP")])
            .segment("PID", [(0, "ignored"), (1, "1")]);
        assert_eq!(builder.to_text(), "MSH|^~\\&|APP\r\nPID|1");
    }

    #[test]
    fn empty_segment_matches_created_segment() {
        let builder = MessageBuilder::new().segment("NTE", Vec::<(usize, String)>::new());
        assert_eq!(builder.to_text(), "NTE|");
    }

    #[test]
    fn later_values_win() {
        let builder = MessageBuilder::new().segment("PID", [(1, "a"), (1, "b")]);
        assert_eq!(builder.to_text(), "PID|b");
    }

    #[test]
    fn built_message_equals_parsed_message() {
        let builder = MessageBuilder::new()
            .segment("MSH", [(3, "A"), (9, "ADT^A01"), (12, "2.4")])
            .segment("PID", [(1, "1"), (5, "DOE^JOHN")])
            .segment("OBX", [(1, "1")])
            .segment("OBX", [(1, "2")]);
        let text = builder.to_text();
        let message = builder.build();

        assert_eq!(message, Message::parse(&text));
        assert_eq!(message.to_string(), text);
        assert_eq!(message.segments_named("OBX").len(), 2);
        assert_eq!(message.get("PID-5.2"), "JOHN");
    }
}
