//! Fixed wire-format delimiters and the split/join primitives shared by every
//! level of the hierarchy.
//!
//! The encoding characters declared in a header segment are not negotiated:
//! every message is read and written with the literals below.

use std::num::NonZeroUsize;

/// Separates segments on output. Input accepts CR, LF or CRLF.
pub const SEGMENT_TERMINATOR: &str = "\r\n";

/// Separates fields within a segment.
pub const FIELD_SEPARATOR: &str = "|";

/// Separates components within a field.
pub const COMPONENT_SEPARATOR: &str = "^";

/// Separates subcomponents within a component.
pub const SUBCOMPONENT_SEPARATOR: &str = "&";

/// The encoding characters conventionally written into `MSH-2`.
///
/// Component, repetition, escape and subcomponent characters, in that order.
/// Only the component and subcomponent characters carry meaning here.
pub const ENCODING_CHARACTERS: &str = "^~\\&";

/// The largest position writable at any level.
///
/// Paths naming a larger field, component or subcomponent are rejected when
/// parsed, and positional writes beyond it are ignored, so a write can never
/// pad a message to an unbounded size.
pub const MAX_POSITION: usize = 9_999;

const HEADER_SEGMENTS: [&str; 3] = ["MSH", "BHS", "FHS"];

/// Whether a segment name denotes a header segment.
///
/// In a header segment the field separator itself counts as field 1, so field
/// `n` is stored at raw position `n - 1`.
#[must_use]
pub fn is_header(name: &str) -> bool {
    HEADER_SEGMENTS.contains(&name)
}

/// The 1-based child of `raw`, or `None` if `index` is 0 or out of range.
pub(crate) fn child<'a>(raw: &'a str, separator: &str, index: usize) -> Option<&'a str> {
    index.checked_sub(1).and_then(|i| raw.split(separator).nth(i))
}

/// The number of children `raw` splits into. Never less than one.
pub(crate) fn child_count(raw: &str, separator: &str) -> usize {
    raw.matches(separator).count() + 1
}

/// Pads `raw` with empty children until child `index` exists.
///
/// Returns `false`, leaving `raw` untouched, if `index` is past
/// [`MAX_POSITION`].
pub(crate) fn ensure_child(raw: &mut String, separator: &str, index: NonZeroUsize) -> bool {
    if index.get() > MAX_POSITION {
        return false;
    }
    let count = child_count(raw, separator);
    for _ in count..index.get() {
        raw.push_str(separator);
    }
    true
}

/// Overwrites child `index` of `raw`, padding with empty children first.
pub(crate) fn replace_child(raw: &mut String, separator: &str, index: NonZeroUsize, value: &str) {
    if !ensure_child(raw, separator, index) {
        tracing::warn!("ignoring write to position {index}: the limit is {MAX_POSITION}");
        return;
    }
    let mut children: Vec<&str> = raw.split(separator).collect();
    children[index.get() - 1] = value;
    let joined = children.join(separator);
    *raw = joined;
}
