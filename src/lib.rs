//! An indexed, round-trippable codec for pipe-delimited HL7-style messages.
//!
//! Messages parse into a four-level hierarchy (segments, fields, components,
//! subcomponents) that can be read and written either by path string
//! (`PID-5.1`) or by position, and serialize back to the exact wire format.

pub mod domain;
pub use domain::{Message, PathError, PathLocator, Segment};

/// Assembles messages from field-index maps.
pub mod builder;
pub use builder::MessageBuilder;

/// Reading and writing message files.
pub mod storage;

/// Declarative, rule-based checks over message fields.
pub mod validation;
pub use validation::{Report, RuleSet};
