//! The message model.
//!
//! A [`Message`] is an ordered list of [`Segment`]s. Each segment holds raw
//! field strings which decompose on demand into [`Field`], [`Component`] and
//! [`Subcomponent`] views. [`PathLocator`] parses `PID-5.1`-style addresses
//! into positions within that hierarchy.

mod component;
pub use component::{Component, ComponentMut};

pub mod encoding;

mod field;
pub use field::{Field, FieldMut};

mod message;
pub use message::Message;

/// Path notation (`NAME-field.component.subcomponent`) and its parser.
pub mod path;
pub use path::{Error as PathError, PathLocator};

mod segment;
pub use segment::Segment;

mod subcomponent;
pub use subcomponent::Subcomponent;
