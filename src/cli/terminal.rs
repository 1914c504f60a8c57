//! Colours for the roles text plays in `hl7c` output.

use owo_colors::{OwoColorize, Style, colors::css};

/// The part a piece of output text plays.
///
/// Each role maps to one style. Styling is skipped entirely when stdout does
/// not support colour, so piped output stays plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A segment name heading a group of fields, e.g. `PID`.
    Segment,
    /// A field or path label in front of a value, e.g. `PID-5`.
    Label,
    /// A message that passed every rule.
    Valid,
    /// A message, or a file, with failures.
    Invalid,
}

impl Role {
    fn style(self) -> Style {
        match self {
            Self::Segment => Style::new().bold().fg::<css::LightBlue>(),
            Self::Label => Style::new().dimmed(),
            Self::Valid => Style::new().fg::<css::Green>(),
            Self::Invalid => Style::new().fg::<css::Orange>(),
        }
    }

    /// Renders `text` in this role's style, if colour is enabled.
    pub fn paint(self, text: &str) -> String {
        if colour_enabled() {
            text.style(self.style()).to_string()
        } else {
            text.to_owned()
        }
    }
}

fn colour_enabled() -> bool {
    supports_color::on_cached(supports_color::Stream::Stdout).is_some()
}
