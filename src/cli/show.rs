use std::path::PathBuf;

use clap::Parser;
use hl7::{Message, Segment};
use tracing::instrument;

use super::{load_message, terminal::Role};

#[derive(Debug, Parser)]
#[command(about = "Show the segments and fields of a message")]
pub struct Show {
    /// The message file to read (`-` for stdin)
    file: PathBuf,

    /// Only show segments with this name
    #[arg(long, short, value_name = "NAME")]
    segment: Option<String>,

    /// Include empty fields in the listing
    #[arg(long)]
    all: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "tree")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// One line per populated field, grouped by segment
    #[default]
    Tree,
    /// Segments and their fields as JSON
    Json,
    /// The message text, one segment per line
    Raw,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let message = load_message(&self.file)?;

        match self.output {
            OutputFormat::Tree => self.output_tree(&message),
            OutputFormat::Json => self.output_json(&message)?,
            OutputFormat::Raw => self.output_raw(&message),
        }

        Ok(())
    }

    fn selected<'a>(&self, message: &'a Message) -> impl Iterator<Item = &'a Segment> {
        let filter = self.segment.as_deref().map(str::to_uppercase);
        message
            .segments()
            .iter()
            .filter(move |segment| filter.as_deref().is_none_or(|name| segment.name() == name))
    }

    fn output_tree(&self, message: &Message) {
        for segment in self.selected(message) {
            println!("{}", Role::Segment.paint(segment.name()));
            for (index, value) in (1..).zip(segment.fields()) {
                if value.is_empty() && !self.all {
                    continue;
                }
                let label = format!("{}-{index}", segment.name());
                println!("  {} {value}", Role::Label.paint(&format!("{label:<8}")));
            }
        }
    }

    fn output_json(&self, message: &Message) -> anyhow::Result<()> {
        use serde_json::json;

        let segments: Vec<_> = self
            .selected(message)
            .map(|segment| {
                json!({
                    "name": segment.name(),
                    "fields": segment.fields().collect::<Vec<_>>(),
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json!({ "segments": segments }))?);
        Ok(())
    }

    fn output_raw(&self, message: &Message) {
        for segment in self.selected(message) {
            println!("{segment}");
        }
    }
}
