use std::path::PathBuf;

use clap::Parser;
use hl7::PathLocator;
use tracing::instrument;

use super::{load_message, parse_path, terminal::Role};

#[derive(Debug, Parser)]
#[command(about = "Print the values at one or more paths")]
pub struct Get {
    /// The message file to read (`-` for stdin)
    file: PathBuf,

    /// Paths to read, e.g. PID-5.1
    #[arg(required = true, value_parser = parse_path)]
    paths: Vec<PathLocator>,

    /// Prefix each value with its path
    #[arg(long, short)]
    long: bool,

    /// Exit with an error if any path is absent from the message
    #[arg(long)]
    strict: bool,
}

impl Get {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let message = load_message(&self.file)?;

        let mut missing = Vec::new();
        for path in &self.paths {
            let value = message.read(path);
            if value.is_none() {
                tracing::info!("{path} is not present in {}", self.file.display());
                missing.push(path);
            }
            let value = value.unwrap_or_default();
            if self.long {
                println!("{} {value}", Role::Label.paint(&format!("{path}:")));
            } else {
                println!("{value}");
            }
        }

        if self.strict && !missing.is_empty() {
            let missing: Vec<_> = missing.iter().map(ToString::to_string).collect();
            anyhow::bail!("Missing: {}", missing.join(", "));
        }

        Ok(())
    }
}
