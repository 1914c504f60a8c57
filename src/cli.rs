use std::path::Path;

mod get;
mod set;
mod show;
mod terminal;
mod validate;

use clap::ArgAction;
use get::Get;
use hl7::{Message, PathLocator};
use set::Set;
use show::Show;
use validate::Validate;

/// Parse a path from a string, normalizing to uppercase.
///
/// This is a CLI boundary function that accepts lowercase input
/// and normalizes it before parsing.
fn parse_path(s: &str) -> Result<PathLocator, String> {
    s.to_uppercase().parse().map_err(|e| format!("{e}"))
}

/// Load a message from a file, or from stdin when the path is `-`.
fn load_message(file: &Path) -> anyhow::Result<Message> {
    if file.as_os_str() == "-" {
        let text = std::io::read_to_string(std::io::stdin())?;
        Ok(Message::parse(&text))
    } else {
        Ok(Message::load(file)?)
    }
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run()
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show the segments and fields of a message
    Show(Show),

    /// Print the values at one or more paths
    ///
    /// Paths take the form NAME-field[.component[.subcomponent]], e.g.
    /// PID-5.1.
    Get(Get),

    /// Write values at one or more paths
    ///
    /// Missing segments, fields, components and subcomponents are created.
    Set(Set),

    /// Check messages against a rules file
    Validate(Validate),
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Show(command) => command.run()?,
            Self::Get(command) => command.run()?,
            Self::Set(command) => command.run()?,
            Self::Validate(command) => command.run()?,
        }
        Ok(())
    }
}
