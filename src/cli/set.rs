use std::{path::PathBuf, str::FromStr};

use anyhow::Context;
use clap::Parser;
use hl7::PathLocator;
use tracing::instrument;

use super::load_message;

#[derive(Debug, Parser)]
#[command(about = "Write values at one or more paths")]
pub struct Set {
    /// The message file to edit (`-` for stdin)
    file: PathBuf,

    /// Assignments of the form PATH=VALUE, applied in order
    #[arg(required = true, value_name = "PATH=VALUE")]
    assignments: Vec<Assignment>,

    /// Overwrite the input file instead of printing the result
    #[arg(long, short, conflicts_with = "output_file")]
    in_place: bool,

    /// Write the result to this file instead of stdout
    #[arg(long, short, value_name = "FILE")]
    output_file: Option<PathBuf>,
}

/// A single `PATH=VALUE` pair.
#[derive(Debug, Clone)]
struct Assignment {
    path: PathLocator,
    value: String,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected PATH=VALUE, got '{s}'"))?;
        Ok(Self {
            path: super::parse_path(path)?,
            value: value.to_owned(),
        })
    }
}

impl Set {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let mut message = load_message(&self.file)?;

        for Assignment { path, value } in &self.assignments {
            message.write(path, value);
            tracing::info!("Set {path} = {value:?}");
        }

        let target = if self.in_place {
            anyhow::ensure!(
                self.file.as_os_str() != "-",
                "--in-place cannot be used when reading from stdin"
            );
            Some(self.file.clone())
        } else {
            self.output_file.clone()
        };

        match target {
            Some(path) => message
                .save(&path)
                .with_context(|| format!("Failed to save {}", path.display()))?,
            None => println!("{message}"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignment() {
        let assignment: Assignment = "pid-5.1=ROE".parse().unwrap();
        assert_eq!(assignment.path.to_string(), "PID-5.1");
        assert_eq!(assignment.value, "ROE");
    }

    #[test]
    fn value_may_contain_equals_and_separators() {
        let assignment: Assignment = "OBX-5=a=b^c".parse().unwrap();
        assert_eq!(assignment.value, "a=b^c");
    }

    #[test]
    fn empty_value_is_allowed() {
        let assignment: Assignment = "PID-3=".parse().unwrap();
        assert_eq!(assignment.value, "");
    }

    #[test]
    fn rejects_missing_equals_or_bad_path() {
        assert!("PID-3".parse::<Assignment>().is_err());
        assert!("PID-0=x".parse::<Assignment>().is_err());
    }
}
