use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hl7::{Message, Report, RuleSet, storage::collect_message_paths};
use rayon::prelude::*;
use tracing::instrument;

use super::terminal::Role;

#[derive(Debug, Parser)]
#[command(about = "Check messages against a rules file")]
pub struct Validate {
    /// The rules file (TOML, or YAML by extension)
    #[arg(long, short, value_name = "FILE")]
    rules: PathBuf,

    /// Message files, or directories to search for `.hl7` files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

#[derive(Debug)]
struct Outcome {
    file: PathBuf,
    result: Result<Report, String>,
}

impl Outcome {
    fn issues(&self) -> usize {
        self.result
            .as_ref()
            .map_or(1, |report| report.failures().len())
    }
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let rules = RuleSet::load(&self.rules)
            .with_context(|| format!("Failed to load rules from {}", self.rules.display()))?;

        let files = collect_message_paths(&self.paths);
        tracing::debug!("Validating {} files against {} rules", files.len(), rules.rules().len());

        let outcomes: Vec<Outcome> = files
            .into_par_iter()
            .map(|file| {
                let result = Message::load(&file)
                    .map(|message| rules.validate(&message))
                    .map_err(|e| e.to_string());
                Outcome { file, result }
            })
            .collect();

        match self.output {
            OutputFormat::Table => self.output_table(&outcomes),
            OutputFormat::Json => Self::output_json(&outcomes)?,
            OutputFormat::Summary => self.output_summary(&outcomes),
        }

        if outcomes.iter().any(|outcome| outcome.issues() > 0) {
            std::process::exit(2);
        }

        Ok(())
    }

    fn output_table(&self, outcomes: &[Outcome]) {
        if self.quiet {
            return;
        }

        for outcome in outcomes {
            let file = outcome.file.display();
            match &outcome.result {
                Ok(report) if report.is_valid() => {
                    println!("{}", Role::Valid.paint(&format!("✓ {file}")));
                }
                Ok(report) => {
                    let heading = format!("✗ {file}: {} failures", report.failures().len());
                    println!("{}", Role::Invalid.paint(&heading));
                    for failure in report.failures() {
                        println!(
                            "    {} {}",
                            Role::Label.paint(&format!("{:<10}", failure.path)),
                            failure.message
                        );
                    }
                }
                Err(error) => {
                    println!("{}", Role::Invalid.paint(&format!("✗ {file}: {error}")));
                }
            }
        }

        let total = count_issues(outcomes);
        if total == 0 {
            println!(
                "\n{}",
                Role::Valid.paint(&format!("All {} messages valid", outcomes.len()))
            );
        } else {
            println!(
                "\n{}",
                Role::Invalid.paint(&format!("Summary: {total} issues found"))
            );
        }
    }

    fn output_json(outcomes: &[Outcome]) -> anyhow::Result<()> {
        use serde_json::json;

        let files: Vec<_> = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(report) => json!({
                    "file": outcome.file,
                    "valid": report.is_valid(),
                    "failures": report.failures(),
                }),
                Err(error) => json!({
                    "file": outcome.file,
                    "valid": false,
                    "error": error,
                }),
            })
            .collect();

        let output = json!({
            "files": files,
            "summary": {
                "files": outcomes.len(),
                "issues": count_issues(outcomes),
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_summary(&self, outcomes: &[Outcome]) {
        if self.quiet {
            return;
        }

        let invalid = outcomes.iter().filter(|o| o.issues() > 0).count();
        println!(
            "files={} invalid={invalid} issues={}",
            outcomes.len(),
            count_issues(outcomes)
        );
    }
}

fn count_issues(outcomes: &[Outcome]) -> usize {
    outcomes.iter().map(Outcome::issues).sum()
}
