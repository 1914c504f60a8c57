//! `hl7c`: inspect, edit and validate HL7-style message files.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
