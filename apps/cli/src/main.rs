//! slrkit CLI — curate a systematic literature review from issue submissions.
//!
//! Appends issue-form answers to the SLR dataset, keeps the domain and
//! fault-injection taxonomies current, and regenerates the issue form.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
