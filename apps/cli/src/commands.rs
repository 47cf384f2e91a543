//! CLI command definitions, routing, and tracing setup.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use slrkit_core::pipeline::{self, AddEntryConfig, AddEntryResult, ProgressReporter};
use slrkit_core::submission::load_submission;
use slrkit_shared::{AppConfig, PathsConfig, init_config, load_config, load_config_from};
use slrkit_storage::{Dataset, YearTally};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// slrkit — keep an SLR dataset in sync with issue-form submissions.
#[derive(Parser)]
#[command(
    name = "slrkit",
    version,
    about = "Append SLR entries from issue submissions and keep the issue form current.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./slrkit.toml when present).
    #[arg(long, global = true, env = "SLRKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Append the submitted entry to the dataset.
    Add {
        /// Read the issue body from this file instead of the environment.
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Validate and report without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Regenerate the issue form from the stored taxonomies.
    Form,

    /// Count entries per year, split by a category column.
    Stats {
        /// Column to split counts by.
        #[arg(long, default_value = "AI")]
        by: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write slrkit.toml with defaults into the current directory.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = ["slrkit", "slrkit_core", "slrkit_storage", "slrkit_markdown", "slrkit_shared"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Add { body_file, dry_run } => cmd_add(config_path, body_file.as_deref(), dry_run),
        Command::Form => cmd_form(config_path),
        Command::Stats { by } => cmd_stats(config_path, &by),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Load the config and resolve its paths.
///
/// Relative paths resolve against the config file's directory, or the
/// working directory when no file was given.
fn resolve_config(config_path: Option<&Path>) -> Result<(AppConfig, PathsConfig)> {
    let cwd = std::env::current_dir()
        .map_err(|e| eyre!("cannot determine working directory: {e}"))?;

    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config(&cwd)?,
    };

    let paths = config.paths.resolved_against(&config_root(config_path, &cwd));
    Ok((config, paths))
}

/// Directory relative config paths are joined onto.
fn config_root(config_path: Option<&Path>, cwd: &Path) -> PathBuf {
    config_path
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| cwd.to_path_buf(), |p| cwd.join(p))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_add(config_path: Option<&Path>, body_file: Option<&Path>, dry_run: bool) -> Result<()> {
    let (config, paths) = resolve_config(config_path)?;

    let (raw_body, source) =
        load_submission(&config.input, body_file, |var| std::env::var(var).ok())?;
    info!(%source, dry_run, "processing submission");

    let add_config = AddEntryConfig {
        paths,
        form: config.form,
        dry_run,
    };

    let reporter = CliProgress::new();
    let result = pipeline::add_entry(&add_config, &raw_body, &reporter)?;

    print_add_summary(&result);
    Ok(())
}

fn print_add_summary(result: &AddEntryResult) {
    let entry = &result.entry;
    println!();
    if result.dry_run {
        println!("  Dry run: nothing was written.");
    } else {
        println!("  Entry added to {}", result.dataset_path.display());
    }
    println!("  DOI:       {}", entry.doi);
    println!("  Year:      {}", entry.year);
    println!("  Domain:    {}", entry.domain);
    println!("  Threats:   {}", entry.targeted_threats);
    println!("  Faults:    {}", entry.fault_injection);
    if result.domain_added {
        println!("  New domain: {}", entry.domain);
    }
    if !result.new_fault_ids.is_empty() {
        let ids: Vec<String> = result.new_fault_ids.iter().map(ToString::to_string).collect();
        println!("  New fault injection types: {}", ids.join(", "));
    }
    println!("  Rows:      {} -> {}", result.rows_before, result.rows_after);
    if result.form_written {
        println!("  Issue form regenerated.");
    }
    println!("  Time:      {:.2}s", result.elapsed.as_secs_f64());
    println!();
}

fn cmd_form(config_path: Option<&Path>) -> Result<()> {
    let (config, paths) = resolve_config(config_path)?;
    let form = pipeline::regenerate_form(&paths, &config.form)?;
    println!(
        "Issue form generated: {} ({} elements)",
        paths.template.display(),
        form.body.len()
    );
    Ok(())
}

fn cmd_stats(config_path: Option<&Path>, by: &str) -> Result<()> {
    let (_config, paths) = resolve_config(config_path)?;
    let dataset = Dataset::open(&paths.dataset)?;
    let tally = dataset.tally("Year", by)?;

    if tally.is_empty() {
        println!("No entries with a numeric year in {}", paths.dataset.display());
        return Ok(());
    }

    print!("{}", render_tally(&tally, by));
    Ok(())
}

/// Plain-text table: one row per year, one column per category value.
fn render_tally(tally: &YearTally, by: &str) -> String {
    let categories: BTreeSet<&str> = tally
        .values()
        .flat_map(|counts| counts.keys().map(String::as_str))
        .collect();

    let widths: Vec<usize> = categories
        .iter()
        .map(|c| c.chars().count().max(5))
        .collect();

    let mut out = format!("Papers per year by {by}\n\n{:<6}", "Year");
    for (cat, width) in categories.iter().zip(widths.iter().copied()) {
        out.push_str(&format!(" {cat:>width$}"));
    }
    out.push_str(&format!(" {:>5}\n", "Total"));

    for (year, counts) in tally {
        out.push_str(&format!("{year:<6}"));
        for (cat, width) in categories.iter().zip(widths.iter().copied()) {
            let n = counts.get(*cat).copied().unwrap_or(0);
            out.push_str(&format!(" {n:>width$}"));
        }
        let total: usize = counts.values().sum();
        out.push_str(&format!(" {total:>5}\n"));
    }
    out
}

fn cmd_config_init() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = init_config(&cwd)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let (config, _paths) = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &AddEntryResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
