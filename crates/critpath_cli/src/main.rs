//! critpath: critical path analysis for digital circuit descriptions.
//!
//! Provides `critpath analyze` for batch analysis with text or JSON reports
//! and `critpath view` for Graphviz DOT rendering of a circuit with its
//! critical path highlighted.

#![warn(missing_docs)]

mod analyze;
mod pipeline;
mod view;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// critpath: find the slowest path through a digital circuit.
#[derive(Parser, Debug)]
#[command(name = "critpath", version, about = "Critical path analysis for digital circuits")]
pub struct Cli {
    /// Suppress all output except reports and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `critpath.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find and report the critical path of one or more circuits.
    Analyze(AnalyzeArgs),
    /// Render a circuit as Graphviz DOT with its critical path highlighted.
    View(ViewArgs),
}

/// Arguments for the `critpath analyze` subcommand.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Circuit description files. Defaults to `[batch] circuits` from
    /// `critpath.toml`.
    pub files: Vec<String>,

    /// Output format for reports.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Also write a `<stem>.dot` rendering of each circuit into this
    /// directory.
    #[arg(long)]
    pub dot_dir: Option<String>,
}

/// Arguments for the `critpath view` subcommand.
#[derive(Parser, Debug)]
pub struct ViewArgs {
    /// Circuit description file.
    pub file: String,

    /// Output path for the DOT file (default: stdout).
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress progress output.
    pub quiet: bool,
    /// Whether debug logging is enabled.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    log::debug!("verbose logging enabled, color = {}", global.color);

    let result = match cli.command {
        Command::Analyze(ref args) => analyze::run(args, &global),
        Command::View(ref args) => view::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Sets up `env_logger`. `RUST_LOG` wins over the flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default_filter = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
