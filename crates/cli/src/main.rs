mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// zcfg - reconcile auto-instrumentation configuration on this host
#[derive(Parser)]
#[command(name = "zcfg")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Log debug output to stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show what apply would change, without writing anything
  Plan {
    /// Path to the facts file
    facts: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Shorthand for `--output json`
    #[arg(long)]
    json: bool,
  },

  /// Converge every artifact onto the facts file
  Apply {
    /// Path to the facts file
    facts: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Shorthand for `--output json`
    #[arg(long)]
    json: bool,
  },

  /// Show the report of the last apply
  Status {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Shorthand for `--output json`
    #[arg(long)]
    json: bool,
  },

  /// Show detected platform, probe results and target paths
  Info {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Shorthand for `--output json`
    #[arg(long)]
    json: bool,
  },
}

fn output_format(output: OutputFormat, json: bool) -> OutputFormat {
  if json { OutputFormat::Json } else { output }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Plan { facts, output, json } => cmd::cmd_plan(&facts, output_format(output, json)),
    Commands::Apply { facts, output, json } => cmd::cmd_apply(&facts, output_format(output, json)),
    Commands::Status { output, json } => cmd::cmd_status(cli.verbose, output_format(output, json)),
    Commands::Info { output, json } => cmd::cmd_info(output_format(output, json)),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
