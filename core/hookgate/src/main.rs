//! hookgate: run hook commands under a per-session concurrency slot.
//!
//! Hook runners launch each hook as its own process. Wrapping the command in
//! `hookgate run` makes every hook of the same session share one slot pool, so
//! at most `HOOKGATE_PARALLELISM` of them execute at once.
//!
//! ## Subcommands
//!
//! - `run`: Acquire a slot, run the command, release the slot
//! - `status`: Show who holds which slot in the current session
//! - `session`: Print the derived session id and lock directory

mod logging;
mod run;
mod signals;
mod status;

use clap::{Parser, Subcommand};
use hookgate_core::LockConfig;

#[derive(Parser)]
#[command(name = "hookgate")]
#[command(about = "Bounded concurrency for hook commands")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command while holding a slot
    Run {
        /// What is running (shown in status output)
        #[arg(long)]
        label: String,

        /// Finer-grained description, e.g. the plugin or hook name
        #[arg(long)]
        sub_label: Option<String>,

        /// Command and arguments, after `--`
        #[arg(last = true, required = true, value_name = "COMMAND")]
        command: Vec<String>,
    },

    /// Show slot occupancy for the current session
    Status {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the session id and lock directory
    Session,
}

fn main() {
    let cli = Cli::parse();
    let config = LockConfig::from_env();
    let logging_guard = logging::init(config.debug);

    let exit_code = match cli.command {
        Commands::Run {
            label,
            sub_label,
            command,
        } => match run::run(&config, &label, sub_label.as_deref(), &command) {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(error = %e, "hookgate run failed");
                eprintln!("hookgate: {}", e);
                1
            }
        },
        Commands::Status { json } => match status::run(&config, json) {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!(error = %e, "hookgate status failed");
                eprintln!("hookgate: {}", e);
                1
            }
        },
        Commands::Session => {
            status::print_session(&config);
            0
        }
    };

    // Flush buffered log lines before exiting.
    drop(logging_guard);
    std::process::exit(exit_code);
}
