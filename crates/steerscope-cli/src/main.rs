//! CLI for steerscope: compare baseline and steered activation traces.

mod commands;
mod tui;

use clap::{Parser, Subcommand};
use steerscope_core::Side;

#[derive(Parser)]
#[command(name = "steerscope")]
#[command(about = "steerscope: compare baseline and steered activation traces token by token")]
#[command(version = steerscope_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tokens of one trace. Use --index to show one token's analysis.
    Inspect {
        /// Path to a trace JSON file
        path: String,

        /// Which pane the trace belongs to: baseline or steered (affects headings only)
        #[arg(long, default_value = "baseline", value_parser = clap::value_parser!(Side))]
        side: Side,

        /// Token position to analyze
        #[arg(long)]
        index: Option<usize>,

        /// Print the view model as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Decimal places for probabilities (overrides --config)
        #[arg(long)]
        precision: Option<usize>,

        /// Path to a display config JSON file
        #[arg(long)]
        config: Option<String>,
    },

    /// Analyze one selected token from each of a baseline and a steered trace
    Compare {
        /// Baseline trace JSON file
        #[arg(long)]
        baseline: String,

        /// Steered trace JSON file
        #[arg(long)]
        steered: String,

        /// Token position to analyze in the baseline trace
        #[arg(long)]
        baseline_index: Option<usize>,

        /// Token position to analyze in the steered trace
        #[arg(long)]
        steered_index: Option<usize>,

        /// Print the view model as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Decimal places for probabilities (overrides --config)
        #[arg(long)]
        precision: Option<usize>,

        /// Path to a display config JSON file
        #[arg(long)]
        config: Option<String>,
    },

    /// Interactive side-by-side dashboard (TUI)
    Dashboard {
        /// Baseline trace JSON file (can be loaded later with `r`)
        #[arg(long)]
        baseline: Option<String>,

        /// Steered trace JSON file
        #[arg(long)]
        steered: Option<String>,

        /// Decimal places for probabilities (overrides --config)
        #[arg(long)]
        precision: Option<usize>,

        /// Path to a display config JSON file
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            path,
            side,
            index,
            json,
            precision,
            config,
        } => commands::inspect::run(commands::inspect::InspectCommandConfig {
            path: &path,
            side,
            index,
            json,
            display: commands::display_config(config.as_deref(), precision),
        }),
        Commands::Compare {
            baseline,
            steered,
            baseline_index,
            steered_index,
            json,
            precision,
            config,
        } => commands::compare::run(commands::compare::CompareCommandConfig {
            baseline_path: &baseline,
            steered_path: &steered,
            baseline_index,
            steered_index,
            json,
            display: commands::display_config(config.as_deref(), precision),
        }),
        Commands::Dashboard {
            baseline,
            steered,
            precision,
            config,
        } => commands::dashboard::run(
            baseline.as_deref(),
            steered.as_deref(),
            commands::display_config(config.as_deref(), precision),
        ),
    }
}
