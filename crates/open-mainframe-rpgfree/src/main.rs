//! CLI for converting fixed-format RPG IV to free-format RPG IV.
//!
//! # Examples
//!
//! ```bash
//! # Convert a member, writing the result next to it
//! rpgfree convert ORDENTRY.rpgle -o ORDENTRY.free.rpgle
//!
//! # Convert only lines 120 through 180
//! rpgfree convert ORDENTRY.rpgle --lines 120:180
//!
//! # Show how the member splits into statements
//! rpgfree statements ORDENTRY.rpgle
//! ```

use std::ops::RangeInclusive;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use miette::Result;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(name = "rpgfree")]
#[command(author, version, about = "Fixed-format to free-format RPG IV converter", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a fixed-format source member
    Convert {
        /// Input RPG IV source member
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file path (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Only convert statements touching this 1-based line range
        #[arg(long, value_name = "FROM:TO", value_parser = commands::convert::parse_line_range)]
        lines: Option<RangeInclusive<usize>>,

        /// Additional configuration file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Column where statements start
        #[arg(long, value_name = "COL")]
        left_margin: Option<usize>,

        /// Append INZ to data structures
        #[arg(long)]
        add_inz: bool,

        /// Do not read the member's own definitions for operand types
        #[arg(long)]
        no_symbols: bool,
    },

    /// Show the collected statements of a member (for debugging)
    Statements {
        /// Input RPG IV source member
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the default configuration
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            lines,
            config,
            left_margin,
            add_inz,
            no_symbols,
        } => {
            commands::convert::run(commands::convert::ConvertArgs {
                input,
                output,
                lines,
                config,
                left_margin,
                add_inz,
                no_symbols,
            })
            .await
        }
        Commands::Statements { input } => commands::statements::run(input),
        Commands::Config => commands::show_config(),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "rpgfree", &mut std::io::stdout());
            Ok(())
        }
    }
}
