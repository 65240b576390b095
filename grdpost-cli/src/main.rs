use std::io::IsTerminal;

use clap::{Parser, Subcommand};
use grdpost::{GrdTree, traits::Parser as _};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use grdpost_cli::{ProcessOptions, build_release_view, print_view, run_process_command};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Group toolbar command strings and declare their offset identifiers.
    Process {
        /// The .grd file to process
        #[arg(short, long)]
        input: String,
        /// The file to write the processed tree to
        #[arg(short, long)]
        output: String,
        /// The .rc file the tree was converted from
        #[arg(long)]
        rc: Option<String>,
        /// Also group the last command string of the message list
        #[arg(long)]
        flush_trailing: bool,
        /// Prefix prepended to each offset (defaults to PCI_)
        #[arg(long)]
        offset_prefix: Option<String>,
    },

    /// Show the flat messages, identifiers and message groups of a .grd file.
    View {
        /// The .grd file to view
        #[arg(short, long)]
        input: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false)
                .without_time()
                .compact(),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_logging();

    match args.commands {
        Commands::Process {
            input,
            output,
            rc,
            flush_trailing,
            offset_prefix,
        } => {
            let options = ProcessOptions {
                rc,
                flush_trailing,
                offset_prefix,
            };
            if let Err(e) = run_process_command(input, output, options) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::View { input, json } => {
            let view = GrdTree::read_from(&input).and_then(|tree| build_release_view(&tree));
            match view {
                Ok(view) => {
                    if let Err(e) = print_view(&view, json) {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Error reading {}: {}", input, e);
                    std::process::exit(1);
                }
            }
        }
    }
}
