mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{export, inspect, preview, ExportArgs, InspectArgs, PreviewArgs};
use tracing_subscriber::EnvFilter;

/// Sitecanvas CLI - inspect, preview, and export site archives
#[derive(Parser, Debug)]
#[command(name = "sitecanvas")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an archive and list its contents
    Inspect(InspectArgs),

    /// Write the assembled preview document for an archive
    Preview(PreviewArgs),

    /// Round-trip an archive through processing and export
    Export(ExportArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Inspect(args) => inspect(args),
        Command::Preview(args) => preview(args),
        Command::Export(args) => export(args),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
