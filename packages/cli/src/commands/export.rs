use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use sitecanvas_archive::process_archive;
use sitecanvas_assembler::export_project;
use std::path::PathBuf;

use super::inspect::now_ms;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Archive to round-trip
    pub archive: PathBuf,

    /// Output path; defaults to <project-name>-exported.zip
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn export(args: ExportArgs) -> Result<()> {
    let bytes = std::fs::read(&args.archive)?;
    let file_name = args
        .archive
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Invalid archive path: {:?}", args.archive))?;

    let project = process_archive(file_name, &bytes, now_ms())?;
    let exported = export_project(&project)?;

    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(&exported.file_name));
    std::fs::write(&out, &exported.bytes)?;
    println!(
        "{} Exported {} files → {} ({} bytes)",
        "✓".green(),
        project.files.len(),
        out.display(),
        exported.bytes.len()
    );
    Ok(())
}
