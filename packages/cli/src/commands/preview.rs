use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use sitecanvas_archive::process_archive;
use sitecanvas_assembler::assemble_preview;
use std::path::PathBuf;

use super::inspect::now_ms;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Archive to assemble
    pub archive: PathBuf,

    /// Output file for the preview document
    #[arg(short, long, default_value = "preview.html")]
    pub out: PathBuf,
}

pub fn preview(args: PreviewArgs) -> Result<()> {
    let bytes = std::fs::read(&args.archive)?;
    let file_name = args
        .archive
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Invalid archive path: {:?}", args.archive))?;

    let project = process_archive(file_name, &bytes, now_ms())?;
    let html = assemble_preview(&project);
    if html.is_empty() {
        return Err(anyhow!("Project has no root HTML file"));
    }

    std::fs::write(&args.out, &html)?;
    println!(
        "{} Assembled {} → {} ({} bytes)",
        "✓".green(),
        project.root_html_path,
        args.out.display(),
        html.len()
    );
    Ok(())
}
