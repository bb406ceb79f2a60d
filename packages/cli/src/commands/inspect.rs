use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use sitecanvas_archive::process_archive;
use sitecanvas_bundle::FileKind;
use sitecanvas_dom::{parse, VISUAL_ID_ATTR};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Archive to inspect
    pub archive: PathBuf,
}

pub fn inspect(args: InspectArgs) -> Result<()> {
    let bytes = std::fs::read(&args.archive)?;
    let file_name = args
        .archive
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Invalid archive path: {:?}", args.archive))?;

    let project = process_archive(file_name, &bytes, now_ms())?;

    println!("{}", format!("📦 {}", project.name).bright_blue().bold());
    println!("   Root: {}", project.root_html_path.green());
    println!(
        "   Files: {} ({} bytes)",
        project.files.len(),
        project.total_bytes.unwrap_or(0)
    );
    println!();

    for file in &project.files {
        let kind = match file.kind {
            FileKind::Html => "html ".cyan(),
            FileKind::Css => "css  ".magenta(),
            FileKind::Js => "js   ".yellow(),
            FileKind::Image => "image".blue(),
            FileKind::Other => "other".dimmed(),
        };
        println!(
            "  {} {:>8}  {}",
            kind,
            file.size.unwrap_or(0),
            file.path
        );
    }

    let tagged: usize = project
        .html_files()
        .filter_map(|file| file.as_text())
        .map(|text| {
            let mut count = 0;
            parse(text).for_each_element(&mut |el| {
                if el.has_attr(VISUAL_ID_ATTR) {
                    count += 1;
                }
            });
            count
        })
        .sum();

    println!();
    println!(
        "{} {} elements tagged across {} HTML file(s)",
        "✓".green(),
        tagged,
        project.html_files().count()
    );

    Ok(())
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
