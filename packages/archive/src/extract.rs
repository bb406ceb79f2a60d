use crate::error::{ArchiveError, ArchiveResult};
use sitecanvas_bundle::{classify_path, is_image_extension, FileKind, Project, SiteFile};
use sitecanvas_dom::{tag_html, IdIssuer};
use std::io::{Cursor, Read};
use tracing::warn;
use zip::result::ZipError;
use zip::ZipArchive;

pub const MAX_ARCHIVE_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_ENTRIES: usize = 500;

const FORBIDDEN_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "msi", "scr", "bat", "cmd", "sh", "ps1", "jar",
];

/// Cheap checks that run before any extraction work
pub fn validate_upload(file_name: &str, bytes: &[u8]) -> ArchiveResult<()> {
    if bytes.is_empty() {
        return Err(ArchiveError::Empty);
    }
    if bytes.len() as u64 > MAX_ARCHIVE_BYTES {
        return Err(ArchiveError::TooLarge {
            limit_mb: MAX_ARCHIVE_BYTES / (1024 * 1024),
        });
    }
    if !file_name.to_ascii_lowercase().ends_with(".zip") {
        return Err(ArchiveError::WrongExtension);
    }
    Ok(())
}

/// Extract an uploaded archive into a Project.
///
/// Validation is fail-fast: nothing is extracted until the archive as a
/// whole passes. Individual entries that fail to decode are logged and
/// skipped; a missing HTML file is only reported after the full archive
/// has been scanned.
pub fn process_archive(file_name: &str, bytes: &[u8], now_ms: u64) -> ArchiveResult<Project> {
    validate_upload(file_name, bytes)?;

    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|_| ArchiveError::Corrupted)?;

    if archive.len() > MAX_ENTRIES {
        return Err(ArchiveError::TooManyEntries { limit: MAX_ENTRIES });
    }

    // Scan pass: reject forbidden and encrypted entries before extracting
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(|_| ArchiveError::Corrupted)?;
        let name = entry.name().to_string();
        if entry.encrypted() {
            return Err(ArchiveError::PasswordProtected);
        }
        if !entry.is_dir() && is_forbidden_entry(&name) {
            return Err(ArchiveError::ForbiddenEntry { path: name });
        }
    }

    // Extraction pass: per-entry failures are skipped, not fatal
    let mut files = Vec::new();
    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(ZipError::UnsupportedArchive(message)) if message.contains("Password") => {
                return Err(ArchiveError::PasswordProtected);
            }
            Err(error) => {
                warn!(index, %error, "skipping unreadable archive entry");
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }
        let path = entry.name().to_string();
        let mut data = Vec::with_capacity(entry.size() as usize);
        if let Err(error) = entry.read_to_end(&mut data) {
            warn!(path, %error, "skipping entry that failed to read");
            continue;
        }

        let file = if is_binary_path(&path) {
            SiteFile::binary(path, data)
        } else {
            match String::from_utf8(data) {
                Ok(text) => SiteFile::text(path, text),
                Err(error) => {
                    warn!(path, %error, "skipping entry that is not valid UTF-8");
                    continue;
                }
            }
        };
        files.push(file);
    }

    let root_html_path = select_root_html(&files).ok_or(ArchiveError::NoHtml)?;

    // One issuer across every HTML file, so identifiers never collide
    // between pages of the same project
    let mut issuer = IdIssuer::new();
    for file in &mut files {
        if file.kind == FileKind::Html {
            if let Some(text) = file.as_text() {
                let tagged = tag_html(text, &mut issuer);
                file.size = Some(tagged.len() as u64);
                file.content = sitecanvas_bundle::FileContent::Text(tagged);
            }
        }
    }

    let name = project_name(file_name);
    Ok(Project::new(name, files, root_html_path, now_ms))
}

/// Root HTML precedence: a literal `index.html` anywhere wins, then any
/// top-level HTML file, then the first HTML file in entry order.
fn select_root_html(files: &[SiteFile]) -> Option<String> {
    let html = |file: &&SiteFile| file.kind == FileKind::Html;

    if let Some(file) = files
        .iter()
        .filter(html)
        .find(|f| f.basename().eq_ignore_ascii_case("index.html"))
    {
        return Some(file.path.clone());
    }
    if let Some(file) = files.iter().filter(html).find(|f| !f.path.contains('/')) {
        return Some(file.path.clone());
    }
    files.iter().find(|f| f.kind == FileKind::Html).map(|f| f.path.clone())
}

fn is_forbidden_entry(path: &str) -> bool {
    let basename = path.rsplit('/').next().unwrap_or(path);
    if path.starts_with("__MACOSX/") || path.contains("/__MACOSX/") {
        return true;
    }
    if basename.starts_with("._") || basename == ".DS_Store" {
        return true;
    }
    let ext = basename
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    FORBIDDEN_EXTENSIONS.contains(&ext.as_str())
}

fn is_binary_path(path: &str) -> bool {
    let ext = path
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    is_image_extension(&ext) || classify_path(path) == FileKind::Image
}

fn project_name(file_name: &str) -> String {
    let basename = file_name.rsplit('/').next().unwrap_or(file_name);
    basename
        .strip_suffix(".zip")
        .or_else(|| basename.strip_suffix(".ZIP"))
        .unwrap_or(basename)
        .to_string()
}
