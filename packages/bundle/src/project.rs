use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generate a project ID from its name using CRC32
pub fn get_project_id(name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Html,
    Css,
    Js,
    Image,
    Other,
}

/// Classify a file path by its extension
pub fn classify_path(path: &str) -> FileKind {
    let ext = path
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => FileKind::Html,
        "css" => FileKind::Css,
        "js" | "mjs" => FileKind::Js,
        _ if is_image_extension(&ext) => FileKind::Image,
        _ => FileKind::Other,
    }
}

pub fn is_image_extension(ext: &str) -> bool {
    matches!(
        ext,
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "bmp" | "avif"
    )
}

/// File payload: markup/style/script files are text, images stay opaque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(text) => Some(text),
            FileContent::Binary(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FileContent::Text(text) => text.len(),
            FileContent::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One entry of a Project. Paths are unique within a project and stable
/// for re-export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteFile {
    pub path: String,
    pub content: FileContent,
    pub kind: FileKind,
    pub size: Option<u64>,
}

impl SiteFile {
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let content = content.into();
        Self {
            kind: classify_path(&path),
            size: Some(content.len() as u64),
            content: FileContent::Text(content),
            path,
        }
    }

    pub fn binary(path: impl Into<String>, content: Vec<u8>) -> Self {
        let path = path.into();
        Self {
            kind: classify_path(&path),
            size: Some(content.len() as u64),
            content: FileContent::Binary(content),
            path,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        self.content.as_text()
    }

    /// Final path component
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectError {
    #[error("Root HTML file not found: {path}")]
    MissingRoot { path: String },

    #[error("Root file is not HTML: {path}")]
    RootNotHtml { path: String },

    #[error("Duplicate file path: {path}")]
    DuplicatePath { path: String },
}

/// The in-memory representation of an uploaded site.
///
/// Immutable by convention: every committed mutation clones the project
/// first, so history snapshots never share structure with the live value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub files: Vec<SiteFile>,
    pub root_html_path: String,
    pub updated_at_ms: u64,
    pub total_bytes: Option<u64>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        files: Vec<SiteFile>,
        root_html_path: impl Into<String>,
        now_ms: u64,
    ) -> Self {
        let name = name.into();
        let total_bytes = files.iter().map(|f| f.size.unwrap_or(0)).sum::<u64>();
        Self {
            id: get_project_id(&name),
            name,
            files,
            root_html_path: root_html_path.into(),
            updated_at_ms: now_ms,
            total_bytes: Some(total_bytes),
        }
    }

    pub fn file(&self, path: &str) -> Option<&SiteFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn file_mut(&mut self, path: &str) -> Option<&mut SiteFile> {
        self.files.iter_mut().find(|f| f.path == path)
    }

    pub fn root_file(&self) -> Option<&SiteFile> {
        self.file(&self.root_html_path)
    }

    pub fn html_files(&self) -> impl Iterator<Item = &SiteFile> {
        self.files.iter().filter(|f| f.kind == FileKind::Html)
    }

    pub fn css_files(&self) -> impl Iterator<Item = &SiteFile> {
        self.files.iter().filter(|f| f.kind == FileKind::Css)
    }

    pub fn touch(&mut self, now_ms: u64) {
        self.updated_at_ms = now_ms;
    }

    /// Check the structural invariants: unique paths, and exactly one
    /// HTML-classified file at the root path.
    pub fn validate(&self) -> Result<(), ProjectError> {
        let mut seen = std::collections::HashSet::new();
        for file in &self.files {
            if !seen.insert(file.path.as_str()) {
                return Err(ProjectError::DuplicatePath {
                    path: file.path.clone(),
                });
            }
        }
        match self.root_file() {
            None => Err(ProjectError::MissingRoot {
                path: self.root_html_path.clone(),
            }),
            Some(file) if file.kind != FileKind::Html => Err(ProjectError::RootNotHtml {
                path: file.path.clone(),
            }),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        Project::new(
            "site",
            vec![
                SiteFile::text("index.html", "<html></html>"),
                SiteFile::text("css/style.css", ".a { color: red; }"),
                SiteFile::binary("img/logo.png", vec![0x89, 0x50, 0x4e, 0x47]),
            ],
            "index.html",
            1000,
        )
    }

    #[test]
    fn project_id_is_stable() {
        assert_eq!(get_project_id("site"), get_project_id("site"));
        assert_ne!(get_project_id("site"), get_project_id("other"));
    }

    #[test]
    fn classification_by_extension() {
        assert_eq!(classify_path("a/b/index.html"), FileKind::Html);
        assert_eq!(classify_path("page.HTM"), FileKind::Html);
        assert_eq!(classify_path("style.css"), FileKind::Css);
        assert_eq!(classify_path("app.js"), FileKind::Js);
        assert_eq!(classify_path("logo.png"), FileKind::Image);
        assert_eq!(classify_path("readme.txt"), FileKind::Other);
        assert_eq!(classify_path("no_extension"), FileKind::Other);
    }

    #[test]
    fn validate_accepts_well_formed_project() {
        assert!(sample_project().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_root() {
        let mut project = sample_project();
        project.root_html_path = "other.html".to_string();
        assert_eq!(
            project.validate(),
            Err(ProjectError::MissingRoot {
                path: "other.html".to_string()
            })
        );
    }

    #[test]
    fn validate_rejects_duplicate_paths() {
        let mut project = sample_project();
        project.files.push(SiteFile::text("index.html", ""));
        assert!(matches!(
            project.validate(),
            Err(ProjectError::DuplicatePath { .. })
        ));
    }

    #[test]
    fn clone_is_structurally_independent() {
        let original = sample_project();
        let mut copy = original.clone();
        if let Some(file) = copy.file_mut("index.html") {
            file.content = FileContent::Text("<html><body></body></html>".to_string());
        }
        assert_eq!(
            original.file("index.html").unwrap().as_text(),
            Some("<html></html>")
        );
    }

    #[test]
    fn basename_strips_directories() {
        let file = SiteFile::text("a/b/style.css", "");
        assert_eq!(file.basename(), "style.css");
    }
}
