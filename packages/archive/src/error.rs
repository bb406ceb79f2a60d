use thiserror::Error;

pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Upload and extraction failures. Display strings double as the
/// user-facing messages, so they are phrased for the upload dialog.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("The uploaded file is empty")]
    Empty,

    #[error("File exceeds the {limit_mb} MB size limit")]
    TooLarge { limit_mb: u64 },

    #[error("Unsupported file type: expected a .zip archive")]
    WrongExtension,

    #[error("Archive contains too many entries: the maximum is {limit}")]
    TooManyEntries { limit: usize },

    #[error("Archive contains a forbidden entry: {path}")]
    ForbiddenEntry { path: String },

    #[error("The archive is corrupted or not a valid ZIP file")]
    Corrupted,

    #[error("Password-protected archives are not supported")]
    PasswordProtected,

    #[error("No HTML file found in the archive")]
    NoHtml,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
