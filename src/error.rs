use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the filesystem facade.
///
/// Callers only ever see the normalized kinds; backend-level variants
/// (`OpenDal`, `Io`, `Backend`, `ObjectNotFound` raised by an adapter) show up
/// boxed inside their `source` field.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Environment variable '{key}' is required but not found"))]
    MissingEnvVar { key: String },

    #[snafu(display("Invalid value '{value}' for setting '{key}'"))]
    InvalidSetting { key: String, value: String },

    #[snafu(display("Invalid settings document: {source}"))]
    ParseSettings { source: serde_json::Error },

    #[snafu(display("Unsupported storage provider: {provider}"))]
    UnsupportedProvider { provider: String },

    #[snafu(display("Unable to construct storage adapter: {source}"))]
    AdapterInit { source: Box<Error> },

    #[snafu(display("Unable to list files{}: {source}", if path.is_empty() { String::new() } else { format!(" in {path}") }))]
    ListFailed { path: String, source: Box<Error> },

    #[snafu(display("Unable to get {what} for '{path}': {source}"))]
    MetadataUnavailable {
        path: String,
        what: &'static str,
        source: Box<Error>,
    },

    #[snafu(display("Unable to write to '{path}': {source}"))]
    WriteFailed { path: String, source: Box<Error> },

    #[snafu(display("Unable to read '{path}': {source}"))]
    ReadFailed { path: String, source: Box<Error> },

    #[snafu(display("Unable to check if '{path}' exists: {source}"))]
    ExistenceCheckFailed { path: String, source: Box<Error> },

    #[snafu(display("Unable to move '{path}' to '{new_path}': {source}"))]
    MoveFailed {
        path: String,
        new_path: String,
        source: Box<Error>,
    },

    #[snafu(display("Unable to copy '{path}' to '{new_path}': {source}"))]
    CopyFailed {
        path: String,
        new_path: String,
        source: Box<Error>,
    },

    #[snafu(display("Unable to create directory '{path}': {source}"))]
    DirectoryCreateFailed { path: String, source: Box<Error> },

    #[snafu(display("Unable to delete directory '{path}': {source}"))]
    DirectoryDeleteFailed { path: String, source: Box<Error> },

    #[snafu(display("Partial rename of '{path}': {} file(s) failed to move: {}", failed_paths.len(), failed_paths.join(", ")))]
    PartialRename {
        path: String,
        failed_paths: Vec<String>,
        source: Box<Error>,
    },

    #[snafu(display("Invalid path: {path}"))]
    InvalidPath { path: String },

    #[snafu(display("No object exists at path: {path}"))]
    ObjectNotFound { path: String },

    #[snafu(display("Backend error: {message}"))]
    Backend { message: String },

    #[snafu(display("OpenDAL error: {source}"))]
    OpenDal { source: opendal::Error },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },
}

impl Error {
    /// The cause carried by a normalized error kind, if any.
    pub fn underlying(&self) -> Option<&Error> {
        match self {
            Error::AdapterInit { source }
            | Error::ListFailed { source, .. }
            | Error::MetadataUnavailable { source, .. }
            | Error::WriteFailed { source, .. }
            | Error::ReadFailed { source, .. }
            | Error::ExistenceCheckFailed { source, .. }
            | Error::MoveFailed { source, .. }
            | Error::CopyFailed { source, .. }
            | Error::DirectoryCreateFailed { source, .. }
            | Error::DirectoryDeleteFailed { source, .. }
            | Error::PartialRename { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<opendal::Error> for Error {
    fn from(error: opendal::Error) -> Self {
        Error::OpenDal { source: error }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { source: error }
    }
}
