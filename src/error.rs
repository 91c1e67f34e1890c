use crate::record::COLUMNS;
use std::{error, fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum ImportError {
    /// The input file does not carry the `.csv` extension.
    FormatError(PathBuf),

    /// IO error occured while opening or reading the input file.
    IoError(io::Error),

    /// The CSV reader failed to decode a row.
    ParseError(csv::Error),

    /// A row has fewer columns than the schema requires.
    MissingColumns {
        line: u64,
        found: usize,
        expected: usize,
    },

    /// The provisioning request could not be delivered or its response read.
    NetworkError(reqwest::Error),

    /// The provisioning response body is not valid JSON.
    DecodeError(serde_json::Error),

    /// The provisioning request body could not be serialized.
    EncodeError(serde_json::Error),

    /// The provisioning response lacks the token at the configured pointer.
    MissingField(String),

    /// The user id of a row is not a valid identifier.
    ValidationError { value: String, source: uuid::Error },

    /// The store rejected a write.
    PersistenceError(rusqlite::Error),

    /// A required setting is missing or invalid.
    ConfigError(String),
}

impl ImportError {
    /// Construct a MissingColumns error.
    pub fn missing_columns(line: u64, found: usize, expected: usize) -> Self {
        ImportError::MissingColumns {
            line,
            found,
            expected,
        }
    }

    /// Construct a ValidationError for an unparseable identifier.
    pub fn invalid_id(value: &str, source: uuid::Error) -> Self {
        ImportError::ValidationError {
            value: value.to_owned(),
            source,
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::FormatError(path) => {
                write!(f, "input file {} is not .csv", path.display())
            }
            ImportError::IoError(err) => write!(f, "io error: {err}"),
            ImportError::ParseError(err) => write!(f, "parse error: {err}"),
            ImportError::MissingColumns {
                line,
                found,
                expected,
            } => write!(
                f,
                "parse error: line {line} has {found} columns, expected at least {expected} (first missing: {})",
                COLUMNS.get(*found).unwrap_or(&"?")
            ),
            ImportError::NetworkError(err) => write!(f, "network error: {err}"),
            ImportError::DecodeError(err) => write!(f, "decode error: {err}"),
            ImportError::EncodeError(err) => write!(f, "encode error: {err}"),
            ImportError::MissingField(field) => {
                write!(f, "{field} is not found in JSON object from provisioning endpoint")
            }
            ImportError::ValidationError { value, source } => {
                write!(f, "invalid user id {value:?}: {source}")
            }
            ImportError::PersistenceError(err) => write!(f, "persistence error: {err}"),
            ImportError::ConfigError(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl From<io::Error> for ImportError {
    fn from(error: io::Error) -> Self {
        ImportError::IoError(error)
    }
}

impl From<csv::Error> for ImportError {
    fn from(error: csv::Error) -> Self {
        ImportError::ParseError(error)
    }
}

impl From<reqwest::Error> for ImportError {
    fn from(error: reqwest::Error) -> Self {
        ImportError::NetworkError(error)
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(error: rusqlite::Error) -> Self {
        ImportError::PersistenceError(error)
    }
}

impl error::Error for ImportError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ImportError::IoError(err) => Some(err),
            ImportError::ParseError(err) => Some(err),
            ImportError::NetworkError(err) => Some(err),
            ImportError::DecodeError(err) | ImportError::EncodeError(err) => Some(err),
            ImportError::ValidationError { source, .. } => Some(source),
            ImportError::PersistenceError(err) => Some(err),
            _ => None,
        }
    }
}
