//! The canonical wire document.
//!
//! A document is a JSON object with `groups`, `properties` and (when
//! present) `hints`, each sorted by name. Field order is fixed by the model
//! types, output is pretty-printed with two-space indentation and ends with
//! a newline, so equal models always render to identical bytes.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::model::MetadataModel;
use crate::util::diagnostic::{Diagnostic, ErrorKind};

/// A document could not be written or read.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("malformed metadata document{}: {message} (line {line}, column {column})", origin(.path))]
    Malformed {
        path: Option<PathBuf>,
        message: String,
        line: usize,
        column: usize,
    },

    #[error("failed to read metadata document {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode metadata document: {0}")]
    Encode(#[source] serde_json::Error),
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

impl SerializationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Serialization
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string()).with_kind(self.kind());
        match self {
            SerializationError::Malformed { path: Some(path), .. }
            | SerializationError::Io { path, .. } => diag.with_location(path.clone()),
            _ => diag,
        }
    }

    fn malformed(path: Option<&Path>, err: serde_json::Error) -> Self {
        SerializationError::Malformed {
            path: path.map(Path::to_path_buf),
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

/// Render `model` as a canonical document.
pub fn to_document(model: &MetadataModel) -> Result<Vec<u8>, SerializationError> {
    let canonical = model.canonical();
    let mut bytes = serde_json::to_vec_pretty(&canonical).map_err(SerializationError::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// [`to_document`] as a string.
pub fn to_string(model: &MetadataModel) -> Result<String, SerializationError> {
    let bytes = to_document(model)?;
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse a document. Entries keep the order they appear in.
pub fn from_slice(bytes: &[u8]) -> Result<MetadataModel, SerializationError> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::malformed(None, e))
}

/// Read and parse a document from disk.
pub fn read_document(path: &Path) -> Result<MetadataModel, SerializationError> {
    let bytes = std::fs::read(path).map_err(|source| SerializationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| SerializationError::malformed(Some(path), e))
}
