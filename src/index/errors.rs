//! Index construction errors and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use super::classfile::ClassParseError;
use crate::java::JavaSyntaxError;
use crate::util::diagnostic::{Diagnostic, ErrorKind};

/// Error while registering modules or building the index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("module `{name}` is registered twice")]
    DuplicateModule { name: String },

    #[error("module not found: `{name}`")]
    ModuleNotFound { name: String },

    #[error("source root of module `{module}` does not exist: {}", path.display())]
    MissingRoot { module: String, path: PathBuf },

    #[error("duplicate type `{qualified_name}`")]
    DuplicateType {
        qualified_name: String,
        first: String,
        second: String,
    },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Syntax(Box<JavaSyntaxError>),

    #[error("failed to read archive {}", path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("malformed class file {}: {source}", path.display())]
    ClassFile {
        path: PathBuf,
        #[source]
        source: ClassParseError,
    },

    #[error("malformed surface descriptor {}: {message}", path.display())]
    Descriptor { path: PathBuf, message: String },
}

impl IndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexError::DuplicateType { .. } => ErrorKind::DuplicateType,
            _ => ErrorKind::Input,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = match self {
            IndexError::DuplicateModule { name } => {
                Diagnostic::error(format!("module `{}` is registered twice", name))
                    .with_suggestion("Give every module a unique name")
            }

            IndexError::ModuleNotFound { name } => {
                Diagnostic::error(format!("could not find module `{}`", name))
                    .with_suggestion("Check the module names listed as dependencies")
            }

            IndexError::MissingRoot { module, path } => Diagnostic::error(format!(
                "source root of module `{}` does not exist",
                module
            ))
            .with_location(path),

            IndexError::DuplicateType {
                qualified_name,
                first,
                second,
            } => Diagnostic::error(format!(
                "type `{}` is declared twice with different signatures",
                qualified_name
            ))
            .with_context(format!("first declared at {}", first))
            .with_context(format!("also declared at {}", second))
            .with_suggestion("Remove one declaration or drop the stale archive"),

            IndexError::Io { path, source } => {
                Diagnostic::error(format!("failed to read file: {}", source)).with_location(path)
            }

            IndexError::Syntax(err) => Diagnostic::error(err.message.clone())
                .with_location(&err.path)
                .with_context(format!("line {}", err.line)),

            IndexError::Zip { path, source } => {
                Diagnostic::error(format!("failed to open archive: {}", source)).with_location(path)
            }

            IndexError::ClassFile { path, source } => {
                Diagnostic::error(format!("malformed class file: {}", source))
                    .with_location(path)
                    .with_suggestion("Rebuild the archive with a supported compiler")
            }

            IndexError::Descriptor { path, message } => {
                Diagnostic::error(format!("malformed surface descriptor: {}", message))
                    .with_location(path)
            }
        };

        diag.with_kind(self.kind())
    }
}

impl From<JavaSyntaxError> for IndexError {
    fn from(err: JavaSyntaxError) -> Self {
        IndexError::Syntax(Box::new(err))
    }
}
