//! User-friendly diagnostic messages.
//!
//! Every error reported to the user names its [`ErrorKind`], the offending
//! declaration or value, and where possible a suggested fix.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when a referenced type is missing from the index.
    pub const MISSING_DEPENDENCY: &str =
        "help: Add the module or archive declaring it with `--dependency <path>`";

    /// Suggestion when a simple name matches several imports.
    pub const AMBIGUOUS_IMPORT: &str =
        "help: Replace the wildcard imports with a single-type import";

    /// Suggestion when holders nest each other.
    pub const BREAK_CYCLE: &str =
        "help: Mark one side of the cycle as an opaque type or remove the nesting";

    /// Suggestion when the repository rejects credentials.
    pub const CHECK_TOKEN: &str =
        "help: Check the token passed with `--token` or the CONFMETA_TOKEN variable";

    /// Suggestion for transient publish failures.
    pub const RETRY_LATER: &str =
        "help: Check your network connection and run `confmeta publish` again";
}

/// The error kinds a run can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateType,
    UnresolvedSymbol,
    AmbiguousSymbol,
    CyclicHolder,
    MetadataConflict,
    Serialization,
    PublishAuth,
    PublishTransient,
    PublishRejected,
    /// I/O, syntax or configuration problems outside the kinds above.
    Input,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DuplicateType => "DuplicateTypeError",
            ErrorKind::UnresolvedSymbol => "UnresolvedSymbolError",
            ErrorKind::AmbiguousSymbol => "AmbiguousSymbolError",
            ErrorKind::CyclicHolder => "CyclicHolderError",
            ErrorKind::MetadataConflict => "MetadataConflictError",
            ErrorKind::Serialization => "SerializationError",
            ErrorKind::PublishAuth => "PublishAuthError",
            ErrorKind::PublishTransient => "PublishTransientError",
            ErrorKind::PublishRejected => "PublishRejectedError",
            ErrorKind::Input => "InputError",
            ErrorKind::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
    /// Error kind shown next to the severity
    pub kind: Option<ErrorKind>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
            kind: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
            kind: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Tag the diagnostic with an error kind.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        // Severity prefix with optional color
        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
                Severity::Help => "\x1b[1;32mhelp\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
                Severity::Help => "help",
            }
        };

        // Main message
        match self.kind {
            Some(kind) => output.push_str(&format!("{}[{}]: {}\n", severity_str, kind, self.message)),
            None => output.push_str(&format!("{}: {}\n", severity_str, self.message)),
        }

        // Location if present
        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        // Context lines
        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        // Suggestions
        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
