//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic, ErrorKind};

/// Error while resolving a type reference.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("cannot resolve type `{reference}` in `{scope}`")]
    Unresolved {
        reference: String,
        scope: String,
        location: String,
    },

    #[error("type `{reference}` is ambiguous in `{scope}`")]
    Ambiguous {
        reference: String,
        scope: String,
        location: String,
        candidates: Vec<String>,
    },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Unresolved { .. } => ErrorKind::UnresolvedSymbol,
            ResolveError::Ambiguous { .. } => ErrorKind::AmbiguousSymbol,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::Unresolved {
                reference,
                scope,
                location,
            } => Diagnostic::error(format!("cannot resolve type `{}`", reference))
                .with_kind(self.kind())
                .with_context(format!("referenced from `{}` at {}", scope, location))
                .with_context("searched imports, the current module and its dependencies")
                .with_suggestion(suggestions::MISSING_DEPENDENCY),

            ResolveError::Ambiguous {
                reference,
                scope,
                location,
                candidates,
            } => {
                let mut diag = Diagnostic::error(format!("type `{}` is ambiguous", reference))
                    .with_kind(self.kind())
                    .with_context(format!("referenced from `{}` at {}", scope, location));

                for candidate in candidates {
                    diag = diag.with_context(format!("candidate: {}", candidate));
                }

                diag.with_suggestion(suggestions::AMBIGUOUS_IMPORT)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_diagnostic_lists_candidates() {
        let err = ResolveError::Ambiguous {
            reference: "Timeout".into(),
            scope: "com.acme.AppProperties".into(),
            location: "src/AppProperties.java:5".into(),
            candidates: vec!["com.acme.a.Timeout".into(), "com.acme.b.Timeout".into()],
        };

        let text = err.to_diagnostic().format(false);
        assert!(text.starts_with("error[AmbiguousSymbolError]: type `Timeout` is ambiguous"));
        assert!(text.contains("candidate: com.acme.a.Timeout"));
        assert!(text.contains("candidate: com.acme.b.Timeout"));
    }
}
