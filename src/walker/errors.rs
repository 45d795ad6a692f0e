//! Walk errors.

use thiserror::Error;

use crate::resolver::ResolveError;
use crate::util::diagnostic::{suggestions, Diagnostic, ErrorKind};

/// Error that ends the walk of one root.
#[derive(Debug, Clone, Error)]
pub enum WalkError {
    #[error("configuration holder `{root}` nests itself through `{}`", cycle.join(" -> "))]
    CyclicHolder {
        root: String,
        /// Holder types along the cycle, the repeated type last.
        cycle: Vec<String>,
        /// Property name at which the cycle closes.
        property: String,
        location: String,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl WalkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalkError::CyclicHolder { .. } => ErrorKind::CyclicHolder,
            WalkError::Resolve(err) => err.kind(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            WalkError::CyclicHolder {
                root,
                cycle,
                property,
                location,
            } => Diagnostic::error(format!("configuration holder `{}` nests itself", root))
                .with_kind(self.kind())
                .with_context(format!("cycle: {}", cycle.join(" -> ")))
                .with_context(format!("closed by property `{}` at {}", property, location))
                .with_suggestion(suggestions::BREAK_CYCLE),
            WalkError::Resolve(err) => err.to_diagnostic(),
        }
    }
}
