//! Diagnostics collected during a conversion run.
//!
//! A run never fails as a whole. Anything worth telling the user about a
//! statement (an opcode left in fixed form, a statement that could not be
//! converted) is recorded here against its 0-based source line.

use std::fmt;

use crate::error::RpgError;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational, e.g. an opcode deliberately left in fixed form.
    Info,
    /// The statement was converted but the result needs review.
    Warning,
    /// The statement could not be converted and was passed through.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A message about one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the diagnostic.
    pub severity: Severity,
    /// Stable code, e.g. `unsupported_opcode`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// 0-based source line.
    pub line: usize,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(code: impl Into<String>, message: impl Into<String>, line: usize) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            line,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(code: impl Into<String>, message: impl Into<String>, line: usize) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
            line,
        }
    }

    /// Create an info diagnostic.
    pub fn info(code: impl Into<String>, message: impl Into<String>, line: usize) -> Self {
        Self {
            severity: Severity::Info,
            code: code.into(),
            message: message.into(),
            line,
        }
    }

    /// Returns `true` if this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&RpgError> for Diagnostic {
    fn from(err: &RpgError) -> Self {
        let severity = match err {
            RpgError::UnsupportedOpcode { .. } => Severity::Info,
            RpgError::UnmatchedEnd { .. } => Severity::Warning,
            _ => Severity::Error,
        };
        Self {
            severity,
            code: err.code().to_string(),
            message: err.to_string(),
            line: err.line(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] line {}: {}",
            self.severity,
            self.code,
            self.line + 1,
            self.message
        )
    }
}
