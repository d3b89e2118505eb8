//! RPG conversion error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while converting a single statement.
///
/// None of these abort a conversion run: the orchestrator records them as
/// diagnostics and passes the offending statement through unchanged.
#[derive(Debug, Error, Diagnostic)]
pub enum RpgError {
    /// A statement whose layout could not be interpreted.
    #[error("line {line}: malformed statement: {reason}")]
    #[diagnostic(code(rpg::malformed_statement))]
    MalformedStatement {
        /// 0-based source line.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// A fixed-column field holds a value that is not legal there.
    #[error("line {line}: invalid {field} value '{value}'")]
    #[diagnostic(code(rpg::invalid_field))]
    InvalidField {
        /// 0-based source line.
        line: usize,
        /// Field name (e.g. "file type", "decimals").
        field: String,
        /// The offending text.
        value: String,
    },

    /// `END`/`ENDDO`/`ENDCS` with no block open above it.
    #[error("line {line}: block end has no matching opener")]
    #[diagnostic(
        code(rpg::unmatched_end),
        help("the opener may be outside the converted range")
    )]
    UnmatchedEnd {
        /// 0-based source line.
        line: usize,
    },

    /// An opcode that has no free-form equivalent.
    #[error("line {line}: {opcode} has no free-form equivalent")]
    #[diagnostic(code(rpg::unsupported_opcode))]
    UnsupportedOpcode {
        /// 0-based source line.
        line: usize,
        /// Opcode as written.
        opcode: String,
    },

    /// An opcode is missing an operand it cannot work without.
    #[error("line {line}: {opcode} requires {operand}")]
    #[diagnostic(code(rpg::missing_operand))]
    MissingOperand {
        /// 0-based source line.
        line: usize,
        /// Opcode as written.
        opcode: String,
        /// Operand name ("factor 2", "result field", ...).
        operand: String,
    },
}

impl RpgError {
    /// Source line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            RpgError::MalformedStatement { line, .. }
            | RpgError::InvalidField { line, .. }
            | RpgError::UnmatchedEnd { line }
            | RpgError::UnsupportedOpcode { line, .. }
            | RpgError::MissingOperand { line, .. } => *line,
        }
    }

    /// Stable diagnostic code, without the `rpg::` prefix.
    pub fn code(&self) -> &'static str {
        match self {
            RpgError::MalformedStatement { .. } => "malformed_statement",
            RpgError::InvalidField { .. } => "invalid_field",
            RpgError::UnmatchedEnd { .. } => "unmatched_end",
            RpgError::UnsupportedOpcode { .. } => "unsupported_opcode",
            RpgError::MissingOperand { .. } => "missing_operand",
        }
    }
}

/// Result type for RPG conversion.
pub type Result<T> = std::result::Result<T, RpgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RpgError::InvalidField {
            line: 4,
            field: "file type".to_string(),
            value: "X".to_string(),
        };
        assert_eq!(err.to_string(), "line 4: invalid file type value 'X'");
        assert_eq!(err.line(), 4);
        assert_eq!(err.code(), "invalid_field");
    }

    #[test]
    fn test_missing_operand_display() {
        let err = RpgError::MissingOperand {
            line: 0,
            opcode: "CHAIN".to_string(),
            operand: "factor 2".to_string(),
        };
        assert!(err.to_string().contains("CHAIN requires factor 2"));
    }
}
