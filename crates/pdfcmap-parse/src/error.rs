//! Error types for the tokenizer and grammar layers.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`ParseError`]
//! for lexing and interpretation failures and converts it to [`CMapError`]
//! at the public API boundary.

use pdfcmap_core::CMapError;
use thiserror::Error;

/// Error type for CMap tokenizing and grammar interpretation.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Malformed lexeme (bad hex digit, unterminated string or array, ...).
    #[error("CMap syntax error: {0}")]
    Syntax(String),

    /// Operand of the wrong type or arity for a CMap operator.
    #[error("invalid operand: {0}")]
    Operand(String),

    /// Error reading CMap data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] CMapError),
}

impl From<ParseError> for CMapError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Syntax(msg) => CMapError::Syntax(msg),
            ParseError::Operand(msg) => CMapError::InvalidOperand(msg),
            ParseError::Io(e) => CMapError::IoError(e.to_string()),
            ParseError::Core(e) => e,
        }
    }
}
