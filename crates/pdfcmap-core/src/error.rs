//! Error and option types for pdfcmap.
//!
//! Provides [`CMapError`] for failures that abort loading a CMap and
//! [`LoadOptions`] for configuring resource limits applied while parsing.
//! Missing lookups are never errors; they surface as `Option`/flag results.

use std::fmt;

/// Fatal error types for CMap loading.
///
/// These errors indicate that a CMap could not be produced. No partially
/// parsed CMap is ever returned alongside them.
#[derive(Debug, Clone, PartialEq)]
pub enum CMapError {
    /// Malformed operand in the CMap grammar (wrong arity or type, bad code width).
    InvalidOperand(String),
    /// Lexical error in the CMap text (bad hex digit, unterminated string, ...).
    Syntax(String),
    /// The CMap parsed but has no codespaces and no base CMap to inherit from.
    UnusableCMap(String),
    /// A predefined CMap with this name does not exist.
    NotFound(String),
    /// A configured resource limit was exceeded.
    ResourceLimitExceeded {
        /// Name of the limit that was exceeded (e.g., "max_range_len").
        limit_name: String,
        /// The configured limit value.
        limit_value: usize,
        /// The actual value that exceeded the limit.
        actual_value: usize,
    },
    /// I/O error reading CMap data.
    IoError(String),
}

impl CMapError {
    /// Build a [`CMapError::ResourceLimitExceeded`].
    pub fn limit(limit_name: &str, limit_value: usize, actual_value: usize) -> Self {
        CMapError::ResourceLimitExceeded {
            limit_name: limit_name.to_string(),
            limit_value,
            actual_value,
        }
    }
}

impl fmt::Display for CMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CMapError::InvalidOperand(msg) => write!(f, "invalid operand: {msg}"),
            CMapError::Syntax(msg) => write!(f, "syntax error: {msg}"),
            CMapError::UnusableCMap(name) => {
                write!(f, "unusable CMap {name:?}: no codespaces and no usecmap")
            }
            CMapError::NotFound(name) => write!(f, "CMap not found: {name}"),
            CMapError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})"
            ),
            CMapError::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for CMapError {}

impl From<std::io::Error> for CMapError {
    fn from(err: std::io::Error) -> Self {
        CMapError::IoError(err.to_string())
    }
}

/// Options controlling CMap loading and resource limits.
///
/// Resource limits stop pathological CMap streams (huge ranges, endless
/// `usecmap` chains) from consuming excessive memory or time.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Maximum CMap stream size in bytes (default: None = no limit).
    pub max_input_bytes: Option<usize>,
    /// Maximum number of codes a single cidrange/bfrange entry may cover (default: 65,536).
    pub max_range_len: u32,
    /// Maximum number of entries in a single mapping table (default: 1,048,576).
    pub max_mappings: usize,
    /// Maximum depth of nested `usecmap` references (default: 8).
    pub max_usecmap_depth: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: None,
            max_range_len: 0x1_0000,
            max_mappings: 1 << 20,
            max_usecmap_depth: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- CMapError tests ---

    #[test]
    fn invalid_operand_display() {
        let err = CMapError::InvalidOperand("expected hex string".to_string());
        assert_eq!(err.to_string(), "invalid operand: expected hex string");
    }

    #[test]
    fn syntax_display() {
        let err = CMapError::Syntax("unterminated array".to_string());
        assert_eq!(err.to_string(), "syntax error: unterminated array");
    }

    #[test]
    fn unusable_display() {
        let err = CMapError::UnusableCMap("Broken-H".to_string());
        assert_eq!(
            err.to_string(),
            "unusable CMap \"Broken-H\": no codespaces and no usecmap"
        );
    }

    #[test]
    fn not_found_display() {
        let err = CMapError::NotFound("UniGB-UCS2-H".to_string());
        assert_eq!(err.to_string(), "CMap not found: UniGB-UCS2-H");
    }

    #[test]
    fn resource_limit_exceeded() {
        let err = CMapError::limit("max_range_len", 65536, 70000);
        assert_eq!(
            err.to_string(),
            "resource limit exceeded: max_range_len (limit: 65536, actual: 70000)"
        );
        if let CMapError::ResourceLimitExceeded {
            limit_name,
            limit_value,
            actual_value,
        } = &err
        {
            assert_eq!(limit_name, "max_range_len");
            assert_eq!(*limit_value, 65536);
            assert_eq!(*actual_value, 70000);
        } else {
            panic!("expected ResourceLimitExceeded");
        }
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: CMapError = io_err.into();
        assert!(matches!(err, CMapError::IoError(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(CMapError::NotFound("X".to_string()));
        assert!(err.to_string().contains("X"));
    }

    #[test]
    fn clone_and_eq() {
        let err = CMapError::InvalidOperand("odd operands".to_string());
        assert_eq!(err.clone(), err);
        assert_ne!(err, CMapError::Syntax("odd operands".to_string()));
    }

    // --- LoadOptions tests ---

    #[test]
    fn load_options_defaults() {
        let opts = LoadOptions::default();
        assert_eq!(opts.max_input_bytes, None);
        assert_eq!(opts.max_range_len, 65536);
        assert_eq!(opts.max_mappings, 1_048_576);
        assert_eq!(opts.max_usecmap_depth, 8);
    }

    #[test]
    fn load_options_custom_values() {
        let opts = LoadOptions {
            max_input_bytes: Some(1024),
            max_range_len: 256,
            ..LoadOptions::default()
        };
        assert_eq!(opts.max_input_bytes, Some(1024));
        assert_eq!(opts.max_range_len, 256);
        assert_eq!(opts.max_usecmap_depth, 8);
    }
}
