//! The error-kind taxonomy (spec §7) and the arity/type checking
//! helpers primitives use at their entry points.
//!
//! Two distinct error types live here, the way the teacher's codegen
//! crate keeps `CodeGenError::Logic` separate from `::Format`:
//!
//! - [`SchemeError`] is a first-class Scheme value: it is what a
//!   primitive or special-form handler returns to propagate a failure
//!   up through the evaluator, and it round-trips into a `Cell::Error`.
//! - Host-level plumbing failures (a malformed internal invariant) are
//!   not represented here at all — they are Rust `panic!`s, since they
//!   indicate a bug in this crate rather than a condition a Scheme
//!   program can observe or recover from.

use std::fmt;

/// The error-kind taxonomy from spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    General,
    File,
    Read,
    Syntax,
    Arity,
    Type,
    Index,
    Value,
    Os,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::General => "general",
            ErrorKind::File => "file",
            ErrorKind::Read => "read",
            ErrorKind::Syntax => "syntax",
            ErrorKind::Arity => "arity",
            ErrorKind::Type => "type",
            ErrorKind::Index => "index",
            ErrorKind::Value => "value",
            ErrorKind::Os => "os",
        };
        write!(f, "{s}")
    }
}

/// A Scheme-level error: message plus kind. This is the payload of
/// `Cell::Error`, and it also implements `std::error::Error` so it can
/// be threaded through host-level `Result`s (the reader and lexer raise
/// these directly, before any `Cell::Error` exists to wrap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SchemeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        SchemeError {
            kind,
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::General, message)
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, message)
    }

    pub fn arity(proc_name: &str, expected: &str, got: usize) -> Self {
        Self::new(
            ErrorKind::Arity,
            format!("{proc_name}: expected {expected} argument(s), got {got}"),
        )
    }

    pub fn wrong_type(proc_name: &str, expected: &str, got_desc: &str) -> Self {
        Self::new(
            ErrorKind::Type,
            format!("{proc_name}: expected {expected}, got {got_desc}"),
        )
    }

    pub fn index(proc_name: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Index, format!("{proc_name}: {}", message.into()))
    }

    pub fn unbound(name: &str) -> Self {
        Self::new(ErrorKind::General, format!("unbound symbol: '{name}'"))
    }
}

impl fmt::Display for SchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SchemeError {}

/// Exact/minimum/maximum/range arity checking, used at every primitive
/// entry point. Returns `Ok(())` on a satisfied arity, `Err` otherwise.
pub fn check_arity(proc_name: &str, got: usize, min: usize, max: Option<usize>) -> Result<(), SchemeError> {
    let ok = match max {
        Some(max) => got >= min && got <= max,
        None => got >= min,
    };
    if ok {
        return Ok(());
    }
    let expected = match max {
        Some(max) if max == min => format!("exactly {min}"),
        Some(max) => format!("between {min} and {max}"),
        None if min == 0 => "any number of".to_string(),
        None => format!("at least {min}"),
    };
    Err(SchemeError::arity(proc_name, &expected, got))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_arity_rejects_mismatch() {
        assert!(check_arity("car", 1, 1, Some(1)).is_ok());
        assert!(check_arity("car", 2, 1, Some(1)).is_err());
    }

    #[test]
    fn minimum_arity_allows_extra_args() {
        assert!(check_arity("+", 0, 0, None).is_ok());
        assert!(check_arity("list-ref", 1, 2, Some(2)).is_err());
    }

    #[test]
    fn range_arity() {
        assert!(check_arity("substring", 3, 2, Some(3)).is_ok());
        assert!(check_arity("substring", 1, 2, Some(3)).is_err());
    }
}
