//! The read → expand → eval pipeline shared by the interactive REPL and
//! the script runner. Neither `cozenage-reader` nor `cozenage-expander`
//! is a dependency of `cozenage-evaluator` (see that crate's own doc
//! comment) — this is the boundary crate where the three stages meet.

use cozenage_core::{Applyer, Cell, Env, Interner, SchemeError};
use cozenage_evaluator::Interpreter;
use cozenage_expander::Expander;
use cozenage_reader::Reader;

/// A freshly constructed interpreter with every primitive installed and
/// `(import (base NAME))` wired to the real shared-library loader.
pub struct Session {
    pub env: Env,
    pub interner: Interner,
    pub interp: Interpreter,
}

impl Session {
    pub fn new() -> Self {
        let env = Env::new_global();
        let mut interner = Interner::new();
        cozenage_runtime::install(&env, &mut interner);
        let interp = Interpreter::with_loader(Box::new(cozenage_runtime::CozenageLibraryLoader::new()));
        Session { env, interner, interp }
    }

    /// Read every top-level datum out of `source`, expand and evaluate
    /// each one in turn, and return the value of the last one. Used by
    /// the script runner (whole file at once).
    pub fn eval_source(&mut self, source: &str) -> Result<Cell, SchemeError> {
        let forms = Reader::new(source, &mut self.interner).read_all()?;
        let mut last = Cell::Unspecified;
        for form in forms {
            let expanded = Expander::new(&mut self.interner).expand(&form)?;
            last = self.interp.eval(&expanded, &self.env)?;
        }
        Ok(last)
    }

    /// Same pipeline as [`Session::eval_source`], but after each
    /// top-level `(set! name expr)` form it echoes the rebound value to
    /// stderr (spec §9's REPL-only feedback for `set!`'s otherwise
    /// Unspecified return value).
    pub fn eval_source_repl(&mut self, source: &str) -> Result<Cell, SchemeError> {
        let forms = Reader::new(source, &mut self.interner).read_all()?;
        let mut last = Cell::Unspecified;
        for form in forms {
            let expanded = Expander::new(&mut self.interner).expand(&form)?;
            let set_target = set_bang_target(&expanded);
            last = self.interp.eval(&expanded, &self.env)?;
            if let Some(sym) = set_target {
                if let Ok(value) = self.env.lookup(&sym) {
                    eprintln!("{}", cozenage_runtime::write_repr(&value));
                }
            }
        }
        Ok(last)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// If `expr` is `(set! name ...)`, return `name` so the REPL can look
/// its new value up after evaluating the form.
fn set_bang_target(expr: &Cell) -> Option<cozenage_core::Symbol> {
    let Cell::Pair(p) = expr else { return None };
    let p = p.borrow();
    let Cell::Symbol(head) = &p.car else { return None };
    if head.name.as_str() != "set!" {
        return None;
    }
    let Cell::Pair(rest) = &p.cdr else { return None };
    let Cell::Symbol(target) = &rest.borrow().car else { return None };
    Some(target.clone())
}

/// Whether a read failure means "the buffer isn't a complete datum yet"
/// rather than a genuine syntax error — the REPL keeps prompting for
/// more lines on the former and reports the latter immediately.
pub fn is_incomplete(err: &SchemeError) -> bool {
    err.message.starts_with("unterminated") || err.message == "unexpected end of input"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_source_returns_the_last_top_level_value() {
        let mut session = Session::new();
        let result = session.eval_source("(define x 10) (+ x 5)").unwrap();
        assert_eq!(result.to_string(), "15");
    }

    #[test]
    fn unterminated_list_is_reported_as_incomplete() {
        let mut session = Session::new();
        let err = session.eval_source("(+ 1 2").unwrap_err();
        assert!(is_incomplete(&err));
    }

    #[test]
    fn a_genuine_syntax_error_is_not_incomplete() {
        let mut session = Session::new();
        let err = session.eval_source(")").unwrap_err();
        assert!(!is_incomplete(&err));
    }

    #[test]
    fn eval_source_repl_rebinds_via_set_bang() {
        let mut session = Session::new();
        session.eval_source("(define x 1)").unwrap();
        let result = session.eval_source_repl("(set! x 2)").unwrap();
        assert!(matches!(result, Cell::Unspecified));
        assert_eq!(session.eval_source("x").unwrap().to_string(), "2");
    }
}
