//! Cozenage Evaluator: the trampolining tree-walking interpreter (spec
//! §4.4) that sits on top of already-expanded `Cell` trees.
//!
//! This crate intentionally does not depend on `cozenage-expander`:
//! expansion happens exactly once, when a form first enters the system
//! (a freshly read top-level form, or the argument to `eval`/`load`),
//! at whichever boundary crate owns that entry point (`cozenage-repl`,
//! `cozenage-runtime`'s `eval` primitive). Everything this crate's
//! `Interpreter` evaluates is assumed to already be in primitive form:
//! `define`, `quote`, `lambda`, `if`, `let`, `letrec`, `set!`, `begin`,
//! `and`, `import`, `defmacro`, `delay`, `delay-force`, `stream`.
//!
//! # Modules
//!
//! - `eval`: the `Interpreter` struct and its trampoline loop.
//! - `special_forms`: the per-symbol special-form dispatch table.
//! - `apply`: procedure application, lambda formal binding, the
//!   `Trampoline` sentinel, and non-hygienic macro substitution.
//! - `promise`: `force`'s READY/LAZY/RUNNING/DONE trampoline.

pub mod apply;
pub mod eval;
pub mod promise;
pub mod special_forms;

pub use eval::{Interpreter, LibraryLoader};
pub use promise::force;
pub use special_forms::install_keywords;
