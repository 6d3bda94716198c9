//! Cozenage Core: the value model, interner, environment, and hash table
//! shared by the reader, expander, evaluator, and runtime crates.
//!
//! # Modules
//!
//! - `hashtable`: open-addressed FNV-1a hash table (interner + globals).
//! - `interner`: process-wide symbol interning on top of `hashtable`.
//! - `cell`: `Cell`, the tagged-union value every Scheme datum is made of.
//! - `number`: numeric-tower classification and promotion rules.
//! - `env`: the local-frame-chain-over-global-table environment model.
//! - `error`: the error-kind taxonomy and arity/type checking helpers.

pub mod cell;
pub mod env;
pub mod error;
pub mod hashtable;
pub mod interner;
pub mod number;

pub use cell::{
    Applyer, Bytevector, BytevectorKind, BuiltinFn, Cell, Formals, Pair, Port, PortDirection,
    PortHandle, PortMedium, Procedure, Promise, PromiseStatus, SchemeString, Stream,
};
pub use env::Env;
pub use error::{ErrorKind, SchemeError, check_arity};
pub use hashtable::HashTable;
pub use interner::{Interner, Symbol, symbol_eq};
pub use number::Number;
