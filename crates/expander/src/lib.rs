//! Cozenage Expander: the pure tree-rewrite pass (spec §4.3) that turns
//! derived syntax into the primitive forms the evaluator's special-form
//! dispatch table actually knows about.

pub mod expand;

pub use expand::Expander;
