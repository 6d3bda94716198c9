//! The primitive operator registry (spec §4.5): wires every primitive
//! module's builtins into a global environment. `(import (base NAME))`
//! is handled separately by `crate::library::CozenageLibraryLoader`,
//! which walks the shared-library search path and `dlopen`s `NAME`
//! (spec §6) — this module only installs the primitives that ship with
//! the interpreter itself.

use cozenage_core::{BuiltinFn, Cell, Env, Interner, Procedure};
use std::rc::Rc;

/// Intern `name` and bind it in `env`'s global table to a
/// `Procedure::Builtin` wrapping `func`. Every primitive module's
/// `install` function is built out of repeated calls to this.
pub(crate) fn define_builtin(env: &Env, interner: &mut Interner, name: &str, func: BuiltinFn) {
    let sym = interner.intern(name);
    let proc = Procedure::Builtin {
        name: name.to_string(),
        func,
    };
    env.define_global(&sym, Cell::Procedure(Rc::new(proc)));
}

/// Install primitive special-form keywords and every primitive module's
/// builtins into `env`. Call once per interpreter instance, before
/// reading any source.
pub fn install(env: &Env, interner: &mut Interner) {
    cozenage_evaluator::install_keywords(interner);
    crate::arithmetic::install(env, interner);
    crate::comparators::install(env, interner);
    crate::predicates::install(env, interner);
    crate::pairs::install(env, interner);
    crate::strings::install(env, interner);
    crate::chars::install(env, interner);
    crate::vectors::install(env, interner);
    crate::ports::install(env, interner);
    crate::hashtables::install(env, interner);
    crate::sets::install(env, interner);
    crate::bits::install(env, interner);
    crate::inexact::install(env, interner);
    crate::process_context::install(env, interner);
    crate::file::install(env, interner);
    crate::random::install(env, interner);
    crate::streams::install(env, interner);
    crate::reflection::install(env, interner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_populates_known_primitives() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let plus = interner.intern("+");
        assert!(env.lookup(&plus).is_ok());
        let car = interner.intern("car");
        assert!(env.lookup(&car).is_ok());
    }
}
