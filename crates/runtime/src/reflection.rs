//! Environment reification and `eval` (spec §8's end-to-end scenarios
//! require `(eval '(+ 1 2) (interaction-environment))` to work, though
//! neither is grounded in `original_source/` — the C implementation has
//! no first-class environments or embedded `eval` at all).
//!
//! `cozenage-evaluator`'s own doc comment names `cozenage-runtime`'s
//! `eval` primitive as one of the two places expansion happens for the
//! first time on a freshly-quoted form. A `BuiltinFn` only receives an
//! `Env` and an `Applyer`, not the `Interner` the caller read its
//! arguments with, so `eval` expands its argument through a fresh
//! throwaway `Interner` seeded with the same keyword table instead.
//! Global lookups resolve by name, not by interned `Symbol` identity
//! (see `Env::lookup`), so this is transparent for anything defined at
//! top level; only `eq?` comparisons against a symbol from the caller's
//! own interner could tell the difference, and `eval`'s argument is a
//! self-contained datum with no such symbols in scope.

use cozenage_core::{Cell, Env, Interner, Number, check_arity};
use std::rc::Rc;

use crate::registry::define_builtin;

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "interaction-environment", Rc::new(|_a, e, args| {
        check_arity("interaction-environment", args.len(), 0, Some(0))?;
        Ok(Cell::Environment(e.global_view()))
    }));
    define_builtin(env, interner, "eval", Rc::new(|a, e, args| {
        check_arity("eval", args.len(), 1, Some(2))?;
        let target = match args.get(1) {
            Some(Cell::Environment(env)) => env.clone(),
            Some(other) => return Err(cozenage_core::SchemeError::wrong_type("eval", "an environment", other.type_name())),
            None => e.clone(),
        };
        let mut scratch = Interner::new();
        cozenage_evaluator::install_keywords(&mut scratch);
        let expanded = cozenage_expander::Expander::new(&mut scratch).expand(&args[0])?;
        a.eval(&expanded, &target)
    }));
    define_builtin(env, interner, "iota", Rc::new(|_a, _e, args| iota(args)));
}

fn iota(args: &[Cell]) -> Result<Cell, cozenage_core::SchemeError> {
    check_arity("iota", args.len(), 1, Some(3))?;
    let count = match &args[0] {
        Cell::Number(Number::Integer(n)) if *n >= 0 => *n,
        other => return Err(cozenage_core::SchemeError::wrong_type("iota", "a non-negative exact integer", other.type_name())),
    };
    let start = number_arg("iota", args.get(1).unwrap_or(&Cell::integer(0)))?;
    let step = number_arg("iota", args.get(2).unwrap_or(&Cell::integer(1)))?;
    let mut items = Vec::with_capacity(count as usize);
    let mut current = start;
    for _ in 0..count {
        items.push(Cell::Number(current.clone()));
        current = current.add(step.clone());
    }
    Ok(Cell::list(items))
}

fn number_arg(proc: &str, c: &Cell) -> Result<Number, cozenage_core::SchemeError> {
    match c {
        Cell::Number(n) => Ok(n.clone()),
        other => Err(cozenage_core::SchemeError::wrong_type(proc, "a number", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozenage_core::Interner;

    fn call(env: &Env, interner: &mut Interner, name: &str, args: Vec<Cell>) -> Result<Cell, cozenage_core::SchemeError> {
        let sym = interner.intern(name);
        let Cell::Procedure(p) = env.lookup(&sym).unwrap() else { panic!() };
        let cozenage_core::Procedure::Builtin { func, .. } = p.as_ref() else { panic!() };
        let mut interp = cozenage_evaluator::Interpreter::new();
        func(&mut interp, env, &args)
    }

    #[test]
    fn iota_generates_a_count_length_list_from_start_by_step() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let result = call(&env, &mut interner, "iota", vec![Cell::integer(3), Cell::integer(10), Cell::integer(2)]).unwrap();
        assert_eq!(result.to_string(), "(10 12 14)");
    }

    #[test]
    fn interaction_environment_round_trips_through_eval() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let x = interner.intern("x");
        env.define_global(&x, Cell::integer(42));
        let ie = call(&env, &mut interner, "interaction-environment", vec![]).unwrap();
        assert!(matches!(ie, Cell::Environment(_)));
        let result = call(&env, &mut interner, "eval", vec![Cell::Symbol(x), ie]).unwrap();
        assert_eq!(result.to_string(), "42");
    }
}
