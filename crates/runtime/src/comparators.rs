//! `eq?`/`eqv?`/`equal?` and the ordered numeric comparison chain
//! (spec §4.5), grounded on `original_source/src/comparators.c`.

use cozenage_core::{Cell, Env, Interner, Number, SchemeError, check_arity};
use std::rc::Rc;

use crate::registry::define_builtin;

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "eq?", Rc::new(|_a, _e, args| {
        check_arity("eq?", args.len(), 2, Some(2))?;
        Ok(Cell::boolean(args[0].eq(&args[1])))
    }));
    define_builtin(env, interner, "eqv?", Rc::new(|_a, _e, args| {
        check_arity("eqv?", args.len(), 2, Some(2))?;
        Ok(Cell::boolean(args[0].eqv(&args[1])))
    }));
    define_builtin(env, interner, "equal?", Rc::new(|_a, _e, args| {
        check_arity("equal?", args.len(), 2, Some(2))?;
        Ok(Cell::boolean(args[0].equal(&args[1])))
    }));

    define_builtin(env, interner, "=", Rc::new(|_a, _e, args| ordered("=", args, |o| o == std::cmp::Ordering::Equal, true)));
    define_builtin(env, interner, "<", Rc::new(|_a, _e, args| ordered("<", args, |o| o == std::cmp::Ordering::Less, false)));
    define_builtin(env, interner, ">", Rc::new(|_a, _e, args| ordered(">", args, |o| o == std::cmp::Ordering::Greater, false)));
    define_builtin(env, interner, "<=", Rc::new(|_a, _e, args| ordered("<=", args, |o| o != std::cmp::Ordering::Greater, false)));
    define_builtin(env, interner, ">=", Rc::new(|_a, _e, args| ordered(">=", args, |o| o != std::cmp::Ordering::Less, false)));
}

/// Shared chain-comparison shape for `=`/`<`/`<=`/`>=`/`>`: every
/// adjacent pair must satisfy `accept`. `=` uses `Number::num_eq`
/// directly (`use_num_eq`) since it must also treat non-real complex
/// numbers as comparable, which `partial_cmp_num` deliberately refuses.
fn ordered(proc: &str, args: &[Cell], accept: impl Fn(std::cmp::Ordering) -> bool, use_num_eq: bool) -> Result<Cell, SchemeError> {
    check_arity(proc, args.len(), 1, None)?;
    let numbers: Vec<&Number> = args
        .iter()
        .map(|c| match c {
            Cell::Number(n) => Ok(n),
            other => Err(SchemeError::wrong_type(proc, "a number", other.type_name())),
        })
        .collect::<Result<_, _>>()?;
    for pair in numbers.windows(2) {
        let ok = if use_num_eq {
            pair[0].num_eq(pair[1])
        } else {
            pair[0]
                .partial_cmp_num(pair[1])
                .map(&accept)
                .ok_or_else(|| SchemeError::wrong_type(proc, "a real number", "a non-real complex number"))?
        };
        if !ok {
            return Ok(Cell::boolean(false));
        }
    }
    Ok(Cell::boolean(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozenage_core::{Applyer, Procedure};

    struct NoopApplyer;
    impl Applyer for NoopApplyer {
        fn apply(&mut self, _p: &Cell, _a: Vec<Cell>, _e: &Env) -> Result<Cell, SchemeError> {
            unreachable!()
        }
        fn eval(&mut self, _e: &Cell, _env: &Env) -> Result<Cell, SchemeError> {
            unreachable!()
        }
    }

    fn call(env: &Env, interner: &mut Interner, name: &str, args: Vec<Cell>) -> Cell {
        let sym = interner.intern(name);
        let Cell::Procedure(p) = env.lookup(&sym).unwrap() else { panic!() };
        let Procedure::Builtin { func, .. } = p.as_ref() else { panic!() };
        func(&mut NoopApplyer, env, &args).unwrap()
    }

    #[test]
    fn eq_distinguishes_exactness_only_under_eqv() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        assert_eq!(call(&env, &mut interner, "=", vec![Cell::integer(2), Cell::Number(Number::Real(2.0))]).to_string(), "#t");
        assert_eq!(call(&env, &mut interner, "eqv?", vec![Cell::integer(2), Cell::Number(Number::Real(2.0))]).to_string(), "#f");
    }

    #[test]
    fn chained_less_than_checks_every_adjacent_pair() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let ok = call(&env, &mut interner, "<", vec![Cell::integer(1), Cell::integer(2), Cell::integer(3)]);
        assert_eq!(ok.to_string(), "#t");
        let fail = call(&env, &mut interner, "<", vec![Cell::integer(1), Cell::integer(3), Cell::integer(2)]);
        assert_eq!(fail.to_string(), "#f");
    }
}
