//! Real/transcendental math primitives (spec §4.5 supplement), grounded
//! on `original_source/src/numbers.c`'s `prim_sqrt`/`prim_expt`/trig
//! entries.

use cozenage_core::{Cell, Env, Interner, Number, SchemeError, check_arity};
use std::rc::Rc;

use crate::registry::define_builtin;

fn as_f64(proc: &str, c: &Cell) -> Result<f64, SchemeError> {
    match c {
        Cell::Number(n) => Ok(n.to_f64()),
        other => Err(SchemeError::wrong_type(proc, "a number", other.type_name())),
    }
}

fn define_unary(env: &Env, interner: &mut Interner, name: &'static str, f: impl Fn(f64) -> f64 + 'static) {
    define_builtin(env, interner, name, Rc::new(move |_a, _e, args| {
        check_arity(name, args.len(), 1, Some(1))?;
        Ok(Cell::Number(Number::Real(f(as_f64(name, &args[0])?))))
    }));
}

pub fn install(env: &Env, interner: &mut Interner) {
    define_unary(env, interner, "sqrt", f64::sqrt);
    define_unary(env, interner, "exp", f64::exp);
    define_unary(env, interner, "sin", f64::sin);
    define_unary(env, interner, "cos", f64::cos);
    define_unary(env, interner, "tan", f64::tan);
    define_unary(env, interner, "asin", f64::asin);
    define_unary(env, interner, "acos", f64::acos);

    define_builtin(env, interner, "log", Rc::new(|_a, _e, args| {
        check_arity("log", args.len(), 1, Some(2))?;
        let x = as_f64("log", &args[0])?;
        let result = match args.get(1) {
            Some(base) => x.log(as_f64("log", base)?),
            None => x.ln(),
        };
        Ok(Cell::Number(Number::Real(result)))
    }));
    define_builtin(env, interner, "atan", Rc::new(|_a, _e, args| {
        check_arity("atan", args.len(), 1, Some(2))?;
        let y = as_f64("atan", &args[0])?;
        let result = match args.get(1) {
            Some(x) => y.atan2(as_f64("atan", x)?),
            None => y.atan(),
        };
        Ok(Cell::Number(Number::Real(result)))
    }));
    define_builtin(env, interner, "floor", Rc::new(|_a, _e, args| round_like("floor", &args[0], f64::floor)));
    define_builtin(env, interner, "ceiling", Rc::new(|_a, _e, args| round_like("ceiling", &args[0], f64::ceil)));
    define_builtin(env, interner, "truncate", Rc::new(|_a, _e, args| round_like("truncate", &args[0], f64::trunc)));
    define_builtin(env, interner, "round", Rc::new(|_a, _e, args| round_like("round", &args[0], round_half_even)));

    // exact->inexact/inexact->exact live in `arithmetic`, next to the
    // rest of the numeric-tower conversions.
}

/// `round` is banker's rounding per R7RS (round-to-even on exact ties);
/// `f64::round` rounds half away from zero, so this corrects that case.
fn round_half_even(x: f64) -> f64 {
    let floor = x.floor();
    let diff = x - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if floor as i64 % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

fn round_like(proc: &str, c: &Cell, f: impl Fn(f64) -> f64) -> Result<Cell, SchemeError> {
    match c {
        Cell::Number(Number::Integer(i)) => Ok(Cell::integer(*i)),
        Cell::Number(n) => Ok(Cell::Number(Number::Real(f(n.to_f64())))),
        other => Err(SchemeError::wrong_type(proc, "a number", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozenage_core::Applyer;

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
        let cozenage_core::Procedure::Builtin { func, .. } = p.as_ref() else { panic!() };
        func(&mut NoopApplyer, env, &args).unwrap()
    }

    #[test]
    fn round_uses_round_to_even_on_exact_ties() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        assert_eq!(call(&env, &mut interner, "round", vec![Cell::Number(Number::Real(2.5))]).to_string(), "2.0");
        assert_eq!(call(&env, &mut interner, "round", vec![Cell::Number(Number::Real(3.5))]).to_string(), "4.0");
    }
}
