//! The numeric tower's arithmetic primitives (spec §3/§4.5), built
//! directly on `cozenage_core::Number`'s promotion-and-dispatch methods
//! so this module stays a thin argument-checking shell around them.
//!
//! Grounded on `original_source/src/numbers.c`'s primitive dispatch
//! table (`prim_add`/`prim_sub`/`prim_mul`/`prim_div`, `quotient`/
//! `remainder`/`modulo`, `expt`, `exact->inexact`/`inexact->exact`).

use cozenage_core::{Cell, Env, Interner, Number, SchemeError, check_arity};
use cozenage_reader::parse_number;

use crate::registry::define_builtin;

fn as_number(proc: &str, c: &Cell) -> Result<Number, SchemeError> {
    match c {
        Cell::Number(n) => Ok(n.clone()),
        other => Err(SchemeError::wrong_type(proc, "a number", other.type_name())),
    }
}

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "+", std::rc::Rc::new(|_a, _e, args| {
        let mut acc = Number::Integer(0);
        for arg in args {
            acc = acc.add(as_number("+", arg)?);
        }
        Ok(Cell::Number(acc))
    }));

    define_builtin(env, interner, "*", std::rc::Rc::new(|_a, _e, args| {
        let mut acc = Number::Integer(1);
        for arg in args {
            acc = acc.mul(as_number("*", arg)?);
        }
        Ok(Cell::Number(acc))
    }));

    define_builtin(env, interner, "-", std::rc::Rc::new(|_a, _e, args| {
        check_arity("-", args.len(), 1, None)?;
        let first = as_number("-", &args[0])?;
        if args.len() == 1 {
            return Ok(Cell::Number(first.neg()));
        }
        let mut acc = first;
        for arg in &args[1..] {
            acc = acc.sub(as_number("-", arg)?);
        }
        Ok(Cell::Number(acc))
    }));

    define_builtin(env, interner, "/", std::rc::Rc::new(|_a, _e, args| {
        check_arity("/", args.len(), 1, None)?;
        let first = as_number("/", &args[0])?;
        let divide_by_zero = || SchemeError::new(cozenage_core::ErrorKind::Value, "/: division by exact zero");
        if args.len() == 1 {
            return Number::Integer(1).div(first).map(Cell::Number).ok_or_else(divide_by_zero);
        }
        let mut acc = first;
        for arg in &args[1..] {
            acc = acc.div(as_number("/", arg)?).ok_or_else(divide_by_zero)?;
        }
        Ok(Cell::Number(acc))
    }));

    define_builtin(env, interner, "quotient", std::rc::Rc::new(|_a, _e, args| {
        check_arity("quotient", args.len(), 2, Some(2))?;
        int_binop("quotient", &args[0], &args[1], i64::checked_div)
    }));

    define_builtin(env, interner, "remainder", std::rc::Rc::new(|_a, _e, args| {
        check_arity("remainder", args.len(), 2, Some(2))?;
        int_binop("remainder", &args[0], &args[1], i64::checked_rem)
    }));

    define_builtin(env, interner, "modulo", std::rc::Rc::new(|_a, _e, args| {
        check_arity("modulo", args.len(), 2, Some(2))?;
        int_binop("modulo", &args[0], &args[1], i64::checked_rem_euclid)
    }));

    define_builtin(env, interner, "abs", std::rc::Rc::new(|_a, _e, args| {
        check_arity("abs", args.len(), 1, Some(1))?;
        let n = as_number("abs", &args[0])?;
        let result = if n.partial_cmp_num(&Number::Integer(0)) == Some(std::cmp::Ordering::Less) {
            n.neg()
        } else {
            n
        };
        Ok(Cell::Number(result))
    }));

    define_builtin(env, interner, "min", std::rc::Rc::new(|_a, _e, args| min_max("min", args, std::cmp::Ordering::Less)));
    define_builtin(env, interner, "max", std::rc::Rc::new(|_a, _e, args| min_max("max", args, std::cmp::Ordering::Greater)));

    define_builtin(env, interner, "expt", std::rc::Rc::new(|_a, _e, args| {
        check_arity("expt", args.len(), 2, Some(2))?;
        let base = as_number("expt", &args[0])?;
        let exponent = as_number("expt", &args[1])?;
        Ok(Cell::Number(expt(base, exponent)))
    }));

    define_builtin(env, interner, "exact->inexact", std::rc::Rc::new(|_a, _e, args| {
        check_arity("exact->inexact", args.len(), 1, Some(1))?;
        Ok(Cell::Number(Number::Real(as_number("exact->inexact", &args[0])?.to_f64())))
    }));

    define_builtin(env, interner, "inexact->exact", std::rc::Rc::new(|_a, _e, args| {
        check_arity("inexact->exact", args.len(), 1, Some(1))?;
        let n = as_number("inexact->exact", &args[0])?;
        let exact = match n {
            Number::Real(f) | Number::BigFloat(f) => num_rational::Rational64::approximate_float(f)
                .map(Number::Rational)
                .unwrap_or(Number::Real(f))
                .normalize(),
            other => other,
        };
        Ok(Cell::Number(exact))
    }));

    define_builtin(env, interner, "number->string", std::rc::Rc::new(|_a, _e, args| {
        check_arity("number->string", args.len(), 1, Some(2))?;
        let n = as_number("number->string", &args[0])?;
        Ok(Cell::string(n.to_string()))
    }));

    define_builtin(env, interner, "string->number", std::rc::Rc::new(|_a, _e, args| {
        check_arity("string->number", args.len(), 1, Some(2))?;
        let Cell::String(s) = &args[0] else {
            return Err(SchemeError::wrong_type("string->number", "a string", args[0].type_name()));
        };
        Ok(parse_number(s.borrow().as_str()).map(Cell::Number).unwrap_or(Cell::boolean(false)))
    }));

    define_builtin(env, interner, "zero?", std::rc::Rc::new(|_a, _e, args| {
        check_arity("zero?", args.len(), 1, Some(1))?;
        Ok(Cell::boolean(as_number("zero?", &args[0])?.is_zero()))
    }));

    define_builtin(env, interner, "positive?", std::rc::Rc::new(|_a, _e, args| {
        check_arity("positive?", args.len(), 1, Some(1))?;
        let n = as_number("positive?", &args[0])?;
        Ok(Cell::boolean(n.partial_cmp_num(&Number::Integer(0)) == Some(std::cmp::Ordering::Greater)))
    }));

    define_builtin(env, interner, "negative?", std::rc::Rc::new(|_a, _e, args| {
        check_arity("negative?", args.len(), 1, Some(1))?;
        let n = as_number("negative?", &args[0])?;
        Ok(Cell::boolean(n.partial_cmp_num(&Number::Integer(0)) == Some(std::cmp::Ordering::Less)))
    }));

    define_builtin(env, interner, "odd?", std::rc::Rc::new(|_a, _e, args| {
        check_arity("odd?", args.len(), 1, Some(1))?;
        Ok(Cell::boolean(as_i64("odd?", &args[0])? % 2 != 0))
    }));

    define_builtin(env, interner, "even?", std::rc::Rc::new(|_a, _e, args| {
        check_arity("even?", args.len(), 1, Some(1))?;
        Ok(Cell::boolean(as_i64("even?", &args[0])? % 2 == 0))
    }));
}

fn as_i64(proc: &str, c: &Cell) -> Result<i64, SchemeError> {
    match as_number(proc, c)? {
        Number::Integer(n) => Ok(n),
        other => Err(SchemeError::wrong_type(proc, "an exact integer", &other.to_string())),
    }
}

/// Integer-only binary ops (`quotient`/`remainder`/`modulo`): machine
/// `i64` via the checked variant, which catches both division by zero
/// and `i64::MIN / -1` overflow. Bignum operands are out of scope —
/// these three primitives traffic in exact machine integers per
/// `original_source/src/numbers.c`, which never promotes them.
fn int_binop(proc: &str, a: &Cell, b: &Cell, checked: impl Fn(i64, i64) -> Option<i64>) -> Result<Cell, SchemeError> {
    let (Number::Integer(a), Number::Integer(b)) = (as_number(proc, a)?, as_number(proc, b)?) else {
        return Err(SchemeError::wrong_type(proc, "an exact integer", "a non-integer or bignum"));
    };
    checked(a, b)
        .map(|r| Cell::Number(Number::Integer(r)))
        .ok_or_else(|| SchemeError::new(cozenage_core::ErrorKind::Value, format!("{proc}: division by zero")))
}

fn min_max(proc: &str, args: &[Cell], want: std::cmp::Ordering) -> Result<Cell, SchemeError> {
    check_arity(proc, args.len(), 1, None)?;
    let mut inexact = false;
    let mut best = as_number(proc, &args[0])?;
    inexact |= best.is_inexact();
    for arg in &args[1..] {
        let n = as_number(proc, arg)?;
        inexact |= n.is_inexact();
        if n.partial_cmp_num(&best) == Some(want) {
            best = n;
        }
    }
    if inexact && best.is_exact() {
        best = Number::Real(best.to_f64());
    }
    Ok(Cell::Number(best))
}

fn expt(base: Number, exponent: Number) -> Number {
    if let Number::Integer(e) = exponent {
        if e >= 0 && base.is_exact() {
            let mut acc = Number::Integer(1);
            let mut b = base;
            let mut e = e as u64;
            while e > 0 {
                if e & 1 == 1 {
                    acc = acc.mul(b.clone());
                }
                b = b.clone().mul(b);
                e >>= 1;
            }
            return acc;
        }
    }
    Number::Real(base.to_f64().powf(exponent.to_f64()))
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

    fn call(env: &Env, interner: &mut Interner, name: &str, args: Vec<Cell>) -> Result<Cell, SchemeError> {
        let sym = interner.intern(name);
        let Cell::Procedure(p) = env.lookup(&sym).unwrap() else {
            panic!("{name} is not bound to a procedure");
        };
        let cozenage_core::Procedure::Builtin { func, .. } = p.as_ref() else {
            panic!("{name} is not a builtin");
        };
        func(&mut NoopApplyer, env, &args)
    }

    #[test]
    fn addition_over_many_args() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let result = call(&env, &mut interner, "+", vec![Cell::integer(1), Cell::integer(2), Cell::integer(3)]).unwrap();
        assert_eq!(result.to_string(), "6");
    }

    #[test]
    fn division_by_exact_zero_errors() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let result = call(&env, &mut interner, "/", vec![Cell::integer(1), Cell::integer(0)]);
        assert!(result.is_err());
    }

    #[test]
    fn quotient_and_modulo_match_euclidean_and_truncating_semantics() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let q = call(&env, &mut interner, "quotient", vec![Cell::integer(7), Cell::integer(2)]).unwrap();
        assert_eq!(q.to_string(), "3");
        let m = call(&env, &mut interner, "modulo", vec![Cell::integer(-7), Cell::integer(2)]).unwrap();
        assert_eq!(m.to_string(), "1");
    }

    #[test]
    fn expt_with_nonnegative_integer_exponent_stays_exact() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let result = call(&env, &mut interner, "expt", vec![Cell::integer(2), Cell::integer(10)]).unwrap();
        assert_eq!(result.to_string(), "1024");
    }

    #[test]
    fn string_to_number_roundtrips() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let result = call(&env, &mut interner, "string->number", vec![Cell::string("42")]).unwrap();
        assert_eq!(result.to_string(), "42");
    }
}
