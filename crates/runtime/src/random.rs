//! Random-number-library primitives (spec §4.5 supplement: R7RS-large
//! `(scheme random)`), grounded on `original_source/src/numbers.c`'s
//! `prim_random` entry. Uses `rand`'s thread-local generator rather than
//! threading explicit state through every call.

use cozenage_core::{Cell, Env, Interner, SchemeError, check_arity};
use rand::Rng;
use std::rc::Rc;

use crate::registry::define_builtin;

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "random-integer", Rc::new(|_a, _e, args| {
        check_arity("random-integer", args.len(), 1, Some(1))?;
        let Cell::Number(cozenage_core::Number::Integer(bound)) = args[0] else {
            return Err(SchemeError::wrong_type("random-integer", "an exact integer", args[0].type_name()));
        };
        if bound <= 0 {
            return Err(SchemeError::new(cozenage_core::ErrorKind::Value, "random-integer: bound must be positive"));
        }
        Ok(Cell::integer(rand::thread_rng().gen_range(0..bound)))
    }));
    define_builtin(env, interner, "random-real", Rc::new(|_a, _e, args| {
        check_arity("random-real", args.len(), 0, Some(0))?;
        Ok(Cell::Number(cozenage_core::Number::Real(rand::thread_rng().gen_range(0.0..1.0))))
    }));
}
