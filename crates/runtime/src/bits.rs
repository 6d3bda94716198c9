//! Fixnum bitwise primitives (spec §4.5 supplement), grounded on
//! `original_source/src/numbers.c`'s bitwise dispatch.

use cozenage_core::{Cell, Env, Interner, Number, SchemeError, check_arity};
use std::rc::Rc;

use crate::registry::define_builtin;

fn as_i64(proc: &str, c: &Cell) -> Result<i64, SchemeError> {
    match c {
        Cell::Number(Number::Integer(i)) => Ok(*i),
        other => Err(SchemeError::wrong_type(proc, "an exact integer", other.type_name())),
    }
}

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "bit-and", Rc::new(|_a, _e, args| fold_bits("bit-and", args, -1, |a, b| a & b)));
    define_builtin(env, interner, "bit-or", Rc::new(|_a, _e, args| fold_bits("bit-or", args, 0, |a, b| a | b)));
    define_builtin(env, interner, "bit-xor", Rc::new(|_a, _e, args| fold_bits("bit-xor", args, 0, |a, b| a ^ b)));
    define_builtin(env, interner, "bit-not", Rc::new(|_a, _e, args| {
        check_arity("bit-not", args.len(), 1, Some(1))?;
        Ok(Cell::integer(!as_i64("bit-not", &args[0])?))
    }));
    define_builtin(env, interner, "arithmetic-shift", Rc::new(|_a, _e, args| {
        check_arity("arithmetic-shift", args.len(), 2, Some(2))?;
        let n = as_i64("arithmetic-shift", &args[0])?;
        let shift = as_i64("arithmetic-shift", &args[1])?;
        let shifted = if shift >= 0 {
            n.checked_shl(shift as u32)
        } else {
            Some(n >> shift.unsigned_abs().min(63))
        };
        shifted
            .map(Cell::integer)
            .ok_or_else(|| SchemeError::new(cozenage_core::ErrorKind::Value, "arithmetic-shift: shift amount out of range"))
    }));
}

fn fold_bits(proc: &str, args: &[Cell], identity: i64, op: impl Fn(i64, i64) -> i64) -> Result<Cell, SchemeError> {
    let mut acc = identity;
    for a in args {
        acc = op(acc, as_i64(proc, a)?);
    }
    Ok(Cell::integer(acc))
}
