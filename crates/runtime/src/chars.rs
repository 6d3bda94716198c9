//! Character primitives (spec §4.5), grounded on
//! `original_source/src/chars.c`.

use cozenage_core::{Cell, Env, Interner, SchemeError, check_arity};
use std::rc::Rc;

use crate::registry::define_builtin;

fn as_char(proc: &str, c: &Cell) -> Result<char, SchemeError> {
    match c {
        Cell::Char(ch) => Ok(*ch),
        other => Err(SchemeError::wrong_type(proc, "a char", other.type_name())),
    }
}

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "char->integer", Rc::new(|_a, _e, args| {
        check_arity("char->integer", args.len(), 1, Some(1))?;
        Ok(Cell::integer(as_char("char->integer", &args[0])? as i64))
    }));
    define_builtin(env, interner, "integer->char", Rc::new(|_a, _e, args| {
        check_arity("integer->char", args.len(), 1, Some(1))?;
        let Cell::Number(cozenage_core::Number::Integer(i)) = args[0] else {
            return Err(SchemeError::wrong_type("integer->char", "an exact integer", args[0].type_name()));
        };
        u32::try_from(i)
            .ok()
            .and_then(char::from_u32)
            .map(Cell::Char)
            .ok_or_else(|| SchemeError::new(cozenage_core::ErrorKind::Value, "integer->char: not a valid codepoint"))
    }));
    define_builtin(env, interner, "char-upcase", Rc::new(|_a, _e, args| {
        check_arity("char-upcase", args.len(), 1, Some(1))?;
        Ok(Cell::Char(as_char("char-upcase", &args[0])?.to_ascii_uppercase()))
    }));
    define_builtin(env, interner, "char-downcase", Rc::new(|_a, _e, args| {
        check_arity("char-downcase", args.len(), 1, Some(1))?;
        Ok(Cell::Char(as_char("char-downcase", &args[0])?.to_ascii_lowercase()))
    }));
    define_builtin(env, interner, "char-alphabetic?", Rc::new(|_a, _e, args| {
        check_arity("char-alphabetic?", args.len(), 1, Some(1))?;
        Ok(Cell::boolean(as_char("char-alphabetic?", &args[0])?.is_alphabetic()))
    }));
    define_builtin(env, interner, "char-numeric?", Rc::new(|_a, _e, args| {
        check_arity("char-numeric?", args.len(), 1, Some(1))?;
        Ok(Cell::boolean(as_char("char-numeric?", &args[0])?.is_numeric()))
    }));
    define_builtin(env, interner, "char-whitespace?", Rc::new(|_a, _e, args| {
        check_arity("char-whitespace?", args.len(), 1, Some(1))?;
        Ok(Cell::boolean(as_char("char-whitespace?", &args[0])?.is_whitespace()))
    }));
    define_builtin(env, interner, "char=?", Rc::new(|_a, _e, args| char_chain("char=?", args, |a, b| a == b)));
    define_builtin(env, interner, "char<?", Rc::new(|_a, _e, args| char_chain("char<?", args, |a, b| a < b)));
    define_builtin(env, interner, "char>?", Rc::new(|_a, _e, args| char_chain("char>?", args, |a, b| a > b)));
}

fn char_chain(proc: &str, args: &[Cell], accept: impl Fn(char, char) -> bool) -> Result<Cell, SchemeError> {
    check_arity(proc, args.len(), 2, None)?;
    let chars: Vec<char> = args.iter().map(|c| as_char(proc, c)).collect::<Result<_, _>>()?;
    for pair in chars.windows(2) {
        if !accept(pair[0], pair[1]) {
            return Ok(Cell::boolean(false));
        }
    }
    Ok(Cell::boolean(true))
}
