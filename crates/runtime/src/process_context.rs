//! Process-context primitives (spec §4.5 supplement: R7RS `(scheme
//! process-context)`), grounded on `original_source/src/core.c`'s
//! `prim_exit`/environment-access entries.

use cozenage_core::{Cell, Env, Interner, SchemeError, check_arity};
use std::rc::Rc;

use crate::registry::define_builtin;

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "command-line", Rc::new(|_a, _e, _args| {
        Ok(Cell::list(std::env::args().map(Cell::string).collect()))
    }));
    define_builtin(env, interner, "exit", Rc::new(|_a, _e, args| {
        check_arity("exit", args.len(), 0, Some(1))?;
        let code = match args.first() {
            None | Some(Cell::Boolean(true)) => 0,
            Some(Cell::Boolean(false)) => 1,
            Some(Cell::Number(cozenage_core::Number::Integer(i))) => *i as i32,
            Some(other) => return Err(SchemeError::wrong_type("exit", "a boolean or exact integer", other.type_name())),
        };
        std::process::exit(code);
    }));
    define_builtin(env, interner, "get-environment-variable", Rc::new(|_a, _e, args| {
        check_arity("get-environment-variable", args.len(), 1, Some(1))?;
        let Cell::String(name) = &args[0] else {
            return Err(SchemeError::wrong_type("get-environment-variable", "a string", args[0].type_name()));
        };
        Ok(std::env::var(name.borrow().as_str()).map(Cell::string).unwrap_or(Cell::Boolean(false)))
    }));
    define_builtin(env, interner, "get-environment-variables", Rc::new(|_a, _e, _args| {
        let pairs = std::env::vars()
            .map(|(k, v)| Cell::cons(Cell::string(k), Cell::string(v)))
            .collect();
        Ok(Cell::list(pairs))
    }));
    define_builtin(env, interner, "current-second", Rc::new(|_a, _e, _args| {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Ok(Cell::Number(cozenage_core::Number::Real(secs)))
    }));
}
