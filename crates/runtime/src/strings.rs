//! String primitives (spec §4.5), grounded on
//! `original_source/src/strings.c`.

use cozenage_core::{Cell, Env, Interner, SchemeError, SchemeString, check_arity};
use std::rc::Rc;

use crate::registry::define_builtin;

fn as_str<'a>(proc: &str, c: &'a Cell) -> Result<std::cell::Ref<'a, SchemeString>, SchemeError> {
    match c {
        Cell::String(s) => Ok(s.borrow()),
        other => Err(SchemeError::wrong_type(proc, "a string", other.type_name())),
    }
}

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "string-length", Rc::new(|_a, _e, args| {
        check_arity("string-length", args.len(), 1, Some(1))?;
        Ok(Cell::integer(as_str("string-length", &args[0])?.codepoint_count() as i64))
    }));
    define_builtin(env, interner, "string-ref", Rc::new(|_a, _e, args| {
        check_arity("string-ref", args.len(), 2, Some(2))?;
        let s = as_str("string-ref", &args[0])?;
        let idx = index_arg("string-ref", &args[1])?;
        s.chars()
            .get(idx)
            .copied()
            .map(Cell::Char)
            .ok_or_else(|| SchemeError::index("string-ref", "index out of range"))
    }));
    define_builtin(env, interner, "string-set!", Rc::new(|_a, _e, args| {
        check_arity("string-set!", args.len(), 3, Some(3))?;
        let Cell::String(s) = &args[0] else {
            return Err(SchemeError::wrong_type("string-set!", "a string", args[0].type_name()));
        };
        let idx = index_arg("string-set!", &args[1])?;
        let Cell::Char(ch) = &args[2] else {
            return Err(SchemeError::wrong_type("string-set!", "a char", args[2].type_name()));
        };
        s.borrow_mut().set_char(idx, *ch)?;
        Ok(Cell::Unspecified)
    }));
    define_builtin(env, interner, "string-append", Rc::new(|_a, _e, args| {
        let mut out = String::new();
        for (i, a) in args.iter().enumerate() {
            out.push_str(as_str("string-append", a).map_err(|_| {
                SchemeError::wrong_type("string-append", "a string", args[i].type_name())
            })?.as_str());
        }
        Ok(Cell::string(out))
    }));
    define_builtin(env, interner, "substring", Rc::new(|_a, _e, args| {
        check_arity("substring", args.len(), 2, Some(3))?;
        let s = as_str("substring", &args[0])?;
        let chars = s.chars();
        let start = index_arg("substring", &args[1])?;
        let end = if args.len() == 3 { index_arg("substring", &args[2])? } else { chars.len() };
        if start > end || end > chars.len() {
            return Err(SchemeError::index("substring", "index out of range"));
        }
        Ok(Cell::string(chars[start..end].iter().collect::<String>()))
    }));
    define_builtin(env, interner, "string->list", Rc::new(|_a, _e, args| {
        check_arity("string->list", args.len(), 1, Some(1))?;
        let chars = as_str("string->list", &args[0])?.chars();
        Ok(Cell::list(chars.into_iter().map(Cell::Char).collect()))
    }));
    define_builtin(env, interner, "list->string", Rc::new(|_a, _e, args| {
        check_arity("list->string", args.len(), 1, Some(1))?;
        let items = args[0]
            .to_vec()
            .ok_or_else(|| SchemeError::wrong_type("list->string", "a proper list", args[0].type_name()))?;
        let mut s = String::new();
        for item in items {
            let Cell::Char(ch) = item else {
                return Err(SchemeError::wrong_type("list->string", "a char", item.type_name()));
            };
            s.push(ch);
        }
        Ok(Cell::string(s))
    }));
    define_builtin(env, interner, "string-copy", Rc::new(|_a, _e, args| {
        check_arity("string-copy", args.len(), 1, Some(1))?;
        Ok(Cell::string(as_str("string-copy", &args[0])?.as_str().to_string()))
    }));
    define_builtin(env, interner, "string=?", Rc::new(|_a, _e, args| {
        check_arity("string=?", args.len(), 2, None)?;
        string_chain(args, |a, b| a == b)
    }));
    define_builtin(env, interner, "string<?", Rc::new(|_a, _e, args| {
        check_arity("string<?", args.len(), 2, None)?;
        string_chain(args, |a, b| a < b)
    }));
    define_builtin(env, interner, "string>?", Rc::new(|_a, _e, args| {
        check_arity("string>?", args.len(), 2, None)?;
        string_chain(args, |a, b| a > b)
    }));
    define_builtin(env, interner, "string->symbol", Rc::new(|_a, _e, args| {
        check_arity("string->symbol", args.len(), 1, Some(1))?;
        let text = as_str("string->symbol", &args[0])?.as_str().to_string();
        // Builtins don't carry a handle to the reader's Interner, so this
        // allocates a fresh SymbolData rather than re-interning: global
        // lookups (string-keyed) still see it correctly, but it is not
        // `eq?` to a symbol of the same name read from source text.
        Ok(Cell::symbol(Rc::new(cozenage_core::interner::SymbolData {
            name: text,
            special_form_id: 0,
        })))
    }));
    define_builtin(env, interner, "symbol->string", Rc::new(|_a, _e, args| {
        check_arity("symbol->string", args.len(), 1, Some(1))?;
        match &args[0] {
            Cell::Symbol(s) => Ok(Cell::string(s.name.clone())),
            other => Err(SchemeError::wrong_type("symbol->string", "a symbol", other.type_name())),
        }
    }));
    define_builtin(env, interner, "string-upcase", Rc::new(|_a, _e, args| {
        check_arity("string-upcase", args.len(), 1, Some(1))?;
        Ok(Cell::string(as_str("string-upcase", &args[0])?.as_str().to_uppercase()))
    }));
    define_builtin(env, interner, "string-downcase", Rc::new(|_a, _e, args| {
        check_arity("string-downcase", args.len(), 1, Some(1))?;
        Ok(Cell::string(as_str("string-downcase", &args[0])?.as_str().to_lowercase()))
    }));
    define_builtin(env, interner, "make-string", Rc::new(|_a, _e, args| {
        check_arity("make-string", args.len(), 1, Some(2))?;
        let n = index_arg("make-string", &args[0])?;
        let fill = if args.len() == 2 {
            let Cell::Char(ch) = args[1] else {
                return Err(SchemeError::wrong_type("make-string", "a char", args[1].type_name()));
            };
            ch
        } else {
            ' '
        };
        Ok(Cell::string(std::iter::repeat_n(fill, n).collect::<String>()))
    }));
}

fn index_arg(proc: &str, c: &Cell) -> Result<usize, SchemeError> {
    match c {
        Cell::Number(cozenage_core::Number::Integer(i)) if *i >= 0 => Ok(*i as usize),
        other => Err(SchemeError::wrong_type(proc, "a non-negative exact integer", other.type_name())),
    }
}

fn string_chain(args: &[Cell], accept: impl Fn(&str, &str) -> bool) -> Result<Cell, SchemeError> {
    let strs: Vec<_> = args.iter().map(|c| as_str("string comparison", c)).collect::<Result<_, _>>()?;
    for pair in strs.windows(2) {
        if !accept(pair[0].as_str(), pair[1].as_str()) {
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

    fn call(env: &Env, interner: &mut Interner, name: &str, args: Vec<Cell>) -> Result<Cell, SchemeError> {
        let sym = interner.intern(name);
        let Cell::Procedure(p) = env.lookup(&sym).unwrap() else { panic!() };
        let Procedure::Builtin { func, .. } = p.as_ref() else { panic!() };
        func(&mut NoopApplyer, env, &args)
    }

    #[test]
    fn substring_slices_by_codepoint_index() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let s = Cell::string("hello world");
        let result = call(&env, &mut interner, "substring", vec![s, Cell::integer(6), Cell::integer(11)]).unwrap();
        assert_eq!(result.to_string(), "world");
    }

    #[test]
    fn string_append_concatenates_all_arguments() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let result = call(&env, &mut interner, "string-append", vec![Cell::string("foo"), Cell::string("bar")]).unwrap();
        assert_eq!(result.to_string(), "foobar");
    }
}
