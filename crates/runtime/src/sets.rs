//! Set primitives (spec §4.6 supplement), grounded on
//! `original_source/src/sets.c`. A set is a hash table mapping each
//! member's display key to itself.

use cozenage_core::{Cell, Env, HashTable, Interner, SchemeError, check_arity};
use std::cell::RefCell;
use std::rc::Rc;

use crate::registry::define_builtin;

fn as_set<'a>(proc: &str, c: &'a Cell) -> Result<&'a Rc<RefCell<HashTable<Cell>>>, SchemeError> {
    match c {
        Cell::Set(t) => Ok(t),
        other => Err(SchemeError::wrong_type(proc, "a set", other.type_name())),
    }
}

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "make-set", Rc::new(|_a, _e, args| {
        let mut table = HashTable::new();
        for item in args {
            table.insert(&item.to_string(), item.clone());
        }
        Ok(Cell::Set(Rc::new(RefCell::new(table))))
    }));
    define_builtin(env, interner, "set-add!", Rc::new(|_a, _e, args| {
        check_arity("set-add!", args.len(), 2, Some(2))?;
        let s = as_set("set-add!", &args[0])?;
        s.borrow_mut().insert(&args[1].to_string(), args[1].clone());
        Ok(Cell::Unspecified)
    }));
    define_builtin(env, interner, "set-member?", Rc::new(|_a, _e, args| {
        check_arity("set-member?", args.len(), 2, Some(2))?;
        let s = as_set("set-member?", &args[0])?;
        Ok(Cell::boolean(s.borrow().contains_key(&args[1].to_string())))
    }));
    define_builtin(env, interner, "set->list", Rc::new(|_a, _e, args| {
        check_arity("set->list", args.len(), 1, Some(1))?;
        let s = as_set("set->list", &args[0])?;
        Ok(Cell::list(s.borrow().iter().map(|(_, v)| v.clone()).collect()))
    }));
    define_builtin(env, interner, "set-union", Rc::new(|_a, _e, args| {
        let mut table = HashTable::new();
        for arg in args {
            for (k, v) in as_set("set-union", arg)?.borrow().iter() {
                table.insert(k, v.clone());
            }
        }
        Ok(Cell::Set(Rc::new(RefCell::new(table))))
    }));
    define_builtin(env, interner, "set-intersection", Rc::new(|_a, _e, args| {
        check_arity("set-intersection", args.len(), 1, None)?;
        let (first, rest) = args.split_first().expect("arity checked above");
        let first = as_set("set-intersection", first)?.borrow();
        let mut table = HashTable::new();
        'outer: for (k, v) in first.iter() {
            for other in rest {
                if !as_set("set-intersection", other)?.borrow().contains_key(k) {
                    continue 'outer;
                }
            }
            table.insert(k, v.clone());
        }
        Ok(Cell::Set(Rc::new(RefCell::new(table))))
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_keeps_only_members_present_in_every_set() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let make = interner.intern("make-set");
        let cozenage_core::Cell::Procedure(p) = env.lookup(&make).unwrap() else { panic!() };
        let cozenage_core::Procedure::Builtin { func, .. } = p.as_ref() else { panic!() };
        struct Noop;
        impl cozenage_core::Applyer for Noop {
            fn apply(&mut self, _p: &Cell, _a: Vec<Cell>, _e: &Env) -> Result<Cell, SchemeError> {
                unreachable!()
            }
            fn eval(&mut self, _e: &Cell, _env: &Env) -> Result<Cell, SchemeError> {
                unreachable!()
            }
        }
        let a = func(&mut Noop, &env, &[Cell::integer(1), Cell::integer(2)]).unwrap();
        let b = func(&mut Noop, &env, &[Cell::integer(2), Cell::integer(3)]).unwrap();
        let intersection = interner.intern("set-intersection");
        let cozenage_core::Cell::Procedure(ip) = env.lookup(&intersection).unwrap() else { panic!() };
        let cozenage_core::Procedure::Builtin { func: ifunc, .. } = ip.as_ref() else { panic!() };
        let result = ifunc(&mut Noop, &env, &[a, b]).unwrap();
        let cozenage_core::Cell::Set(t) = result else { panic!() };
        assert_eq!(t.borrow().len(), 1);
        assert!(t.borrow().contains_key("2"));
    }
}
