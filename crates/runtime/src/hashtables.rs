//! Hash table primitives (spec §4.6 supplement), grounded on
//! `original_source/src/hash_type.c`. Keys are stored by their `Display`
//! rendering (see `Cell::HashTable`'s doc comment in cozenage-core).

use cozenage_core::{Cell, Env, HashTable, Interner, SchemeError, check_arity};
use std::cell::RefCell;
use std::rc::Rc;

use crate::registry::define_builtin;

fn as_table<'a>(proc: &str, c: &'a Cell) -> Result<&'a Rc<RefCell<HashTable<Cell>>>, SchemeError> {
    match c {
        Cell::HashTable(t) => Ok(t),
        other => Err(SchemeError::wrong_type(proc, "a hash table", other.type_name())),
    }
}

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "make-hash-table", Rc::new(|_a, _e, _args| {
        Ok(Cell::HashTable(Rc::new(RefCell::new(HashTable::new()))))
    }));
    define_builtin(env, interner, "hash-table-set!", Rc::new(|_a, _e, args| {
        check_arity("hash-table-set!", args.len(), 3, Some(3))?;
        let t = as_table("hash-table-set!", &args[0])?;
        t.borrow_mut().insert(&args[1].to_string(), args[2].clone());
        Ok(Cell::Unspecified)
    }));
    define_builtin(env, interner, "hash-table-ref", Rc::new(|_a, _e, args| {
        check_arity("hash-table-ref", args.len(), 2, Some(3))?;
        let t = as_table("hash-table-ref", &args[0])?;
        let key = args[1].to_string();
        match t.borrow().get(&key).cloned() {
            Some(v) => Ok(v),
            None => args
                .get(2)
                .cloned()
                .ok_or_else(|| SchemeError::general(format!("hash-table-ref: no value for key {key}"))),
        }
    }));
    define_builtin(env, interner, "hash-table-delete!", Rc::new(|_a, _e, args| {
        check_arity("hash-table-delete!", args.len(), 2, Some(2))?;
        let t = as_table("hash-table-delete!", &args[0])?;
        t.borrow_mut().remove(&args[1].to_string());
        Ok(Cell::Unspecified)
    }));
    define_builtin(env, interner, "hash-table-contains?", Rc::new(|_a, _e, args| {
        check_arity("hash-table-contains?", args.len(), 2, Some(2))?;
        let t = as_table("hash-table-contains?", &args[0])?;
        Ok(Cell::boolean(t.borrow().contains_key(&args[1].to_string())))
    }));
    define_builtin(env, interner, "hash-table-size", Rc::new(|_a, _e, args| {
        check_arity("hash-table-size", args.len(), 1, Some(1))?;
        Ok(Cell::integer(as_table("hash-table-size", &args[0])?.borrow().len() as i64))
    }));
    define_builtin(env, interner, "hash-table->alist", Rc::new(|_a, _e, args| {
        check_arity("hash-table->alist", args.len(), 1, Some(1))?;
        let t = as_table("hash-table->alist", &args[0])?;
        let pairs = t
            .borrow()
            .iter()
            .map(|(k, v)| Cell::cons(Cell::string(k.to_string()), v.clone()))
            .collect();
        Ok(Cell::list(pairs))
    }));
    define_builtin(env, interner, "hash-table-keys", Rc::new(|_a, _e, args| {
        check_arity("hash-table-keys", args.len(), 1, Some(1))?;
        let t = as_table("hash-table-keys", &args[0])?;
        let keys = t.borrow().iter().map(|(k, _)| Cell::string(k.to_string())).collect();
        Ok(Cell::list(keys))
    }));
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
        let Cell::Procedure(p) = env.lookup(&sym).unwrap() else { panic!() };
        let cozenage_core::Procedure::Builtin { func, .. } = p.as_ref() else { panic!() };
        func(&mut NoopApplyer, env, &args)
    }

    #[test]
    fn set_then_ref_round_trips_and_missing_key_uses_default() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let t = call(&env, &mut interner, "make-hash-table", vec![]).unwrap();
        call(&env, &mut interner, "hash-table-set!", vec![t.clone(), Cell::string("a"), Cell::integer(1)]).unwrap();
        let got = call(&env, &mut interner, "hash-table-ref", vec![t.clone(), Cell::string("a")]).unwrap();
        assert_eq!(got.to_string(), "1");
        let missing = call(&env, &mut interner, "hash-table-ref", vec![t, Cell::string("b"), Cell::integer(0)]).unwrap();
        assert_eq!(missing.to_string(), "0");
    }
}
