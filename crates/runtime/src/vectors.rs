//! Vector and bytevector primitives (spec §4.5), grounded on
//! `original_source/src/vectors.c`.

use cozenage_core::{Bytevector, BytevectorKind, Cell, Env, Interner, SchemeError, check_arity};
use std::cell::RefCell;
use std::rc::Rc;

use crate::registry::define_builtin;

fn index_arg(proc: &str, c: &Cell) -> Result<usize, SchemeError> {
    match c {
        Cell::Number(cozenage_core::Number::Integer(i)) if *i >= 0 => Ok(*i as usize),
        other => Err(SchemeError::wrong_type(proc, "a non-negative exact integer", other.type_name())),
    }
}

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "vector", Rc::new(|_a, _e, args| {
        Ok(Cell::Vector(Rc::new(RefCell::new(args.to_vec()))))
    }));
    define_builtin(env, interner, "make-vector", Rc::new(|_a, _e, args| {
        check_arity("make-vector", args.len(), 1, Some(2))?;
        let n = index_arg("make-vector", &args[0])?;
        let fill = args.get(1).cloned().unwrap_or(Cell::Unspecified);
        Ok(Cell::Vector(Rc::new(RefCell::new(vec![fill; n]))))
    }));
    define_builtin(env, interner, "vector-length", Rc::new(|_a, _e, args| {
        check_arity("vector-length", args.len(), 1, Some(1))?;
        Ok(Cell::integer(as_vector("vector-length", &args[0])?.borrow().len() as i64))
    }));
    define_builtin(env, interner, "vector-ref", Rc::new(|_a, _e, args| {
        check_arity("vector-ref", args.len(), 2, Some(2))?;
        let v = as_vector("vector-ref", &args[0])?;
        let idx = index_arg("vector-ref", &args[1])?;
        v.borrow()
            .get(idx)
            .cloned()
            .ok_or_else(|| SchemeError::index("vector-ref", "index out of range"))
    }));
    define_builtin(env, interner, "vector-set!", Rc::new(|_a, _e, args| {
        check_arity("vector-set!", args.len(), 3, Some(3))?;
        let v = as_vector("vector-set!", &args[0])?;
        let idx = index_arg("vector-set!", &args[1])?;
        let mut v = v.borrow_mut();
        if idx >= v.len() {
            return Err(SchemeError::index("vector-set!", "index out of range"));
        }
        v[idx] = args[2].clone();
        Ok(Cell::Unspecified)
    }));
    define_builtin(env, interner, "vector->list", Rc::new(|_a, _e, args| {
        check_arity("vector->list", args.len(), 1, Some(1))?;
        Ok(Cell::list(as_vector("vector->list", &args[0])?.borrow().clone()))
    }));
    define_builtin(env, interner, "list->vector", Rc::new(|_a, _e, args| {
        check_arity("list->vector", args.len(), 1, Some(1))?;
        let items = args[0]
            .to_vec()
            .ok_or_else(|| SchemeError::wrong_type("list->vector", "a proper list", args[0].type_name()))?;
        Ok(Cell::Vector(Rc::new(RefCell::new(items))))
    }));
    define_builtin(env, interner, "vector-fill!", Rc::new(|_a, _e, args| {
        check_arity("vector-fill!", args.len(), 2, Some(2))?;
        let v = as_vector("vector-fill!", &args[0])?;
        v.borrow_mut().iter_mut().for_each(|slot| *slot = args[1].clone());
        Ok(Cell::Unspecified)
    }));
    define_builtin(env, interner, "vector-copy", Rc::new(|_a, _e, args| {
        check_arity("vector-copy", args.len(), 1, Some(1))?;
        Ok(Cell::Vector(Rc::new(RefCell::new(as_vector("vector-copy", &args[0])?.borrow().clone()))))
    }));
    define_builtin(env, interner, "vector-append", Rc::new(|_a, _e, args| {
        let mut out = Vec::new();
        for a in args {
            out.extend(as_vector("vector-append", a)?.borrow().iter().cloned());
        }
        Ok(Cell::Vector(Rc::new(RefCell::new(out))))
    }));
    define_builtin(env, interner, "vector-map", Rc::new(|a, e, args| vector_map(a, e, args)));
    define_builtin(env, interner, "vector-for-each", Rc::new(|a, e, args| {
        vector_map(a, e, args)?;
        Ok(Cell::Unspecified)
    }));

    define_builtin(env, interner, "bytevector", Rc::new(|_a, _e, args| {
        let data = args
            .iter()
            .map(|c| byte_arg("bytevector", c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Cell::Bytevector(Rc::new(RefCell::new(Bytevector::new(BytevectorKind::U8, data)))))
    }));
    define_builtin(env, interner, "make-bytevector", Rc::new(|_a, _e, args| {
        check_arity("make-bytevector", args.len(), 1, Some(2))?;
        let n = index_arg("make-bytevector", &args[0])?;
        let fill = args.get(1).map(|c| byte_arg("make-bytevector", c)).transpose()?.unwrap_or(0);
        Ok(Cell::Bytevector(Rc::new(RefCell::new(Bytevector::new(BytevectorKind::U8, vec![fill; n])))))
    }));
    define_builtin(env, interner, "bytevector-length", Rc::new(|_a, _e, args| {
        check_arity("bytevector-length", args.len(), 1, Some(1))?;
        Ok(Cell::integer(as_bytevector("bytevector-length", &args[0])?.borrow().capacity() as i64))
    }));
    define_builtin(env, interner, "bytevector-u8-ref", Rc::new(|_a, _e, args| {
        check_arity("bytevector-u8-ref", args.len(), 2, Some(2))?;
        let bv = as_bytevector("bytevector-u8-ref", &args[0])?;
        let idx = index_arg("bytevector-u8-ref", &args[1])?;
        bv.borrow()
            .data
            .get(idx)
            .copied()
            .map(Cell::integer)
            .ok_or_else(|| SchemeError::index("bytevector-u8-ref", "index out of range"))
    }));
    define_builtin(env, interner, "bytevector-u8-set!", Rc::new(|_a, _e, args| {
        check_arity("bytevector-u8-set!", args.len(), 3, Some(3))?;
        let bv = as_bytevector("bytevector-u8-set!", &args[0])?;
        let idx = index_arg("bytevector-u8-set!", &args[1])?;
        let byte = byte_arg("bytevector-u8-set!", &args[2])?;
        let mut bv = bv.borrow_mut();
        if idx >= bv.data.len() {
            return Err(SchemeError::index("bytevector-u8-set!", "index out of range"));
        }
        bv.data[idx] = byte;
        Ok(Cell::Unspecified)
    }));
}

fn as_vector<'a>(proc: &str, c: &'a Cell) -> Result<&'a Rc<RefCell<Vec<Cell>>>, SchemeError> {
    match c {
        Cell::Vector(v) => Ok(v),
        other => Err(SchemeError::wrong_type(proc, "a vector", other.type_name())),
    }
}

fn as_bytevector<'a>(proc: &str, c: &'a Cell) -> Result<&'a Rc<RefCell<Bytevector>>, SchemeError> {
    match c {
        Cell::Bytevector(v) => Ok(v),
        other => Err(SchemeError::wrong_type(proc, "a bytevector", other.type_name())),
    }
}

fn byte_arg(proc: &str, c: &Cell) -> Result<i64, SchemeError> {
    match c {
        Cell::Number(cozenage_core::Number::Integer(i)) if (0..=255).contains(i) => Ok(*i),
        other => Err(SchemeError::wrong_type(proc, "a byte (0..255)", other.type_name())),
    }
}

fn vector_map(applyer: &mut dyn cozenage_core::Applyer, env: &Env, args: &[Cell]) -> Result<Cell, SchemeError> {
    check_arity("vector-map", args.len(), 2, None)?;
    let proc = args[0].clone();
    let vectors: Vec<Vec<Cell>> = args[1..]
        .iter()
        .map(|v| as_vector("vector-map", v).map(|v| v.borrow().clone()))
        .collect::<Result<_, _>>()?;
    let len = vectors.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let call_args: Vec<Cell> = vectors.iter().map(|v| v[i].clone()).collect();
        out.push(applyer.apply(&proc, call_args, env)?);
    }
    Ok(Cell::Vector(Rc::new(RefCell::new(out))))
}
