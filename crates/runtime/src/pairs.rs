//! List and pair primitives (spec §4.5), grounded on
//! `original_source/src/pairs.c` and `original_source/src/evaluator.c`'s
//! `prim_map`/`prim_apply`.

use cozenage_core::{Applyer, Cell, Env, SchemeError, check_arity};
use cozenage_core::Interner;
use std::rc::Rc;

use crate::registry::define_builtin;

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "cons", Rc::new(|_a, _e, args| {
        check_arity("cons", args.len(), 2, Some(2))?;
        Ok(Cell::cons(args[0].clone(), args[1].clone()))
    }));
    define_builtin(env, interner, "car", Rc::new(|_a, _e, args| {
        check_arity("car", args.len(), 1, Some(1))?;
        pair_field("car", &args[0], |p| p.car.clone())
    }));
    define_builtin(env, interner, "cdr", Rc::new(|_a, _e, args| {
        check_arity("cdr", args.len(), 1, Some(1))?;
        pair_field("cdr", &args[0], |p| p.cdr.clone())
    }));
    define_builtin(env, interner, "set-car!", Rc::new(|_a, _e, args| {
        check_arity("set-car!", args.len(), 2, Some(2))?;
        let Cell::Pair(p) = &args[0] else {
            return Err(SchemeError::wrong_type("set-car!", "a pair", args[0].type_name()));
        };
        p.borrow_mut().set_car(args[1].clone());
        Ok(Cell::Unspecified)
    }));
    define_builtin(env, interner, "set-cdr!", Rc::new(|_a, _e, args| {
        check_arity("set-cdr!", args.len(), 2, Some(2))?;
        let Cell::Pair(p) = &args[0] else {
            return Err(SchemeError::wrong_type("set-cdr!", "a pair", args[0].type_name()));
        };
        p.borrow_mut().set_cdr(args[1].clone());
        Ok(Cell::Unspecified)
    }));
    define_builtin(env, interner, "list", Rc::new(|_a, _e, args| Ok(Cell::list(args.to_vec()))));
    define_builtin(env, interner, "length", Rc::new(|_a, _e, args| {
        check_arity("length", args.len(), 1, Some(1))?;
        length(&args[0])
    }));
    define_builtin(env, interner, "append", Rc::new(|_a, _e, args| append(args)));
    define_builtin(env, interner, "reverse", Rc::new(|_a, _e, args| {
        check_arity("reverse", args.len(), 1, Some(1))?;
        let mut items = to_proper_vec("reverse", &args[0])?;
        items.reverse();
        Ok(Cell::list(items))
    }));
    define_builtin(env, interner, "list-ref", Rc::new(|_a, _e, args| {
        check_arity("list-ref", args.len(), 2, Some(2))?;
        let items = to_proper_vec("list-ref", &args[0])?;
        let idx = index_arg("list-ref", &args[1])?;
        items
            .get(idx)
            .cloned()
            .ok_or_else(|| SchemeError::index("list-ref", format!("index {idx} out of range")))
    }));
    define_builtin(env, interner, "list-tail", Rc::new(|_a, _e, args| {
        check_arity("list-tail", args.len(), 2, Some(2))?;
        let idx = index_arg("list-tail", &args[1])?;
        let mut rest = args[0].clone();
        for _ in 0..idx {
            let Cell::Pair(p) = &rest else {
                return Err(SchemeError::index("list-tail", "index out of range"));
            };
            let next = p.borrow().cdr.clone();
            rest = next;
        }
        Ok(rest)
    }));
    define_builtin(env, interner, "map", Rc::new(|a, e, args| map(a, e, args)));
    define_builtin(env, interner, "for-each", Rc::new(|a, e, args| {
        map(a, e, args)?;
        Ok(Cell::Unspecified)
    }));
    define_builtin(env, interner, "apply", Rc::new(|a, e, args| apply_primitive(a, e, args)));

    define_builtin(env, interner, "memq", Rc::new(|_a, _e, args| {
        check_arity("memq", args.len(), 2, Some(2))?;
        Ok(mem_by(&args[0], &args[1], Cell::eq))
    }));
    define_builtin(env, interner, "memv", Rc::new(|_a, _e, args| {
        check_arity("memv", args.len(), 2, Some(2))?;
        Ok(mem_by(&args[0], &args[1], Cell::eqv))
    }));
    define_builtin(env, interner, "member", Rc::new(|a, e, args| {
        check_arity("member", args.len(), 2, Some(3))?;
        member(a, e, args)
    }));
    define_builtin(env, interner, "assq", Rc::new(|_a, _e, args| {
        check_arity("assq", args.len(), 2, Some(2))?;
        assoc_by("assq", &args[0], &args[1], Cell::eq)
    }));
    define_builtin(env, interner, "assv", Rc::new(|_a, _e, args| {
        check_arity("assv", args.len(), 2, Some(2))?;
        assoc_by("assv", &args[0], &args[1], Cell::eqv)
    }));
    define_builtin(env, interner, "assoc", Rc::new(|a, e, args| {
        check_arity("assoc", args.len(), 2, Some(3))?;
        assoc(a, e, args)
    }));
    define_builtin(env, interner, "list-copy", Rc::new(|_a, _e, args| {
        check_arity("list-copy", args.len(), 1, Some(1))?;
        match &args[0] {
            Cell::Pair(_) => {
                let items = to_proper_vec("list-copy", &args[0])?;
                Ok(Cell::list(items))
            }
            other => Ok(other.clone()),
        }
    }));
}

fn mem_by(key: &Cell, list: &Cell, same: impl Fn(&Cell, &Cell) -> bool) -> Cell {
    let mut cur = list.clone();
    while let Cell::Pair(p) = &cur {
        let b = p.borrow();
        if same(&b.car, key) {
            return cur.clone();
        }
        let next = b.cdr.clone();
        drop(b);
        cur = next;
    }
    Cell::Boolean(false)
}

fn member(applyer: &mut dyn Applyer, env: &Env, args: &[Cell]) -> Result<Cell, SchemeError> {
    let key = &args[0];
    let mut cur = args[1].clone();
    while let Cell::Pair(p) = &cur {
        let (car, next) = {
            let b = p.borrow();
            (b.car.clone(), b.cdr.clone())
        };
        let matched = match args.get(2) {
            Some(pred) => applyer.apply(pred, vec![car.clone(), key.clone()], env)?.is_truthy(),
            None => car.equal(key),
        };
        if matched {
            return Ok(cur);
        }
        cur = next;
    }
    Ok(Cell::Boolean(false))
}

fn assoc_by(proc: &str, key: &Cell, alist: &Cell, same: impl Fn(&Cell, &Cell) -> bool) -> Result<Cell, SchemeError> {
    let mut cur = alist.clone();
    while let Cell::Pair(p) = &cur {
        let (car, next) = {
            let b = p.borrow();
            (b.car.clone(), b.cdr.clone())
        };
        let Cell::Pair(entry) = &car else {
            return Err(SchemeError::new(cozenage_core::ErrorKind::Value, format!("{proc}: alist entry is not a pair")));
        };
        if same(&entry.borrow().car, key) {
            return Ok(car);
        }
        cur = next;
    }
    Ok(Cell::Boolean(false))
}

fn assoc(applyer: &mut dyn Applyer, env: &Env, args: &[Cell]) -> Result<Cell, SchemeError> {
    let key = &args[0];
    let mut cur = args[1].clone();
    while let Cell::Pair(p) = &cur {
        let (car, next) = {
            let b = p.borrow();
            (b.car.clone(), b.cdr.clone())
        };
        let Cell::Pair(entry) = &car else {
            return Err(SchemeError::new(cozenage_core::ErrorKind::Value, "assoc: alist entry is not a pair"));
        };
        let entry_key = entry.borrow().car.clone();
        let matched = match args.get(2) {
            Some(pred) => applyer.apply(pred, vec![entry_key, key.clone()], env)?.is_truthy(),
            None => entry.borrow().car.equal(key),
        };
        if matched {
            return Ok(car);
        }
        cur = next;
    }
    Ok(Cell::Boolean(false))
}

fn pair_field(proc: &str, c: &Cell, get: impl Fn(&cozenage_core::Pair) -> Cell) -> Result<Cell, SchemeError> {
    match c {
        Cell::Pair(p) => Ok(get(&p.borrow())),
        other => Err(SchemeError::wrong_type(proc, "a pair", other.type_name())),
    }
}

fn length(c: &Cell) -> Result<Cell, SchemeError> {
    let mut n: i64 = 0;
    let mut cur = c.clone();
    loop {
        match cur {
            Cell::Nil => return Ok(Cell::integer(n)),
            Cell::Pair(p) => {
                n += 1;
                let next = p.borrow().cdr.clone();
                cur = next;
            }
            other => return Err(SchemeError::wrong_type("length", "a proper list", other.type_name())),
        }
    }
}

fn to_proper_vec(proc: &str, c: &Cell) -> Result<Vec<Cell>, SchemeError> {
    let mut out = Vec::new();
    let mut cur = c.clone();
    loop {
        match cur {
            Cell::Nil => return Ok(out),
            Cell::Pair(p) => {
                let b = p.borrow();
                out.push(b.car.clone());
                cur = b.cdr.clone();
            }
            other => return Err(SchemeError::wrong_type(proc, "a proper list", other.type_name())),
        }
    }
}

fn index_arg(proc: &str, c: &Cell) -> Result<usize, SchemeError> {
    match c {
        Cell::Number(cozenage_core::Number::Integer(i)) if *i >= 0 => Ok(*i as usize),
        other => Err(SchemeError::wrong_type(proc, "a non-negative exact integer", other.type_name())),
    }
}

fn append(args: &[Cell]) -> Result<Cell, SchemeError> {
    let Some((last, init)) = args.split_last() else {
        return Ok(Cell::Nil);
    };
    let mut items = Vec::new();
    for list in init {
        items.extend(to_proper_vec("append", list)?);
    }
    Ok(Cell::list_with_tail(items, last.clone()))
}

fn map(applyer: &mut dyn Applyer, env: &Env, args: &[Cell]) -> Result<Cell, SchemeError> {
    check_arity("map", args.len(), 2, None)?;
    let proc = args[0].clone();
    let lists: Vec<Vec<Cell>> = args[1..]
        .iter()
        .map(|l| to_proper_vec("map", l))
        .collect::<Result<_, _>>()?;
    let len = lists.iter().map(Vec::len).min().unwrap_or(0);
    let mut results = Vec::with_capacity(len);
    for i in 0..len {
        let call_args: Vec<Cell> = lists.iter().map(|l| l[i].clone()).collect();
        results.push(applyer.apply(&proc, call_args, env)?);
    }
    Ok(Cell::list(results))
}

fn apply_primitive(applyer: &mut dyn Applyer, env: &Env, args: &[Cell]) -> Result<Cell, SchemeError> {
    check_arity("apply", args.len(), 2, None)?;
    let proc = args[0].clone();
    let (last, middle) = args[1..].split_last().expect("arity checked above");
    let mut call_args: Vec<Cell> = middle.to_vec();
    call_args.extend(to_proper_vec("apply", last)?);
    applyer.apply(&proc, call_args, env)
}
