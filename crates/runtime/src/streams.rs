//! Promise and stream primitives (spec §4.4/§8 property 6-7), grounded
//! on `original_source/src/base-lib/lazy.c`.
//!
//! `force` itself is `cozenage_evaluator::force`'s trampoline; this
//! module only wraps it (and the stream accessors built on top of it)
//! as callable `Procedure::Builtin`s, since the evaluator crate exposes
//! `force` as a plain function rather than registering it anywhere.

use cozenage_core::{Applyer, Cell, Env, Interner, Number, Promise, PromiseStatus, SchemeError, Stream, check_arity};
use std::cell::RefCell;
use std::rc::Rc;

use crate::registry::define_builtin;

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "force", Rc::new(|a, _e, args| {
        check_arity("force", args.len(), 1, Some(1))?;
        cozenage_evaluator::force(a, &args[0])
    }));
    define_builtin(env, interner, "make-promise", Rc::new(|_a, _e, args| {
        check_arity("make-promise", args.len(), 1, Some(1))?;
        if matches!(args[0], Cell::Promise(_)) {
            return Ok(args[0].clone());
        }
        let promise = Promise {
            status: PromiseStatus::Done,
            expr: args[0].clone(),
            env: None,
        };
        Ok(Cell::Promise(Rc::new(RefCell::new(promise))))
    }));

    define_builtin(env, interner, "head", Rc::new(|_a, _e, args| {
        check_arity("head", args.len(), 1, Some(1))?;
        Ok(stream_of("head", &args[0])?.head.clone())
    }));
    define_builtin(env, interner, "tail", Rc::new(|a, _e, args| {
        check_arity("tail", args.len(), 1, Some(1))?;
        if matches!(args[0], Cell::Nil) {
            return Ok(Cell::Nil);
        }
        let stream = stream_of("tail", &args[0])?;
        cozenage_evaluator::force(a, &stream.tail)
    }));
    define_builtin(env, interner, "at", Rc::new(|a, _e, args| {
        check_arity("at", args.len(), 2, Some(2))?;
        let mut n = index_arg("at", &args[0])?;
        let mut cell = args[1].clone();
        while n > 0 {
            let stream = stream_of("at", &cell)?;
            cell = cozenage_evaluator::force(a, &stream.tail)?;
            n -= 1;
        }
        Ok(stream_of("at", &cell)?.head.clone())
    }));
    define_builtin(env, interner, "take", Rc::new(|a, _e, args| {
        check_arity("take", args.len(), 2, Some(2))?;
        let mut n = index_arg("take", &args[0])?;
        let mut cell = args[1].clone();
        let mut taken = Vec::new();
        while n > 0 {
            let Cell::Stream(stream) = &cell else { break };
            taken.push(stream.head.clone());
            let tail = stream.tail.clone();
            n -= 1;
            cell = cozenage_evaluator::force(a, &tail)?;
        }
        Ok(Cell::list(taken))
    }));
    define_builtin(env, interner, "drop", Rc::new(|a, _e, args| {
        check_arity("drop", args.len(), 2, Some(2))?;
        let mut n = index_arg("drop", &args[0])?;
        let mut cell = args[1].clone();
        while n > 0 {
            let Cell::Stream(stream) = &cell else { break };
            let tail = stream.tail.clone();
            n -= 1;
            cell = cozenage_evaluator::force(a, &tail)?;
        }
        Ok(cell)
    }));
    define_builtin(env, interner, "stream-null?", Rc::new(|_a, _e, args| {
        check_arity("stream-null?", args.len(), 1, Some(1))?;
        Ok(Cell::Boolean(matches!(args[0], Cell::Nil)))
    }));
}

fn index_arg(proc: &str, c: &Cell) -> Result<i64, SchemeError> {
    match c {
        Cell::Number(Number::Integer(n)) if *n >= 0 => Ok(*n),
        other => Err(SchemeError::wrong_type(proc, "a non-negative exact integer", other.type_name())),
    }
}

fn stream_of(proc: &str, c: &Cell) -> Result<Rc<Stream>, SchemeError> {
    match c {
        Cell::Stream(s) => Ok(s.clone()),
        other => Err(SchemeError::wrong_type(proc, "a stream", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozenage_core::Interner;

    struct NoopApplyer;
    impl Applyer for NoopApplyer {
        fn apply(&mut self, _p: &Cell, _a: Vec<Cell>, _e: &Env) -> Result<Cell, SchemeError> {
            unreachable!()
        }
        fn eval(&mut self, expr: &Cell, env: &Env) -> Result<Cell, SchemeError> {
            cozenage_evaluator::Interpreter::new().eval(expr, env)
        }
    }

    fn call(env: &Env, interner: &mut Interner, name: &str, args: Vec<Cell>) -> Result<Cell, SchemeError> {
        let sym = interner.intern(name);
        let Cell::Procedure(p) = env.lookup(&sym).unwrap() else { panic!() };
        let cozenage_core::Procedure::Builtin { func, .. } = p.as_ref() else { panic!() };
        func(&mut NoopApplyer, env, &args)
    }

    #[test]
    fn head_returns_the_stream_head_without_forcing_the_tail() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        let tail_promise = Promise::new_ready(Cell::integer(99), env.clone());
        let stream = Stream {
            head: Cell::integer(1),
            tail: Cell::Promise(Rc::new(RefCell::new(tail_promise))),
        };
        let result = call(&env, &mut interner, "head", vec![Cell::Stream(Rc::new(stream))]).unwrap();
        assert_eq!(result.to_string(), "1");
    }

    #[test]
    fn at_walks_n_tails_lazily() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        install(&env, &mut interner);
        // (stream 1 (stream 2 (stream 3 '())))
        let inner_tail = Promise::new_ready(Cell::Nil, env.clone());
        let third = Stream {
            head: Cell::integer(3),
            tail: Cell::Promise(Rc::new(RefCell::new(inner_tail))),
        };
        let mid_tail = Promise::new_ready(Cell::Stream(Rc::new(third)), env.clone());
        let second = Stream {
            head: Cell::integer(2),
            tail: Cell::Promise(Rc::new(RefCell::new(mid_tail))),
        };
        let outer_tail = Promise::new_ready(Cell::Stream(Rc::new(second)), env.clone());
        let first = Stream {
            head: Cell::integer(1),
            tail: Cell::Promise(Rc::new(RefCell::new(outer_tail))),
        };
        let result = call(&env, &mut interner, "at", vec![Cell::integer(2), Cell::Stream(Rc::new(first))]).unwrap();
        assert_eq!(result.to_string(), "3");
    }
}
