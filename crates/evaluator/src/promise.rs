//! `force` (spec §4.4, §8 property 6): drives a promise's
//! READY/LAZY/RUNNING/DONE state machine. LAZY promises (`delay-force`)
//! whose result is itself a promise adopt that promise's slots and loop
//! again, rather than recursing, so a chain of `delay-force` calls
//! forces in constant host-stack space.

use cozenage_core::{Applyer, Cell, PromiseStatus, SchemeError};
use std::rc::Rc;

/// Force `promise_cell` to a final value. Forcing anything that isn't a
/// promise returns it unchanged, matching R7RS's permissive `force`.
pub fn force(interp: &mut dyn Applyer, promise_cell: &Cell) -> Result<Cell, SchemeError> {
    let Cell::Promise(promise_rc) = promise_cell else {
        return Ok(promise_cell.clone());
    };

    loop {
        let (status, expr, env) = {
            let p = promise_rc.borrow();
            (p.status, p.expr.clone(), p.env.clone())
        };

        match status {
            PromiseStatus::Done => return Ok(expr),
            PromiseStatus::Running => {
                return Err(SchemeError::general(
                    "force: promise is already being forced (circular dependency)",
                ));
            }
            PromiseStatus::Ready | PromiseStatus::Lazy => {
                promise_rc.borrow_mut().status = PromiseStatus::Running;
                let env = env.expect("a Ready or Lazy promise always carries its defining environment");
                let result = interp.eval(&expr, &env)?;

                if status == PromiseStatus::Lazy {
                    if let Cell::Promise(inner_rc) = &result {
                        if Rc::ptr_eq(promise_rc, inner_rc) {
                            return Err(SchemeError::general("force: promise forces itself"));
                        }
                        let (inner_status, inner_expr, inner_env) = {
                            let inner = inner_rc.borrow();
                            (inner.status, inner.expr.clone(), inner.env.clone())
                        };
                        let mut p = promise_rc.borrow_mut();
                        p.status = inner_status;
                        p.expr = inner_expr;
                        p.env = inner_env;
                        drop(p);
                        continue;
                    }
                }

                let mut p = promise_rc.borrow_mut();
                p.status = PromiseStatus::Done;
                p.expr = result.clone();
                p.env = None;
                return Ok(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Interpreter;
    use cozenage_core::{Env, Interner, Promise};
    use std::cell::RefCell;

    #[test]
    fn forcing_a_non_promise_returns_it_unchanged() {
        let mut interp = Interpreter::new();
        let value = Cell::integer(7);
        assert_eq!(force(&mut interp, &value).unwrap().to_string(), "7");
    }

    #[test]
    fn force_memoizes_a_ready_promise() {
        let env = Env::new_global();
        let mut interp = Interpreter::new();
        let promise = Promise::new_ready(Cell::integer(42), env);
        let cell = Cell::Promise(Rc::new(RefCell::new(promise)));

        assert_eq!(force(&mut interp, &cell).unwrap().to_string(), "42");
        // Forcing again hits the Done branch directly.
        assert_eq!(force(&mut interp, &cell).unwrap().to_string(), "42");
    }

    #[test]
    fn delay_force_chain_adopts_the_inner_promise_and_collapses() {
        let env = Env::new_global();
        let mut interp = Interpreter::new();
        let ready = Cell::Promise(Rc::new(RefCell::new(Promise::new_ready(Cell::integer(5), env.clone()))));
        let lazy = Cell::Promise(Rc::new(RefCell::new(Promise::new_lazy(ready, env))));

        assert_eq!(force(&mut interp, &lazy).unwrap().to_string(), "5");
    }

    #[test]
    fn forcing_a_self_referential_promise_errors_instead_of_looping_forever() {
        let mut interner = Interner::new();
        let env = Env::new_global();
        let sym = interner.intern("self");
        let promise_rc = Rc::new(RefCell::new(Promise::new_lazy(Cell::symbol(sym.clone()), env.clone())));
        let promise_cell = Cell::Promise(promise_rc);
        env.define_global(&sym, promise_cell.clone());

        let mut interp = Interpreter::new();
        assert!(force(&mut interp, &promise_cell).is_err());
    }
}
