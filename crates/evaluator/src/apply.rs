//! Procedure application (spec §4.4–§4.5): binding a `Lambda`'s formals
//! to argument values, calling out to a `Builtin`, and non-hygienic
//! `defmacro` substitution at an application's head position.

use crate::eval::{Interpreter, Step, eval_body_tail};
use cozenage_core::{Cell, Env, Formals, Procedure, SchemeError, check_arity};
use std::rc::Rc;

impl Interpreter {
    /// Apply `proc` to `args`, yielding either a final value (a builtin
    /// call) or a tail-call signal (a lambda body's last expression, to
    /// be picked up by the caller's trampoline loop rather than
    /// recursing here).
    pub(crate) fn apply_for_tail(&mut self, proc: &Cell, args: Vec<Cell>, env: &Env) -> Result<Step, SchemeError> {
        let p = match proc {
            Cell::Procedure(p) => p,
            other => {
                return Err(SchemeError::wrong_type("apply", "a procedure", other.type_name()));
            }
        };
        match p.as_ref() {
            Procedure::Builtin { func, .. } => {
                let result = func(self, env, &args)?;
                match result {
                    Cell::Trampoline(data) => {
                        let (inner_proc, inner_args) = Rc::try_unwrap(data).unwrap_or_else(|rc| (*rc).clone());
                        self.apply_for_tail(&inner_proc, inner_args, env)
                    }
                    value => Ok(Step::Return(value)),
                }
            }
            Procedure::Lambda { name, formals, body, env: closure_env } => {
                let call_env = build_lambda_env(formals, args, closure_env, name.borrow().clone())?;
                eval_body_tail(body, &call_env, self)
            }
            Procedure::Macro { name, .. } => Err(SchemeError::general(format!(
                "'{name}' is a macro and cannot be applied as a procedure"
            ))),
        }
    }

    /// Substitute `raw_args` (the unevaluated argument subtrees at a
    /// macro call site) for the macro's formals, then evaluate its body
    /// — already-expanded template code — to produce the expression
    /// that replaces the call. The body runs in the macro's own closure
    /// environment, not the caller's: this is what makes the expansion
    /// non-hygienic, since names the template introduces resolve there,
    /// but the *result* of expansion is spliced back in and evaluated
    /// by the caller's trampoline in the caller's environment.
    pub(crate) fn expand_macro_call(&mut self, proc: &Rc<Procedure>, raw_args: &[Cell], _caller_env: &Env) -> Result<Cell, SchemeError> {
        let Procedure::Macro { name, formals, body, env } = proc.as_ref() else {
            unreachable!("expand_macro_call called on a non-macro procedure");
        };
        let macro_env = build_lambda_env(formals, raw_args.to_vec(), env, Some(name.clone()))?;
        let mut expansion = Cell::Unspecified;
        for expr in body {
            expansion = self.eval_trampoline(macro_env.clone(), expr.clone())?;
        }
        Ok(expansion)
    }
}

/// Bind `args` to `formals` in a new child of `closure_env`, the shape
/// shared by lambda application and macro substitution.
pub(crate) fn build_lambda_env(formals: &Formals, args: Vec<Cell>, closure_env: &Env, proc_name: Option<String>) -> Result<Env, SchemeError> {
    let label = proc_name.as_deref().unwrap_or("#<lambda>");
    match formals {
        Formals::Fixed(names) => {
            check_arity(label, args.len(), names.len(), Some(names.len()))?;
            Ok(closure_env.extend(names.clone(), args))
        }
        Formals::Variadic(rest) => {
            let call_env = closure_env.new_child();
            call_env.bind_local(rest.clone(), Cell::list(args));
            Ok(call_env)
        }
        Formals::Dotted(names, rest) => {
            check_arity(label, args.len(), names.len(), None)?;
            let call_env = closure_env.new_child();
            let mut args = args.into_iter();
            for name in names {
                call_env.bind_local(name.clone(), args.next().expect("arity already checked"));
            }
            call_env.bind_local(rest.clone(), Cell::list(args.collect()));
            Ok(call_env)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozenage_core::{Applyer, Interner};
    use std::cell::RefCell;

    fn builtin_add() -> Cell {
        Cell::Procedure(Rc::new(Procedure::Builtin {
            name: "+".into(),
            func: Rc::new(|_applyer, _env, args| {
                let (Cell::Number(a), Cell::Number(b)) = (&args[0], &args[1]) else {
                    return Err(SchemeError::general("not a number"));
                };
                let a: i64 = a.to_string().parse().unwrap();
                let b: i64 = b.to_string().parse().unwrap();
                Ok(Cell::integer(a + b))
            }),
        }))
    }

    #[test]
    fn fixed_formals_bind_positionally_and_check_arity() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let formals = Formals::Fixed(vec![x.clone()]);
        let bound = build_lambda_env(&formals, vec![Cell::integer(1)], &env, Some("f".into())).unwrap();
        assert_eq!(bound.lookup(&x).unwrap().to_string(), "1");

        let err = build_lambda_env(&formals, vec![Cell::integer(1), Cell::integer(2)], &env, Some("f".into()));
        assert!(err.is_err());
    }

    #[test]
    fn variadic_formals_collect_all_args_into_a_list() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        let rest = interner.intern("rest");
        let formals = Formals::Variadic(rest.clone());
        let bound = build_lambda_env(&formals, vec![Cell::integer(1), Cell::integer(2)], &env, None).unwrap();
        assert_eq!(bound.lookup(&rest).unwrap().to_string(), "(1 2)");
    }

    #[test]
    fn dotted_formals_split_fixed_prefix_from_rest() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let rest = interner.intern("rest");
        let formals = Formals::Dotted(vec![a.clone()], rest.clone());
        let bound = build_lambda_env(&formals, vec![Cell::integer(1), Cell::integer(2), Cell::integer(3)], &env, None).unwrap();
        assert_eq!(bound.lookup(&a).unwrap().to_string(), "1");
        assert_eq!(bound.lookup(&rest).unwrap().to_string(), "(2 3)");
    }

    #[test]
    fn applying_a_macro_directly_is_an_error() {
        let env = Env::new_global();
        let mut interner = Interner::new();
        let name = interner.intern("m");
        let macro_proc = Procedure::Macro {
            name: "m".into(),
            formals: Formals::Fixed(vec![]),
            body: vec![Cell::integer(1)],
            env: env.clone(),
        };
        let mut interp = Interpreter::new();
        let result = interp.apply(&Cell::Procedure(Rc::new(macro_proc)), vec![], &env);
        let _ = name;
        assert!(result.is_err());
    }

    #[test]
    fn builtin_trampoline_sentinel_re_enters_apply_without_growing_the_stack() {
        // A builtin that wants tail behavior (like `apply`) returns
        // Cell::Trampoline instead of calling back into Applyer::apply
        // itself.
        let env = Env::new_global();
        let redirecting = Cell::Procedure(Rc::new(Procedure::Builtin {
            name: "call-add".into(),
            func: Rc::new(move |_applyer, _env, args| {
                Ok(Cell::Trampoline(Rc::new((builtin_add(), vec![args[0].clone(), args[1].clone()]))))
            }),
        }));
        let mut interp = Interpreter::new();
        let result = interp.apply(&redirecting, vec![Cell::integer(3), Cell::integer(4)], &env).unwrap();
        assert_eq!(result.to_string(), "7");
    }

    #[test]
    fn lambda_body_runs_in_a_closure_capturing_environment() {
        // (lambda () counter), where `counter` is defined in the
        // closure's environment after the lambda is created but before
        // it's called -- confirms the environment is captured by
        // reference, not by value, at lambda-creation time.
        let outer = Env::new_global();
        let mut interner = Interner::new();
        let counter = interner.intern("counter");
        let lambda = Procedure::Lambda {
            name: RefCell::new(Some("get".into())),
            formals: Formals::Fixed(vec![]),
            body: vec![Cell::symbol(counter.clone())],
            env: outer.clone(),
        };
        outer.define_global(&counter, Cell::integer(10));
        let mut interp = Interpreter::new();
        let result = interp.apply(&Cell::Procedure(Rc::new(lambda)), vec![], &outer).unwrap();
        assert_eq!(result.to_string(), "10");
    }
}
