//! The trampoline loop (spec §4.4): `(env, expr)` runs until a special
//! form or procedure application yields a final value instead of a
//! "continue with (expr, env)" signal. Tail calls reuse this loop's
//! iteration instead of the host call stack.

use crate::special_forms;
use cozenage_core::{Applyer, Cell, Env, SchemeError};

/// What a special-form handler or a procedure application yields: a
/// final value, or "loop again with this (expr, env)" — the mechanism
/// that lets tail calls run in constant host-stack space.
pub(crate) enum Step {
    Return(Cell),
    Continue(Cell, Env),
}

/// The hook `import` calls to resolve `(category name)` into actual
/// registered primitives. `cozenage-evaluator` doesn't know how to load
/// a shared library or populate a primitive table — that's
/// `cozenage-runtime`'s job — so this trait is the same narrow-seam
/// pattern `cozenage_core::Applyer` uses to avoid an upward dependency.
pub trait LibraryLoader {
    fn load(&mut self, category: &str, name: &str, env: &Env) -> Result<(), SchemeError>;
}

struct NullLoader;

impl LibraryLoader for NullLoader {
    fn load(&mut self, category: &str, name: &str, _env: &Env) -> Result<(), SchemeError> {
        Err(SchemeError::general(format!(
            "import: no library loader configured for ({category} {name})"
        )))
    }
}

/// The evaluator's `Applyer` implementation. Holds no interpreter state
/// of its own beyond the library loader hook — every other piece of
/// state (bindings, promises, macros) lives in the `Env`/`Cell` graph
/// it's handed.
pub struct Interpreter {
    loader: Box<dyn LibraryLoader>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            loader: Box::new(NullLoader),
        }
    }

    pub fn with_loader(loader: Box<dyn LibraryLoader>) -> Self {
        Interpreter { loader }
    }

    pub(crate) fn loader_mut(&mut self) -> &mut dyn LibraryLoader {
        self.loader.as_mut()
    }

    /// Evaluate one already-expanded expression to a final value,
    /// trampolining through tail positions without growing the host
    /// stack.
    pub(crate) fn eval_trampoline(&mut self, mut env: Env, mut expr: Cell) -> Result<Cell, SchemeError> {
        loop {
            match &expr {
                Cell::Symbol(sym) => return env.lookup(sym),
                Cell::Pair(_) => {
                    let items = expr
                        .to_vec()
                        .ok_or_else(|| SchemeError::syntax("cannot evaluate an improper list as an expression"))?;
                    let head = items[0].clone();

                    let proc = if let Cell::Symbol(sym) = &head {
                        if sym.special_form_id != 0 {
                            tracing::trace!(form = %sym.name, "dispatching special form");
                            match special_forms::dispatch(sym.special_form_id, &items, &env, self)? {
                                Step::Return(value) => return Ok(value),
                                Step::Continue(next_expr, next_env) => {
                                    expr = next_expr;
                                    env = next_env;
                                    continue;
                                }
                            }
                        }
                        let bound = env.lookup(sym)?;
                        if let Cell::Procedure(p) = &bound {
                            if p.is_macro() {
                                tracing::trace!(macro_name = %sym.name, "expanding macro call");
                                let expanded = self.expand_macro_call(p, &items[1..], &env)?;
                                expr = expanded;
                                continue;
                            }
                        }
                        bound
                    } else {
                        self.eval_trampoline(env.clone(), head)?
                    };

                    let mut arg_values = Vec::with_capacity(items.len() - 1);
                    for arg in &items[1..] {
                        arg_values.push(self.eval_trampoline(env.clone(), arg.clone())?);
                    }
                    match self.apply_for_tail(&proc, arg_values, &env)? {
                        Step::Return(value) => return Ok(value),
                        Step::Continue(next_expr, next_env) => {
                            expr = next_expr;
                            env = next_env;
                        }
                    }
                }
                // Numbers, strings, chars, booleans, vectors, bytevectors,
                // procedures, promises, streams, ports, Nil, and the
                // remaining singletons are all self-evaluating.
                _ => return Ok(expr.clone()),
            }
        }
    }
}

impl Applyer for Interpreter {
    fn apply(&mut self, proc: &Cell, args: Vec<Cell>, env: &Env) -> Result<Cell, SchemeError> {
        match self.apply_for_tail(proc, args, env)? {
            Step::Return(value) => Ok(value),
            Step::Continue(expr, env) => self.eval_trampoline(env, expr),
        }
    }

    fn eval(&mut self, expr: &Cell, env: &Env) -> Result<Cell, SchemeError> {
        self.eval_trampoline(env.clone(), expr.clone())
    }
}

/// Evaluate all but the last of `body` for effect, then hand back the
/// last expression as a tail-call signal rather than evaluating it here
/// — the shared shape behind `let`, `letrec`, `begin`, and lambda
/// application.
pub(crate) fn eval_body_tail(body: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    if body.is_empty() {
        return Ok(Step::Return(Cell::Unspecified));
    }
    for expr in &body[..body.len() - 1] {
        interp.eval_trampoline(env.clone(), expr.clone())?;
    }
    Ok(Step::Continue(body[body.len() - 1].clone(), env.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozenage_core::{Formals, Interner, Procedure};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn global_env_with_keywords() -> (Env, Interner) {
        let mut interner = Interner::new();
        special_forms::install_keywords(&mut interner);
        (Env::new_global(), interner)
    }

    #[test]
    fn self_evaluating_atoms_return_unchanged() {
        let (env, _interner) = global_env_with_keywords();
        let mut interp = Interpreter::new();
        let result = interp.eval_trampoline(env, Cell::integer(42)).unwrap();
        assert_eq!(result.to_string(), "42");
    }

    #[test]
    fn quote_returns_datum_unevaluated() {
        let (env, mut interner) = global_env_with_keywords();
        let mut interp = Interpreter::new();
        let quote = Cell::symbol(interner.intern("quote"));
        let inner = Cell::symbol(interner.intern("x"));
        let form = Cell::list(vec![quote, inner.clone()]);
        let result = interp.eval_trampoline(env, form).unwrap();
        assert_eq!(result.to_string(), "x");
    }

    #[test]
    fn if_tail_calls_the_chosen_branch() {
        let (env, mut interner) = global_env_with_keywords();
        let mut interp = Interpreter::new();
        let if_sym = Cell::symbol(interner.intern("if"));
        let form = Cell::list(vec![if_sym, Cell::boolean(true), Cell::integer(1), Cell::integer(2)]);
        let result = interp.eval_trampoline(env, form).unwrap();
        assert_eq!(result.to_string(), "1");
    }

    #[test]
    fn deep_tail_recursion_does_not_overflow_the_host_stack() {
        // (define (loop n) (if (= n 0) 'ok (loop (- n 1)))), hand-built
        // directly in primitive form, called with n = 200000.
        let (env, mut interner) = global_env_with_keywords();
        let mut interp = Interpreter::new();
        let n = interner.intern("n");
        let eq_sym = interner.intern("=");
        let minus_sym = interner.intern("-");
        let loop_sym = interner.intern("loop");
        let ok_sym = interner.intern("ok");

        env.define_global(
            &eq_sym,
            Cell::Procedure(Rc::new(Procedure::Builtin {
                name: "=".into(),
                func: Rc::new(|_applyer, _env, args| match (&args[0], &args[1]) {
                    (Cell::Number(a), Cell::Number(b)) => Ok(Cell::boolean(a.to_string() == b.to_string())),
                    _ => Ok(Cell::boolean(false)),
                }),
            })),
        );
        env.define_global(
            &minus_sym,
            Cell::Procedure(Rc::new(Procedure::Builtin {
                name: "-".into(),
                func: Rc::new(|_applyer, _env, args| {
                    let (Cell::Number(a), Cell::Number(b)) = (&args[0], &args[1]) else {
                        return Err(SchemeError::general("not a number"));
                    };
                    let a: i64 = a.to_string().parse().unwrap();
                    let b: i64 = b.to_string().parse().unwrap();
                    Ok(Cell::integer(a - b))
                }),
            })),
        );

        let body = Cell::list(vec![
            Cell::symbol(interner.intern("if")),
            Cell::list(vec![Cell::symbol(eq_sym), Cell::symbol(n.clone()), Cell::integer(0)]),
            Cell::list(vec![Cell::symbol(interner.intern("quote")), Cell::symbol(ok_sym)]),
            Cell::list(vec![
                Cell::symbol(loop_sym.clone()),
                Cell::list(vec![Cell::symbol(minus_sym), Cell::symbol(n.clone()), Cell::integer(1)]),
            ]),
        ]);
        let lambda = Procedure::Lambda {
            name: RefCell::new(Some("loop".to_string())),
            formals: Formals::Fixed(vec![n]),
            body: vec![body],
            env: env.clone(),
        };
        env.define_global(&loop_sym, Cell::Procedure(Rc::new(lambda)));

        let call = Cell::list(vec![Cell::symbol(loop_sym), Cell::integer(200_000)]);
        let result = interp.eval_trampoline(env, call).unwrap();
        assert_eq!(result.to_string(), "ok");
    }
}
