//! The primitive special-form dispatch table (spec §4.4). Each handler
//! receives the whole form (head included, for arity-error messages),
//! unevaluated, and returns a `Step`: a final value, or the next
//! `(expr, env)` to continue the trampoline with.
//!
//! Keyword symbols are pre-interned here with a non-zero
//! `special_form_id` so the evaluator's dispatch is a cheap integer
//! match rather than a string comparison.

use crate::eval::{Interpreter, Step, eval_body_tail};
use cozenage_core::{Cell, Env, Formals, Interner, Procedure, Promise, SchemeError, Stream, check_arity};
use std::cell::RefCell;
use std::rc::Rc;

pub const SF_DEFINE: u32 = 1;
pub const SF_QUOTE: u32 = 2;
pub const SF_LAMBDA: u32 = 3;
pub const SF_IF: u32 = 4;
pub const SF_LET: u32 = 5;
pub const SF_LETREC: u32 = 6;
pub const SF_SET: u32 = 7;
pub const SF_BEGIN: u32 = 8;
pub const SF_AND: u32 = 9;
pub const SF_IMPORT: u32 = 10;
pub const SF_DEFMACRO: u32 = 11;
pub const SF_DELAY: u32 = 12;
pub const SF_DELAY_FORCE: u32 = 13;
pub const SF_STREAM: u32 = 14;
pub const SF_WITH_GC_STATS: u32 = 15;

/// Pre-intern every primitive special-form keyword with its dispatch
/// id. Call once at startup, before any source is read. `cons-stream`
/// is the traditional alias for `stream`.
pub fn install_keywords(interner: &mut Interner) {
    interner.intern_keyword("define", SF_DEFINE);
    interner.intern_keyword("quote", SF_QUOTE);
    interner.intern_keyword("lambda", SF_LAMBDA);
    interner.intern_keyword("if", SF_IF);
    interner.intern_keyword("let", SF_LET);
    interner.intern_keyword("letrec", SF_LETREC);
    interner.intern_keyword("set!", SF_SET);
    interner.intern_keyword("begin", SF_BEGIN);
    interner.intern_keyword("and", SF_AND);
    interner.intern_keyword("import", SF_IMPORT);
    interner.intern_keyword("defmacro", SF_DEFMACRO);
    interner.intern_keyword("delay", SF_DELAY);
    interner.intern_keyword("delay-force", SF_DELAY_FORCE);
    interner.intern_keyword("stream", SF_STREAM);
    interner.intern_keyword("cons-stream", SF_STREAM);
    interner.intern_keyword("with-gc-stats", SF_WITH_GC_STATS);
}

pub(crate) fn dispatch(id: u32, items: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    match id {
        SF_DEFINE => sf_define(items, env, interp),
        SF_QUOTE => sf_quote(items),
        SF_LAMBDA => sf_lambda(items, env),
        SF_IF => sf_if(items, env, interp),
        SF_LET => sf_let(items, env, interp),
        SF_LETREC => sf_letrec(items, env, interp),
        SF_SET => sf_set(items, env, interp),
        SF_BEGIN => eval_body_tail(&items[1..], env, interp),
        SF_AND => sf_and(items, env, interp),
        SF_IMPORT => sf_import(items, env, interp),
        SF_DEFMACRO => sf_defmacro(items, env),
        SF_DELAY => sf_delay(items, env),
        SF_DELAY_FORCE => sf_delay_force(items, env),
        SF_STREAM => sf_stream(items, env, interp),
        SF_WITH_GC_STATS => sf_with_gc_stats(items, env, interp),
        other => unreachable!("dispatch called with unknown special form id {other}"),
    }
}

/// A formals spec is a bare symbol (fully variadic), a proper list of
/// symbols, or a dotted list ending in a symbol (fixed + rest).
fn parse_formals(cell: &Cell) -> Result<Formals, SchemeError> {
    match cell {
        Cell::Symbol(s) => Ok(Formals::Variadic(s.clone())),
        Cell::Nil => Ok(Formals::Fixed(Vec::new())),
        Cell::Pair(_) => {
            let mut fixed = Vec::new();
            let mut cur = cell.clone();
            loop {
                match cur {
                    Cell::Pair(p) => {
                        let pair = p.borrow();
                        match &pair.car {
                            Cell::Symbol(s) => fixed.push(s.clone()),
                            other => {
                                return Err(SchemeError::syntax(format!(
                                    "formal parameter must be a symbol, got {}",
                                    other.type_name()
                                )));
                            }
                        }
                        let next = pair.cdr.clone();
                        drop(pair);
                        cur = next;
                    }
                    Cell::Nil => return Ok(Formals::Fixed(fixed)),
                    Cell::Symbol(rest) => return Ok(Formals::Dotted(fixed, rest)),
                    _ => return Err(SchemeError::syntax("malformed formals list")),
                }
            }
        }
        other => Err(SchemeError::syntax(format!(
            "formals must be a symbol or a list of symbols, got {}",
            other.type_name()
        ))),
    }
}

/// `(define name expr)` — compound-target defines are rewritten to this
/// shape by the expander before the evaluator ever sees them. Forbids
/// rebinding a syntactic keyword. Returns the defining symbol for a
/// plain value, or the procedure cell itself when defining a procedure
/// (so a REPL can echo `#<procedure f>` rather than just `f`).
fn sf_define(items: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    check_arity("define", items.len() - 1, 2, Some(2))?;
    let sym = match &items[1] {
        Cell::Symbol(s) => s.clone(),
        other => {
            return Err(SchemeError::syntax(format!(
                "define: target must be a symbol, got {}",
                other.type_name()
            )));
        }
    };
    if sym.special_form_id != 0 {
        return Err(SchemeError::syntax(format!(
            "define: cannot rebind syntactic keyword '{}'",
            sym.name
        )));
    }
    let value = interp.eval_trampoline(env.clone(), items[2].clone())?;
    if let Cell::Procedure(proc) = &value {
        if let Procedure::Lambda { name, .. } = proc.as_ref() {
            if name.borrow().is_none() {
                *name.borrow_mut() = Some(sym.name.clone());
            }
        }
        return Ok(Step::Return(value));
    }
    env.define_global(&sym, value);
    Ok(Step::Return(Cell::Symbol(sym)))
}

/// `(quote datum)` — return `datum` unevaluated. The parser's mutable
/// `SExpr` container, if one somehow reaches here, is converted to a
/// proper list first.
fn sf_quote(items: &[Cell]) -> Result<Step, SchemeError> {
    check_arity("quote", items.len() - 1, 1, Some(1))?;
    let datum = match &items[1] {
        Cell::SExpr(v) => Cell::list(v.borrow().clone()),
        other => other.clone(),
    };
    Ok(Step::Return(datum))
}

/// `(lambda formals body…)` — capture the current environment; body is
/// one or more already-expanded expressions (a multi-expression body
/// was wrapped in `begin` by the expander, so in practice this is
/// almost always a single expression, but the handler doesn't assume
/// that).
fn sf_lambda(items: &[Cell], env: &Env) -> Result<Step, SchemeError> {
    if items.len() < 3 {
        return Err(SchemeError::syntax("lambda: missing formals or body"));
    }
    let formals = parse_formals(&items[1])?;
    let proc = Procedure::Lambda {
        name: RefCell::new(None),
        formals,
        body: items[2..].to_vec(),
        env: env.clone(),
    };
    Ok(Step::Return(Cell::Procedure(Rc::new(proc))))
}

/// `(if test consequent [alternate])` — everything but `#f` is truthy;
/// the chosen branch is a tail call.
fn sf_if(items: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    check_arity("if", items.len() - 1, 2, Some(3))?;
    let test = interp.eval_trampoline(env.clone(), items[1].clone())?;
    if test.is_truthy() {
        Ok(Step::Continue(items[2].clone(), env.clone()))
    } else if items.len() == 4 {
        Ok(Step::Continue(items[3].clone(), env.clone()))
    } else {
        Ok(Step::Return(Cell::Unspecified))
    }
}

fn binding_name_and_init(binding: &Cell, form: &str) -> Result<(cozenage_core::Symbol, Cell), SchemeError> {
    let pair = binding
        .to_vec()
        .ok_or_else(|| SchemeError::syntax(format!("{form}: malformed binding")))?;
    if pair.len() != 2 {
        return Err(SchemeError::syntax(format!("{form}: malformed binding")));
    }
    let name = match &pair[0] {
        Cell::Symbol(s) => s.clone(),
        other => {
            return Err(SchemeError::syntax(format!(
                "{form}: binding name must be a symbol, got {}",
                other.type_name()
            )));
        }
    };
    Ok((name, pair[1].clone()))
}

/// `(let ((v e)…) body…)` — inits evaluate in the *outer* environment,
/// then the body runs in a fresh frame (spec §8 property 10). Named
/// `let` never reaches here; the expander rewrites it to `letrec`.
fn sf_let(items: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    if items.len() < 3 {
        return Err(SchemeError::syntax("let: missing bindings or body"));
    }
    let bindings = items[1]
        .to_vec()
        .ok_or_else(|| SchemeError::syntax("let: malformed bindings"))?;
    let mut names = Vec::with_capacity(bindings.len());
    let mut values = Vec::with_capacity(bindings.len());
    for b in &bindings {
        let (name, init) = binding_name_and_init(b, "let")?;
        values.push(interp.eval_trampoline(env.clone(), init)?);
        names.push(name);
    }
    let new_env = env.extend(names, values);
    eval_body_tail(&items[2..], &new_env, interp)
}

/// `(letrec ((v e)…) body…)` — all names are pre-bound to `Unspecified`
/// in the new frame before any init runs, so inits may close over each
/// other (mutual recursion).
fn sf_letrec(items: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    if items.len() < 3 {
        return Err(SchemeError::syntax("letrec: missing bindings or body"));
    }
    let bindings = items[1]
        .to_vec()
        .ok_or_else(|| SchemeError::syntax("letrec: malformed bindings"))?;
    let new_env = env.new_child();
    let mut names_and_inits = Vec::with_capacity(bindings.len());
    for b in &bindings {
        let (name, init) = binding_name_and_init(b, "letrec")?;
        new_env.bind_local(name.clone(), Cell::Unspecified);
        names_and_inits.push((name, init));
    }
    for (name, init) in &names_and_inits {
        let value = interp.eval_trampoline(new_env.clone(), init.clone())?;
        new_env.set(name, value)?;
    }
    eval_body_tail(&items[2..], &new_env, interp)
}

/// `(set! name expr)` — rebind the nearest existing binding; errors if
/// `name` is unbound anywhere. Always returns Unspecified (R7RS leaves
/// the return value unspecified; a REPL front end may additionally
/// echo the new value, but that display concern doesn't belong here).
fn sf_set(items: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    check_arity("set!", items.len() - 1, 2, Some(2))?;
    let name = match &items[1] {
        Cell::Symbol(s) => s.clone(),
        other => {
            return Err(SchemeError::syntax(format!(
                "set!: target must be a symbol, got {}",
                other.type_name()
            )));
        }
    };
    let value = interp.eval_trampoline(env.clone(), items[2].clone())?;
    env.set(&name, value)?;
    Ok(Step::Return(Cell::Unspecified))
}

/// `(and e…)` — `(and)` is `#t`; short-circuits on the first falsy
/// value (returning it), else tail-calls the last expression.
fn sf_and(items: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    let body = &items[1..];
    if body.is_empty() {
        return Ok(Step::Return(Cell::boolean(true)));
    }
    for expr in &body[..body.len() - 1] {
        let value = interp.eval_trampoline(env.clone(), expr.clone())?;
        if !value.is_truthy() {
            return Ok(Step::Return(value));
        }
    }
    Ok(Step::Continue(body[body.len() - 1].clone(), env.clone()))
}

/// `(import (category name)…)` — only the `base` category is currently
/// recognized at this layer; the actual search-path walk and
/// `dlopen`/`cozenage_library_init` call (spec §6) is delegated to
/// whatever `LibraryLoader` the `Interpreter` was built with.
fn sf_import(items: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    for spec in &items[1..] {
        let parts = spec
            .to_vec()
            .ok_or_else(|| SchemeError::syntax("import: malformed import spec"))?;
        if parts.len() != 2 {
            return Err(SchemeError::syntax("import: expected (category name)"));
        }
        let category = match &parts[0] {
            Cell::Symbol(s) => s.name.clone(),
            other => {
                return Err(SchemeError::syntax(format!(
                    "import: category must be a symbol, got {}",
                    other.type_name()
                )));
            }
        };
        let name = match &parts[1] {
            Cell::Symbol(s) => s.name.clone(),
            other => {
                return Err(SchemeError::syntax(format!(
                    "import: library name must be a symbol, got {}",
                    other.type_name()
                )));
            }
        };
        if category != "base" {
            return Err(SchemeError::syntax(format!("import: unsupported category '{category}'")));
        }
        tracing::debug!(%category, %name, "loading library");
        interp.loader_mut().load(&category, &name, env)?;
    }
    Ok(Step::Return(Cell::Unspecified))
}

/// `(defmacro name formals body…)` — installs a non-hygienic macro
/// transformer globally, exactly like a `define` would, tagged
/// distinctly so the evaluator substitutes rather than applies it.
fn sf_defmacro(items: &[Cell], env: &Env) -> Result<Step, SchemeError> {
    if items.len() < 4 {
        return Err(SchemeError::syntax("defmacro: missing name, formals, or body"));
    }
    let name = match &items[1] {
        Cell::Symbol(s) => s.clone(),
        other => {
            return Err(SchemeError::syntax(format!(
                "defmacro: name must be a symbol, got {}",
                other.type_name()
            )));
        }
    };
    if name.special_form_id != 0 {
        return Err(SchemeError::syntax(format!(
            "defmacro: cannot rebind syntactic keyword '{}'",
            name.name
        )));
    }
    let formals = parse_formals(&items[2])?;
    let macro_proc = Procedure::Macro {
        name: name.name.clone(),
        formals,
        body: items[3..].to_vec(),
        env: env.clone(),
    };
    env.define_global(&name, Cell::Procedure(Rc::new(macro_proc)));
    Ok(Step::Return(Cell::Symbol(name)))
}

fn sf_delay(items: &[Cell], env: &Env) -> Result<Step, SchemeError> {
    check_arity("delay", items.len() - 1, 1, Some(1))?;
    let promise = Promise::new_ready(items[1].clone(), env.clone());
    Ok(Step::Return(Cell::Promise(Rc::new(RefCell::new(promise)))))
}

/// `(delay-force expr)` — a LAZY promise: `force` treats its result as
/// another promise to adopt rather than a final value, which is what
/// lets chains of these trampoline in constant space.
fn sf_delay_force(items: &[Cell], env: &Env) -> Result<Step, SchemeError> {
    check_arity("delay-force", items.len() - 1, 1, Some(1))?;
    let promise = Promise::new_lazy(items[1].clone(), env.clone());
    Ok(Step::Return(Cell::Promise(Rc::new(RefCell::new(promise)))))
}

/// `(stream head tail-expr)` (aka `cons-stream`) — `head` is evaluated
/// eagerly, `tail-expr` is wrapped in a promise and evaluated only when
/// forced.
fn sf_stream(items: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    check_arity("stream", items.len() - 1, 2, Some(2))?;
    let head = interp.eval_trampoline(env.clone(), items[1].clone())?;
    let tail_promise = Promise::new_ready(items[2].clone(), env.clone());
    let stream = Stream {
        head,
        tail: Cell::Promise(Rc::new(RefCell::new(tail_promise))),
    };
    Ok(Step::Return(Cell::Stream(Rc::new(stream))))
}

/// `(with-gc-stats expr)` (spec §5): evaluates `expr` and reports
/// wall-clock elapsed time. A special form rather than a builtin
/// procedure because its argument must stay unevaluated until timing
/// starts — `(with-gc-stats (length (iota 100000)))` would otherwise
/// evaluate `(length (iota 100000))` before `with-gc-stats` ever runs.
fn sf_with_gc_stats(items: &[Cell], env: &Env, interp: &mut Interpreter) -> Result<Step, SchemeError> {
    check_arity("with-gc-stats", items.len() - 1, 1, Some(1))?;
    let start = std::time::Instant::now();
    let result = interp.eval_trampoline(env.clone(), items[1].clone())?;
    let elapsed = start.elapsed();
    tracing::info!(elapsed_ms = elapsed.as_secs_f64() * 1000.0, "with-gc-stats thunk completed");
    Ok(Step::Return(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozenage_core::Interner;

    fn env_and_interp() -> (Env, Interner, Interpreter) {
        let mut interner = Interner::new();
        install_keywords(&mut interner);
        (Env::new_global(), interner, Interpreter::new())
    }

    #[test]
    fn define_binds_globally_and_returns_the_symbol() {
        let (env, mut interner, mut interp) = env_and_interp();
        let define = Cell::symbol(interner.intern("define"));
        let x = interner.intern("x");
        let form = Cell::list(vec![define, Cell::symbol(x.clone()), Cell::integer(5)]);
        let items = form.to_vec().unwrap();
        let result = sf_define(&items, &env, &mut interp).unwrap();
        match result {
            Step::Return(v) => assert_eq!(v.to_string(), "x"),
            _ => panic!("expected Step::Return"),
        }
        assert_eq!(env.lookup(&x).unwrap().to_string(), "5");
    }

    #[test]
    fn define_forbids_rebinding_a_keyword() {
        let (env, mut interner, mut interp) = env_and_interp();
        let define = Cell::symbol(interner.intern("define"));
        let if_kw = interner.lookup("if").unwrap();
        let form = Cell::list(vec![define, Cell::symbol(if_kw), Cell::integer(1)]);
        let items = form.to_vec().unwrap();
        assert!(sf_define(&items, &env, &mut interp).is_err());
    }

    #[test]
    fn letrec_supports_mutual_reference_in_inits() {
        // (letrec ((a 1) (b a)) b) -- the simplest case, not true mutual
        // recursion (which needs lambda bodies), but exercises the
        // pre-bind-then-evaluate-in-new-frame order.
        let (env, mut interner, mut interp) = env_and_interp();
        let letrec = Cell::symbol(interner.intern("letrec"));
        let a = interner.intern("a");
        let b = interner.intern("b");
        let bindings = Cell::list(vec![
            Cell::list(vec![Cell::symbol(a.clone()), Cell::integer(1)]),
            Cell::list(vec![Cell::symbol(b.clone()), Cell::symbol(a)]),
        ]);
        let form = Cell::list(vec![letrec, bindings, Cell::symbol(b)]);
        let items = form.to_vec().unwrap();
        let step = sf_letrec(&items, &env, &mut interp).unwrap();
        let Step::Continue(expr, new_env) = step else {
            panic!("expected Step::Continue");
        };
        let result = interp.eval_trampoline(new_env, expr).unwrap();
        assert_eq!(result.to_string(), "1");
    }

    #[test]
    fn set_bang_on_unbound_symbol_errors() {
        let (env, mut interner, mut interp) = env_and_interp();
        let set_sym = Cell::symbol(interner.intern("set!"));
        let y = interner.intern("y");
        let form = Cell::list(vec![set_sym, Cell::symbol(y), Cell::integer(1)]);
        let items = form.to_vec().unwrap();
        assert!(sf_set(&items, &env, &mut interp).is_err());
    }

    #[test]
    fn and_short_circuits_on_first_falsy_value() {
        let (env, mut interner, mut interp) = env_and_interp();
        let and_sym = Cell::symbol(interner.intern("and"));
        let form = Cell::list(vec![and_sym, Cell::boolean(false), Cell::integer(99)]);
        let items = form.to_vec().unwrap();
        let step = sf_and(&items, &env, &mut interp).unwrap();
        match step {
            Step::Return(v) => assert_eq!(v.to_string(), "#f"),
            _ => panic!("expected short-circuit Step::Return"),
        }
    }

    #[test]
    fn delay_builds_a_ready_promise() {
        let (env, _interner, _interp) = env_and_interp();
        let items = vec![Cell::Unspecified, Cell::integer(7)];
        let step = sf_delay(&items, &env).unwrap();
        match step {
            Step::Return(Cell::Promise(_)) => {}
            _ => panic!("expected a Promise"),
        }
    }

    #[test]
    fn defmacro_installs_a_macro_procedure_globally() {
        let (env, mut interner, _interp) = env_and_interp();
        let name = interner.intern("my-macro");
        let formals = Cell::Nil;
        let form = vec![Cell::Unspecified, Cell::symbol(name.clone()), formals, Cell::integer(1)];
        sf_defmacro(&form, &env).unwrap();
        match env.lookup(&name).unwrap() {
            Cell::Procedure(p) => assert!(p.is_macro()),
            _ => panic!("expected a macro procedure"),
        }
    }
}
