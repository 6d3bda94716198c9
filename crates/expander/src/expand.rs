//! Derived syntax (`cond`, `case`, `when`, `unless`, `or`, `let*`,
//! `letrec*`, named `let`, `do`, `quasiquote`) rewritten into primitive
//! forms. Expansion is bottom-up and non-hygienic except for the fresh
//! temporaries it introduces itself (`_or0`, `_cond1`, ...): a
//! monotonically increasing counter with an underscore prefix keeps
//! those names out of the way of anything a user could type. User-level
//! `defmacro` macros are expanded lazily at call sites by the evaluator,
//! not by this pass.

use cozenage_core::{Cell, Interner, SchemeError, Symbol};

pub struct Expander<'a> {
    interner: &'a mut Interner,
    gensym_counter: u64,
}

impl<'a> Expander<'a> {
    pub fn new(interner: &'a mut Interner) -> Self {
        Expander {
            interner,
            gensym_counter: 0,
        }
    }

    fn gensym(&mut self, prefix: &str) -> Symbol {
        let name = format!("_{prefix}{}", self.gensym_counter);
        self.gensym_counter += 1;
        self.interner.intern(&name)
    }

    fn sym(&mut self, name: &str) -> Cell {
        Cell::symbol(self.interner.intern(name))
    }

    /// Expand `expr` and everything nested inside it.
    pub fn expand(&mut self, expr: &Cell) -> Result<Cell, SchemeError> {
        let Some(items) = expr.to_vec() else {
            // Atoms, improper lists, and already-evaluated values pass
            // through unchanged — only proper lists carry syntax.
            return Ok(expr.clone());
        };
        if items.is_empty() {
            return Ok(expr.clone());
        }
        let head_name = head_symbol_name_of(&items[0]);
        match head_name.as_deref() {
            Some("quote") => Ok(expr.clone()),
            Some("define") if items.len() > 2 && items[1].is_pair() => self.expand_define(&items),
            Some("lambda") if items.len() > 2 => self.expand_lambda(&items),
            Some("cond") => self.expand_cond(&items),
            Some("case") => {
                let rewritten = self.expand_case(&items)?;
                self.expand(&rewritten)
            }
            Some("do") => {
                let rewritten = self.expand_do(&items)?;
                self.expand(&rewritten)
            }
            Some("let*") => self.expand_let_star(&items),
            Some("letrec*") => self.expand_letrec_star(&items),
            Some("when") => self.expand_when(&items),
            Some("unless") => self.expand_unless(&items),
            Some("or") => self.expand_or(&items),
            Some("quasiquote") if items.len() == 2 => self.transform_qq(&items[1], 1),
            Some("unquote") => Err(SchemeError::syntax(
                "unquote: must be contained within a quasiquote expression",
            )),
            Some("unquote-splicing") => Err(SchemeError::syntax(
                "unquote-splicing: must be contained within a quasiquote expression",
            )),
            Some("let") if items.len() > 2 && matches!(items[1], Cell::Symbol(_)) => {
                let rewritten = self.expand_named_let(&items)?;
                self.expand(&rewritten)
            }
            _ => self.expand_children(&items),
        }
    }

    fn expand_children(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(self.expand(item)?);
        }
        Ok(Cell::list(out))
    }

    /// `(define (name . formals) body…)` -> `(define name (lambda formals body…))`.
    fn expand_define(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        let signature = items[1].to_vec_improper();
        let (name, formals) = signature;
        let mut lambda_form = vec![self.sym("lambda"), formals];
        lambda_form.extend_from_slice(&items[2..]);
        let lambda_expr = self.expand_lambda(&lambda_form)?;
        Ok(Cell::list(vec![self.sym("define"), name, lambda_expr]))
    }

    /// `(lambda formals body…)`: collect leading internal `define`s into
    /// a wrapping `letrec`, then implicit-`begin` the rest.
    fn expand_lambda(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        let formals = items[1].clone();
        let body = self.expand_body(items, 2)?;
        Ok(Cell::list(vec![self.sym("lambda"), formals, body]))
    }

    fn expand_body(&mut self, items: &[Cell], start: usize) -> Result<Cell, SchemeError> {
        let mut i = start;
        let mut defines = Vec::new();
        while i < items.len() {
            if is_headed(&items[i], "define") {
                defines.push(items[i].clone());
                i += 1;
            } else {
                break;
            }
        }
        let remaining = &items[i..];
        let final_body = match remaining.len() {
            0 => return Err(SchemeError::syntax("procedure body is empty")),
            1 => self.expand(&remaining[0])?,
            _ => {
                let mut begin = vec![self.sym("begin")];
                for e in remaining {
                    begin.push(self.expand(e)?);
                }
                Cell::list(begin)
            }
        };
        if defines.is_empty() {
            return Ok(final_body);
        }
        let bindings = self.defines_to_letrec_bindings(&defines)?;
        Ok(Cell::list(vec![self.sym("letrec"), bindings, final_body]))
    }

    fn defines_to_letrec_bindings(&mut self, defines: &[Cell]) -> Result<Cell, SchemeError> {
        let mut bindings = Vec::with_capacity(defines.len());
        for def in defines {
            let items = def.to_vec().ok_or_else(|| SchemeError::syntax("malformed internal define"))?;
            if items.len() < 3 {
                return Err(SchemeError::syntax("malformed internal define"));
            }
            match &items[1] {
                Cell::Symbol(_) => {
                    let value = self.expand(&items[2])?;
                    bindings.push(Cell::list(vec![items[1].clone(), value]));
                }
                target if target.is_pair() => {
                    let (name, formals) = target.to_vec_improper();
                    let mut lambda_form = vec![self.sym("lambda"), formals];
                    lambda_form.extend_from_slice(&items[2..]);
                    let lambda_expr = self.expand_lambda(&lambda_form)?;
                    bindings.push(Cell::list(vec![name, lambda_expr]));
                }
                _ => return Err(SchemeError::syntax("malformed internal define target")),
            }
        }
        Ok(Cell::list(bindings))
    }

    /// `(when test body…)` -> `(if test (begin body…) unspecified)`.
    fn expand_when(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        if items.len() < 3 {
            return Err(SchemeError::syntax("when: missing test or body"));
        }
        let test = self.expand(&items[1])?;
        let consequent = self.expand_body(items, 2)?;
        Ok(Cell::list(vec![self.sym("if"), test, consequent, Cell::Unspecified]))
    }

    /// `(unless test body…)` -> `(if test unspecified (begin body…))`.
    fn expand_unless(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        if items.len() < 3 {
            return Err(SchemeError::syntax("unless: missing test or body"));
        }
        let test = self.expand(&items[1])?;
        let alternate = self.expand_body(items, 2)?;
        Ok(Cell::list(vec![self.sym("if"), test, Cell::Unspecified, alternate]))
    }

    /// `(or)` -> `#f`; `(or e)` -> `e`; `(or e1 e2 …)` -> a fresh-temp
    /// `let`/`if` peeling one term per expansion step.
    fn expand_or(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        match items.len() {
            1 => Ok(Cell::boolean(false)),
            2 => self.expand(&items[1]),
            _ => {
                let tmp = self.gensym("or");
                let tmp_cell = Cell::symbol(tmp);
                let mut rest = vec![self.sym("or")];
                rest.extend_from_slice(&items[2..]);
                let if_expr = Cell::list(vec![self.sym("if"), tmp_cell.clone(), tmp_cell.clone(), Cell::list(rest)]);
                let binding = Cell::list(vec![tmp_cell, self.expand(&items[1])?]);
                let let_expr = Cell::list(vec![self.sym("let"), Cell::list(vec![binding]), if_expr]);
                self.expand(&let_expr)
            }
        }
    }

    /// `(let* () body…)` -> `(let () body…)`; otherwise peel one
    /// binding into a nested `let`.
    fn expand_let_star(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        if items.len() < 3 {
            return Err(SchemeError::syntax("let*: malformed expression"));
        }
        let bindings = items[1].to_vec().ok_or_else(|| SchemeError::syntax("let*: malformed bindings"))?;
        if bindings.is_empty() {
            let mut let_form = vec![self.sym("let"), Cell::Nil];
            let_form.extend_from_slice(&items[2..]);
            return self.expand_children(&let_form);
        }
        let first = bindings[0].clone();
        let rest_bindings = Cell::list(bindings[1..].to_vec());
        let mut inner = vec![self.sym("let*"), rest_bindings];
        inner.extend_from_slice(&items[2..]);
        let outer = Cell::list(vec![self.sym("let"), Cell::list(vec![first]), Cell::list(inner)]);
        self.expand(&outer)
    }

    /// `(letrec* () body…)` -> `(letrec () body…)`; otherwise peel one
    /// binding into a nested `letrec`.
    fn expand_letrec_star(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        if items.len() < 3 {
            return Err(SchemeError::syntax("letrec*: malformed expression"));
        }
        let bindings = items[1].to_vec().ok_or_else(|| SchemeError::syntax("letrec*: malformed bindings"))?;
        if bindings.is_empty() {
            let mut letrec_form = vec![self.sym("letrec"), Cell::Nil];
            letrec_form.extend_from_slice(&items[2..]);
            return self.expand_children(&letrec_form);
        }
        let first = bindings[0].clone();
        let rest_bindings = Cell::list(bindings[1..].to_vec());
        let mut inner = vec![self.sym("letrec*"), rest_bindings];
        inner.extend_from_slice(&items[2..]);
        let outer = Cell::list(vec![self.sym("letrec"), Cell::list(vec![first]), Cell::list(inner)]);
        self.expand(&outer)
    }

    /// `(cond clause…)`: right-fold, clause by clause, into nested `if`.
    fn expand_cond(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        if items.len() < 2 {
            return Err(SchemeError::syntax("cond: malformed"));
        }
        let clause = items[1].to_vec().ok_or_else(|| SchemeError::syntax("cond: malformed clause"))?;
        if clause.is_empty() {
            return Err(SchemeError::syntax("cond: empty clause"));
        }
        let rest_cond = if items.len() > 2 {
            let mut rest = vec![self.sym("cond")];
            rest.extend_from_slice(&items[2..]);
            Cell::list(rest)
        } else {
            Cell::Unspecified
        };

        if head_symbol_name_of(&clause[0]).as_deref() == Some("else") {
            return self.expand_body(&clause, 1);
        }

        if clause.len() == 3 && head_symbol_name_of(&clause[1]).as_deref() == Some("=>") {
            return self.expand_cond_arrow(&clause, rest_cond);
        }

        if clause.len() == 1 {
            let tmp = self.gensym("cond");
            let tmp_cell = Cell::symbol(tmp);
            let binding = Cell::list(vec![tmp_cell.clone(), self.expand(&clause[0])?]);
            let if_expr = Cell::list(vec![self.sym("if"), tmp_cell.clone(), tmp_cell, rest_cond]);
            let let_expr = Cell::list(vec![self.sym("let"), Cell::list(vec![binding]), if_expr]);
            return self.expand(&let_expr);
        }

        let test = self.expand(&clause[0])?;
        let consequent = self.expand_body(&clause, 1)?;
        let if_expr = Cell::list(vec![self.sym("if"), test, consequent, rest_cond]);
        self.expand(&if_expr)
    }

    fn expand_cond_arrow(&mut self, clause: &[Cell], rest_cond: Cell) -> Result<Cell, SchemeError> {
        let tmp = self.gensym("cond");
        let tmp_cell = Cell::symbol(tmp);
        let binding = Cell::list(vec![tmp_cell.clone(), self.expand(&clause[0])?]);
        let proc = self.expand(&clause[2])?;
        let call = Cell::list(vec![proc, tmp_cell.clone()]);
        let if_expr = Cell::list(vec![self.sym("if"), tmp_cell, call, rest_cond]);
        let let_expr = Cell::list(vec![self.sym("let"), Cell::list(vec![binding]), if_expr]);
        self.expand(&let_expr)
    }

    /// Named `let`: `(let name ((v e)…) body…)` -> `(letrec ((name
    /// (lambda (v…) body…))) (name e…))`.
    fn expand_named_let(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        let name = items[1].clone();
        let bindings = items[2].to_vec().ok_or_else(|| SchemeError::syntax("let: malformed named-let bindings"))?;
        let mut vars = Vec::with_capacity(bindings.len());
        let mut inits = Vec::with_capacity(bindings.len());
        for b in &bindings {
            let pair = b.to_vec().ok_or_else(|| SchemeError::syntax("let: malformed binding"))?;
            vars.push(pair[0].clone());
            inits.push(self.expand(&pair[1])?);
        }
        let mut lambda_form = vec![self.sym("lambda"), Cell::list(vars)];
        lambda_form.extend_from_slice(&items[3..]);
        let lambda_expr = self.expand_lambda(&lambda_form)?;
        let binding = Cell::list(vec![name.clone(), lambda_expr]);
        let mut call = vec![name];
        call.extend(inits);
        Ok(Cell::list(vec![self.sym("letrec"), Cell::list(vec![binding]), Cell::list(call)]))
    }

    /// `(do ((v init step)…) (test result…) body…)` -> a named `let`
    /// iterating until `test` is truthy.
    fn expand_do(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        if items.len() < 3 {
            return Err(SchemeError::syntax("do: malformed expression"));
        }
        let bindings = items[1].to_vec().ok_or_else(|| SchemeError::syntax("do: malformed bindings"))?;
        let test_clause = items[2].to_vec().ok_or_else(|| SchemeError::syntax("do: malformed test clause"))?;
        if test_clause.is_empty() {
            return Err(SchemeError::syntax("do: empty test clause"));
        }
        let loop_name = self.sym("loop");

        let mut let_bindings = Vec::with_capacity(bindings.len());
        let mut loop_steps = vec![loop_name.clone()];
        for b in &bindings {
            let spec = b.to_vec().ok_or_else(|| SchemeError::syntax("do: malformed variable clause"))?;
            if spec.len() < 2 {
                return Err(SchemeError::syntax("do: malformed variable clause"));
            }
            let init = self.expand(&spec[1])?;
            let_bindings.push(Cell::list(vec![spec[0].clone(), init]));
            if spec.len() > 2 {
                loop_steps.push(self.expand(&spec[2])?);
            } else {
                loop_steps.push(spec[0].clone());
            }
        }

        let test_result = if test_clause.len() > 1 {
            let mut begin = vec![self.sym("begin")];
            for e in &test_clause[1..] {
                begin.push(self.expand(e)?);
            }
            Cell::list(begin)
        } else {
            Cell::Unspecified
        };
        let test = self.expand(&test_clause[0])?;

        let mut body_begin = vec![self.sym("begin")];
        for e in &items[3..] {
            body_begin.push(self.expand(e)?);
        }
        body_begin.push(Cell::list(loop_steps));

        let if_expr = Cell::list(vec![self.sym("if"), test, test_result, Cell::list(body_begin)]);

        let named_let = vec![self.sym("let"), loop_name, Cell::list(let_bindings), if_expr];
        Ok(Cell::list(named_let))
    }

    /// `(case key clause…)` -> `(let ((tmp key)) (cond ((memv tmp
    /// '(datum…)) body…) … (else body…)))`, evaluating `key` once.
    fn expand_case(&mut self, items: &[Cell]) -> Result<Cell, SchemeError> {
        if items.len() < 3 {
            return Err(SchemeError::syntax("case: malformed expression"));
        }
        let key_expr = self.expand(&items[1])?;
        let tmp = self.gensym("case");
        let tmp_cell = Cell::symbol(tmp);

        let mut cond_clauses = vec![self.sym("cond")];
        for clause_cell in &items[2..] {
            let clause = clause_cell.to_vec().ok_or_else(|| SchemeError::syntax("case: malformed clause"))?;
            if clause.len() < 2 {
                continue;
            }
            let test = if head_symbol_name_of(&clause[0]).as_deref() == Some("else") {
                self.sym("else")
            } else {
                let quoted = Cell::list(vec![self.sym("quote"), clause[0].clone()]);
                Cell::list(vec![self.sym("memv"), tmp_cell.clone(), quoted])
            };
            let mut cond_clause = vec![test];
            for e in &clause[1..] {
                cond_clause.push(self.expand(e)?);
            }
            cond_clauses.push(Cell::list(cond_clause));
        }

        let binding = Cell::list(vec![tmp_cell, key_expr]);
        Ok(Cell::list(vec![self.sym("let"), Cell::list(vec![binding]), Cell::list(cond_clauses)]))
    }

    /// `quasiquote` rewriting (spec §4.3): `unquote` at depth 1 becomes
    /// its operand directly; everything else becomes a call to `append`
    /// over singleton `list`s, with `unquote-splicing` at depth 1
    /// contributing its operand to the `append` directly, and a literal
    /// vector rewriting to `(list->vector <expanded-list>)`.
    fn transform_qq(&mut self, input: &Cell, depth: u32) -> Result<Cell, SchemeError> {
        if let Cell::Vector(v) = input {
            let items = v.borrow().clone();
            let expanded_list = self.qq_list_logic(&items, depth)?;
            return Ok(Cell::list(vec![self.sym("list->vector"), expanded_list]));
        }
        let Some(items) = input.to_vec() else {
            return Ok(Cell::list(vec![self.sym("quote"), input.clone()]));
        };
        if items.is_empty() {
            return Ok(Cell::list(vec![self.sym("quote"), input.clone()]));
        }
        let head = head_symbol_name_of(&items[0]);
        if head.as_deref() == Some("unquote") && items.len() == 2 {
            if depth == 1 {
                return Ok(items[1].clone());
            }
            let inner = self.transform_qq(&items[1], depth - 1)?;
            return Ok(Cell::list(vec![
                self.sym("list"),
                Cell::list(vec![self.sym("quote"), self.sym("unquote")]),
                inner,
            ]));
        }
        if head.as_deref() == Some("quasiquote") && items.len() == 2 {
            let inner = self.transform_qq(&items[1], depth + 1)?;
            return Ok(Cell::list(vec![
                self.sym("list"),
                Cell::list(vec![self.sym("quote"), self.sym("quasiquote")]),
                inner,
            ]));
        }
        self.qq_list_logic(&items, depth)
    }

    fn qq_list_logic(&mut self, items: &[Cell], depth: u32) -> Result<Cell, SchemeError> {
        let mut out = vec![self.sym("append")];
        for item in items {
            if depth == 1 && head_symbol_name(item).as_deref() == Some("unquote-splicing") {
                if let Some(parts) = item.to_vec() {
                    if parts.len() == 2 {
                        out.push(parts[1].clone());
                        continue;
                    }
                }
            }
            let transformed = self.transform_qq(item, depth)?;
            out.push(Cell::list(vec![self.sym("list"), transformed]));
        }
        Ok(Cell::list(out))
    }
}

fn head_symbol_name(cell: &Cell) -> Option<String> {
    cell.to_vec().and_then(|items| items.first().and_then(head_symbol_name_of))
}

fn head_symbol_name_of(cell: &Cell) -> Option<String> {
    if let Cell::Symbol(s) = cell {
        Some(s.name.clone())
    } else {
        None
    }
}

fn is_headed(cell: &Cell, name: &str) -> bool {
    cell.to_vec()
        .and_then(|items| items.into_iter().next())
        .and_then(|head| head_symbol_name_of(&head))
        .as_deref()
        == Some(name)
}

/// Helper for `(define (name . formals) body…)`: split a define target
/// list into its name symbol and its formals list/dotted-tail/symbol.
trait ToVecImproper {
    fn to_vec_improper(&self) -> (Cell, Cell);
}

impl ToVecImproper for Cell {
    fn to_vec_improper(&self) -> (Cell, Cell) {
        if let Cell::Pair(p) = self {
            let pair = p.borrow();
            (pair.car.clone(), pair.cdr.clone())
        } else {
            (self.clone(), Cell::Nil)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The expander crate intentionally has no dependency on the reader
    // crate (it operates purely on `Cell` trees); tests build inputs by
    // hand instead of parsing source text.
    fn list(items: Vec<Cell>) -> Cell {
        Cell::list(items)
    }

    #[test]
    fn when_expands_to_if() {
        let mut interner = Interner::new();
        let mut exp = Expander::new(&mut interner);
        let when_sym = exp.sym("when");
        let test = exp.sym("test");
        let body = exp.sym("body");
        let form = list(vec![when_sym, test, body]);
        let result = exp.expand(&form).unwrap();
        let items = result.to_vec().unwrap();
        assert_eq!(head_symbol_name_of(&items[0]).unwrap(), "if");
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn or_with_two_terms_builds_let_if() {
        let mut interner = Interner::new();
        let mut exp = Expander::new(&mut interner);
        let or_sym = exp.sym("or");
        let a = exp.sym("a");
        let b = exp.sym("b");
        let form = list(vec![or_sym, a, b]);
        let result = exp.expand(&form).unwrap();
        // (or a b) -> (let ((tmp a)) (if tmp tmp b))
        let items = result.to_vec().unwrap();
        assert_eq!(head_symbol_name_of(&items[0]).unwrap(), "let");
    }

    #[test]
    fn empty_or_is_false() {
        let mut interner = Interner::new();
        let mut exp = Expander::new(&mut interner);
        let or_sym = exp.sym("or");
        let form = list(vec![or_sym]);
        let result = exp.expand(&form).unwrap();
        assert_eq!(result.to_string(), "#f");
    }

    #[test]
    fn named_let_becomes_letrec() {
        let mut interner = Interner::new();
        let mut exp = Expander::new(&mut interner);
        let loop_sym = exp.sym("loop");
        let let_sym = exp.sym("let");
        let x = exp.sym("x");
        let init = Cell::integer(0);
        let binding = list(vec![x.clone(), init]);
        let body = x.clone();
        let form = list(vec![let_sym, loop_sym, list(vec![binding]), body]);
        let result = exp.expand(&form).unwrap();
        let items = result.to_vec().unwrap();
        assert_eq!(head_symbol_name_of(&items[0]).unwrap(), "letrec");
    }

    #[test]
    fn cond_else_only_expands_to_body() {
        let mut interner = Interner::new();
        let mut exp = Expander::new(&mut interner);
        let cond_sym = exp.sym("cond");
        let else_clause = list(vec![exp.sym("else"), Cell::integer(1)]);
        let form = list(vec![cond_sym, else_clause]);
        let result = exp.expand(&form).unwrap();
        assert_eq!(result.to_string(), "1");
    }

    #[test]
    fn quasiquote_unquote_at_depth_one_returns_operand() {
        let mut interner = Interner::new();
        let mut exp = Expander::new(&mut interner);
        let x = exp.sym("x");
        let unquote_form = list(vec![exp.sym("unquote"), x.clone()]);
        let result = exp.transform_qq(&unquote_form, 1).unwrap();
        assert_eq!(result.to_string(), "x");
    }

    #[test]
    fn define_with_compound_target_wraps_lambda() {
        let mut interner = Interner::new();
        let mut exp = Expander::new(&mut interner);
        let define_sym = exp.sym("define");
        let name = exp.sym("f");
        let arg = exp.sym("x");
        let target = Cell::cons(name.clone(), Cell::cons(arg.clone(), Cell::Nil));
        let body = arg.clone();
        let form = list(vec![define_sym, target, body]);
        let result = exp.expand(&form).unwrap();
        let items = result.to_vec().unwrap();
        assert_eq!(head_symbol_name_of(&items[0]).unwrap(), "define");
        assert_eq!(items[1].to_string(), "f");
        let lambda_items = items[2].to_vec().unwrap();
        assert_eq!(head_symbol_name_of(&lambda_items[0]).unwrap(), "lambda");
    }

    #[test]
    fn lambda_body_with_internal_defines_becomes_letrec() {
        let mut interner = Interner::new();
        let mut exp = Expander::new(&mut interner);
        let lambda_sym = exp.sym("lambda");
        let formals = Cell::Nil;
        let inner_define = list(vec![exp.sym("define"), exp.sym("y"), Cell::integer(1)]);
        let body = exp.sym("y");
        let form = list(vec![lambda_sym, formals, inner_define, body]);
        let result = exp.expand(&form).unwrap();
        let items = result.to_vec().unwrap();
        let inner_body = items[2].to_vec().unwrap();
        assert_eq!(head_symbol_name_of(&inner_body[0]).unwrap(), "letrec");
    }
}
