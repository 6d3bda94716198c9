//! Type predicates (spec §4.5), grounded on
//! `original_source/src/predicates.c`/`predicates.h`.

use cozenage_core::{Cell, Env, Interner, Number, check_arity};
use std::rc::Rc;

use crate::registry::define_builtin;

/// Register a single-argument predicate under `name`, computed by `test`.
fn define_predicate(env: &Env, interner: &mut Interner, name: &'static str, test: impl Fn(&Cell) -> bool + 'static) {
    define_builtin(env, interner, name, Rc::new(move |_a, _e, args| {
        check_arity(name, args.len(), 1, Some(1))?;
        Ok(Cell::boolean(test(&args[0])))
    }));
}

pub fn install(env: &Env, interner: &mut Interner) {
    define_predicate(env, interner, "pair?", |c| matches!(c, Cell::Pair(_)));
    define_predicate(env, interner, "null?", Cell::is_nil);
    define_predicate(env, interner, "list?", is_proper_list);
    define_predicate(env, interner, "vector?", |c| matches!(c, Cell::Vector(_)));
    define_predicate(env, interner, "bytevector?", |c| matches!(c, Cell::Bytevector(_)));
    define_predicate(env, interner, "string?", |c| matches!(c, Cell::String(_)));
    define_predicate(env, interner, "symbol?", |c| matches!(c, Cell::Symbol(_)));
    define_predicate(env, interner, "char?", |c| matches!(c, Cell::Char(_)));
    define_predicate(env, interner, "boolean?", |c| matches!(c, Cell::Boolean(_)));
    define_predicate(env, interner, "procedure?", |c| matches!(c, Cell::Procedure(p) if !p.is_macro()));
    define_predicate(env, interner, "port?", |c| matches!(c, Cell::Port(_)));
    define_predicate(env, interner, "eof-object?", |c| matches!(c, Cell::Eof));
    define_predicate(env, interner, "promise?", |c| matches!(c, Cell::Promise(_)));
    define_predicate(env, interner, "stream?", |c| matches!(c, Cell::Stream(_)));
    define_predicate(env, interner, "hash-table?", |c| matches!(c, Cell::HashTable(_)));
    define_predicate(env, interner, "set?", |c| matches!(c, Cell::Set(_)));
    define_predicate(env, interner, "not", |c| !c.is_truthy());

    define_predicate(env, interner, "number?", |c| matches!(c, Cell::Number(_)));
    define_predicate(env, interner, "exact?", |c| matches!(c, Cell::Number(n) if n.is_exact()));
    define_predicate(env, interner, "inexact?", |c| matches!(c, Cell::Number(n) if n.is_inexact()));
    define_predicate(env, interner, "real?", |c| matches!(c, Cell::Number(n) if n.is_real()));
    define_predicate(env, interner, "complex?", |c| matches!(c, Cell::Number(_)));
    define_predicate(env, interner, "rational?", |c| matches!(c, Cell::Number(n) if n.is_real() && n.to_f64().is_finite()));
    define_predicate(env, interner, "integer?", is_integer_valued);
    define_predicate(env, interner, "nan?", |c| matches!(c, Cell::Number(n) if n.to_f64().is_nan()));
    define_predicate(env, interner, "infinite?", |c| matches!(c, Cell::Number(n) if n.to_f64().is_infinite()));
    define_predicate(env, interner, "finite?", |c| matches!(c, Cell::Number(n) if n.to_f64().is_finite()));
    // zero?/positive?/negative?/odd?/even? live in `arithmetic`, next
    // to the rest of the numeric-tower primitives they share helpers
    // with.
}

fn is_integer_valued(c: &Cell) -> bool {
    match c {
        Cell::Number(Number::Integer(_) | Number::BigInt(_)) => true,
        Cell::Number(n) if n.is_real() => n.to_f64().fract() == 0.0,
        _ => false,
    }
}

/// A proper list is `()` or a chain of pairs ending in `()`, with cycle
/// detection via the tortoise-and-hare technique (spec §4.5's `length`
/// shares this same traversal shape).
fn is_proper_list(c: &Cell) -> bool {
    let mut slow = c.clone();
    let mut fast = c.clone();
    loop {
        if fast.is_nil() {
            return true;
        }
        let Cell::Pair(fast_pair) = &fast else { return false };
        let next = fast_pair.borrow().cdr.clone();
        if next.is_nil() {
            return true;
        }
        let Cell::Pair(next_pair) = &next else { return false };
        fast = next_pair.borrow().cdr.clone();
        let Cell::Pair(slow_pair) = &slow else { return false };
        let slow_next = slow_pair.borrow().cdr.clone();
        slow = slow_next;
        if let (Cell::Pair(a), Cell::Pair(b)) = (&slow, &fast) {
            if Rc::ptr_eq(a, b) {
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_predicate_rejects_improper_and_cyclic_lists() {
        let proper = Cell::list(vec![Cell::integer(1), Cell::integer(2)]);
        assert!(is_proper_list(&proper));
        let improper = Cell::list_with_tail(vec![Cell::integer(1)], Cell::integer(2));
        assert!(!is_proper_list(&improper));

        let cyclic = Cell::cons(Cell::integer(1), Cell::Nil);
        if let Cell::Pair(p) = &cyclic {
            p.borrow_mut().set_cdr(cyclic.clone());
        }
        assert!(!is_proper_list(&cyclic));
    }

    #[test]
    fn integer_predicate_accepts_whole_valued_reals() {
        assert!(is_integer_valued(&Cell::Number(Number::Real(3.0))));
        assert!(!is_integer_valued(&Cell::Number(Number::Real(3.5))));
    }
}
