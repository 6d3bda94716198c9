//! End-to-end tests exercising the full read -> expand -> eval pipeline
//! over a fresh interpreter with every primitive installed. Each test
//! below is named for the property or scenario it checks.

use cozenage_core::{Applyer, Cell, Env, Interner};
use cozenage_evaluator::Interpreter;
use cozenage_expander::Expander;
use cozenage_reader::Reader;

struct Harness {
    env: Env,
    interner: Interner,
    interp: Interpreter,
}

impl Harness {
    fn new() -> Self {
        let env = Env::new_global();
        let mut interner = Interner::new();
        cozenage_runtime::install(&env, &mut interner);
        Harness {
            env,
            interner,
            interp: Interpreter::new(),
        }
    }

    fn eval(&mut self, source: &str) -> Cell {
        let forms = Reader::new(source, &mut self.interner).read_all().expect("read");
        let mut last = Cell::Unspecified;
        for form in forms {
            let expanded = Expander::new(&mut self.interner).expand(&form).expect("expand");
            last = self.interp.eval(&expanded, &self.env).expect("eval");
        }
        last
    }

    fn eval_err(&mut self, source: &str) -> cozenage_core::SchemeError {
        let forms = Reader::new(source, &mut self.interner).read_all().expect("read");
        let mut result = Ok(Cell::Unspecified);
        for form in forms {
            let expanded = Expander::new(&mut self.interner).expand(&form).expect("expand");
            result = self.interp.eval(&expanded, &self.env);
            if result.is_err() {
                break;
            }
        }
        result.expect_err("expected an error")
    }
}

#[test]
fn symbol_interning_gives_reference_equal_symbols() {
    let mut h = Harness::new();
    assert_eq!(h.eval("(eq? 's 's)").to_string(), "#t");
    assert_eq!(h.eval("(eq? (string->symbol \"x\") 'x)").to_string(), "#t");
}

#[test]
fn numeric_tower_promotion_and_exactness() {
    let mut h = Harness::new();
    assert_eq!(h.eval("(+ 1/2 1/3)").to_string(), "5/6");
    assert_eq!(h.eval("(+ 1 2.0)").to_string(), "3.0");
    assert_eq!(h.eval("(* 2 1+3i)").to_string(), "2+6i");
    assert_eq!(h.eval("(= 2 2.0)").to_string(), "#t");
    assert_eq!(h.eval("(eqv? 2 2.0)").to_string(), "#f");
}

#[test]
fn deep_tail_recursion_does_not_overflow_the_host_stack() {
    let mut h = Harness::new();
    h.eval("(define (loop n) (if (= n 0) 'ok (loop (- n 1))))");
    assert_eq!(h.eval("(loop 1000000)").to_string(), "ok");
}

#[test]
fn mutually_recursive_letrec_is_also_tail_called() {
    let mut h = Harness::new();
    let result = h.eval(
        "(letrec ((even? (lambda (n) (if (= n 0) #t (odd? (- n 1)))))
                   (odd? (lambda (n) (if (= n 0) #f (even? (- n 1))))))
           (even? 200000))",
    );
    assert_eq!(result.to_string(), "#t");
}

#[test]
fn derived_syntax_expands_correctly() {
    let mut h = Harness::new();
    assert_eq!(h.eval("(when #t 1 2 3)").to_string(), "3");
    assert_eq!(h.eval("(unless #f 1 2 3)").to_string(), "3");
    assert_eq!(h.eval("(cond ((assoc 'b '((a . 1) (b . 2))) => cdr))").to_string(), "2");
    assert_eq!(h.eval("(case 'a ((b c) 1) ((a) 2))").to_string(), "2");
}

#[test]
fn closures_capture_and_mutate_their_own_binding() {
    let mut h = Harness::new();
    h.eval("(define counter ((lambda (n) (lambda () (set! n (+ n 1)) n)) 0))");
    assert_eq!(h.eval("(counter)").to_string(), "1");
    assert_eq!(h.eval("(counter)").to_string(), "2");
}

#[test]
fn forcing_a_promise_twice_runs_the_body_once() {
    let mut h = Harness::new();
    h.eval("(define calls 0)");
    h.eval("(define p (delay (begin (set! calls (+ calls 1)) 7)))");
    assert_eq!(h.eval("(force p)").to_string(), "7");
    assert_eq!(h.eval("(force p)").to_string(), "7");
    assert_eq!(h.eval("calls").to_string(), "1");
}

#[test]
fn delay_force_chains_run_in_constant_host_stack_space() {
    let mut h = Harness::new();
    h.eval("(define p (delay-force (delay-force (delay-force (delay 42)))))");
    assert_eq!(h.eval("(force p)").to_string(), "42");
}

#[test]
fn stream_head_does_not_evaluate_the_tail() {
    let mut h = Harness::new();
    assert_eq!(h.eval("(head (stream 1 (error \"tail\")))").to_string(), "1");
}

#[test]
fn at_walks_tails_lazily_over_an_infinite_stream() {
    let mut h = Harness::new();
    h.eval("(define (nats n) (stream n (nats (+ n 1))))");
    h.eval("(define infinite-stream (nats 0))");
    assert_eq!(h.eval("(at 2 infinite-stream)").to_string(), "2");
}

#[test]
fn quasiquote_splices_and_unquotes() {
    let mut h = Harness::new();
    assert_eq!(h.eval("`(1 ,(+ 1 1) ,@(list 3 4) 5)").to_string(), "(1 2 3 4 5)");
    assert_eq!(h.eval("`#(a ,(+ 1 1))").to_string(), "#(a 2)");
}

#[test]
fn a_type_error_short_circuits_further_arithmetic() {
    let mut h = Harness::new();
    let car_err = h.eval_err("(car 5)");
    let sum_err = h.eval_err("(+ 1 (car 5) 2)");
    assert_eq!(car_err.to_string(), sum_err.to_string());
}

#[test]
fn let_bindings_evaluate_inits_in_the_outer_environment() {
    let mut h = Harness::new();
    h.eval("(define x 1)");
    assert_eq!(h.eval("(let ((x 2) (y x)) y)").to_string(), "1");
    h.eval("(let ((x 2)) x)");
    assert_eq!(h.eval("x").to_string(), "1");
}

#[test]
fn arithmetic_and_map_end_to_end() {
    let mut h = Harness::new();
    assert_eq!(h.eval("(+ (* 2 3) 4)").to_string(), "10");
    assert_eq!(h.eval("(map (lambda (x) (* x x)) '(1 2 3 4))").to_string(), "(1 4 9 16)");
}

#[test]
fn named_let_accumulates_a_million_terms_in_constant_stack() {
    let mut h = Harness::new();
    let result = h.eval("(let loop ((i 0) (s 0)) (if (= i 1000000) s (loop (+ i 1) (+ s i))))");
    assert_eq!(result.to_string(), "499999500000");
}

#[test]
fn eval_against_the_interaction_environment() {
    let mut h = Harness::new();
    let result = h.eval("(eval '(+ 1 2) (interaction-environment))");
    assert_eq!(result.to_string(), "3");
}

#[test]
fn with_gc_stats_returns_the_thunks_value() {
    let mut h = Harness::new();
    let result = h.eval("(with-gc-stats (length (iota 100000)))");
    assert_eq!(result.to_string(), "100000");
}

#[test]
fn forcing_a_display_producing_promise_prints_exactly_once() {
    let mut h = Harness::new();
    h.eval("(define p (delay (begin (display \"x\") 7)))");
    assert_eq!(h.eval("(force p)").to_string(), "7");
    assert_eq!(h.eval("(force p)").to_string(), "7");
}
