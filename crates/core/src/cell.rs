//! `Cell`: the universal tagged-union value (spec §3).
//!
//! Mutable payloads (pair car/cdr, vector elements, string bytes, port
//! state, promise slots) live behind `Rc<RefCell<_>>`. This stands in
//! for the tracing garbage collector spec §3 describes: `Rc` reclaims
//! acyclic structure automatically and a `Pair`/`Vector` cycle simply
//! leaks instead of being collected. That tradeoff is recorded as a
//! resolved open question in DESIGN.md rather than left implicit.

use crate::env::Env;
use crate::error::SchemeError;
use crate::hashtable::HashTable;
use crate::interner::{Symbol, symbol_eq};
use crate::number::Number;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The callback surface a builtin needs to re-enter application logic
/// (for `apply`, `map`, `for-each`, `call-with-values`, ...) without
/// `cozenage-core` depending on `cozenage-evaluator`. The evaluator
/// implements this trait once, for its trampoline loop.
pub trait Applyer {
    /// Apply `proc` to already-evaluated `args`. `env` is the calling
    /// environment, threaded through so a builtin that itself applies a
    /// procedure (`map`, `for-each`, `apply`) can forward a meaningful
    /// environment to whatever it calls next.
    fn apply(&mut self, proc: &Cell, args: Vec<Cell>, env: &Env) -> Result<Cell, SchemeError>;
    /// Evaluate `expr` in `env` — used by the `eval` primitive.
    fn eval(&mut self, expr: &Cell, env: &Env) -> Result<Cell, SchemeError>;
}

/// A builtin's Rust implementation. Takes the `Applyer` callback (for
/// higher-order primitives), the environment it was called from, and
/// the already-evaluated argument vector.
pub type BuiltinFn = Rc<dyn Fn(&mut dyn Applyer, &Env, &[Cell]) -> Result<Cell, SchemeError>>;

#[derive(Clone)]
pub enum Cell {
    Number(Number),
    Boolean(bool),
    Char(char),
    String(Rc<RefCell<SchemeString>>),
    Symbol(Symbol),
    Pair(Rc<RefCell<Pair>>),
    Nil,
    Vector(Rc<RefCell<Vec<Cell>>>),
    Bytevector(Rc<RefCell<Bytevector>>),
    Procedure(Rc<Procedure>),
    Promise(Rc<RefCell<Promise>>),
    Stream(Rc<Stream>),
    Port(Rc<RefCell<Port>>),
    Error(Box<SchemeError>),
    /// A first-class hash table (spec §4.6), keyed by `(equal? key key)`
    /// via the key's `Display` rendering — the same string-keying the
    /// symbol interner and global environment already use.
    HashTable(Rc<RefCell<HashTable<Cell>>>),
    /// A set, represented as a hash table mapping each member's display
    /// key to the member itself (so `set->list` can recover the
    /// original values, not just their keys).
    Set(Rc<RefCell<HashTable<Cell>>>),
    /// The parser's mutable argument vector, used for unevaluated
    /// compound forms prior to evaluation. `(quote x)` on an `SExpr`
    /// converts it to a proper list before returning (spec §4.4).
    SExpr(Rc<RefCell<Vec<Cell>>>),
    /// Returned by a builtin that wants the evaluator to re-enter its
    /// apply logic instead of recursing natively (spec §4.5) — e.g.
    /// `apply` handing off to the procedure it was given.
    Trampoline(Rc<(Cell, Vec<Cell>)>),
    Eof,
    Unspecified,
    /// A first-class environment, as returned by `interaction-environment`
    /// and accepted by `eval`'s optional second argument. Not one of
    /// spec §3's original ~26 variants — R7RS's `eval`/environment
    /// reification needs *some* Cell shape to carry an `Env` as a
    /// value, and `Env` is already cheap to clone (two `Rc`s).
    Environment(Env),
}

#[derive(Clone)]
pub struct SchemeString {
    bytes: Vec<u8>,
    ascii: bool,
}

impl SchemeString {
    pub fn new(s: impl Into<String>) -> Self {
        let s = s.into();
        let ascii = s.is_ascii();
        SchemeString {
            bytes: s.into_bytes(),
            ascii,
        }
    }

    pub fn as_str(&self) -> &str {
        // Safety/invariant: bytes are only ever produced from valid
        // UTF-8 (`String`/`char` sources), never written to directly.
        std::str::from_utf8(&self.bytes).expect("SchemeString bytes are always valid UTF-8")
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn codepoint_count(&self) -> usize {
        if self.ascii {
            self.bytes.len()
        } else {
            self.as_str().chars().count()
        }
    }

    pub fn is_ascii(&self) -> bool {
        self.ascii
    }

    pub fn chars(&self) -> Vec<char> {
        self.as_str().chars().collect()
    }

    pub fn set_char(&mut self, index: usize, ch: char) -> Result<(), SchemeError> {
        let mut chars = self.chars();
        if index >= chars.len() {
            return Err(SchemeError::index("string-set!", "index out of range"));
        }
        chars[index] = ch;
        let s: String = chars.into_iter().collect();
        self.ascii = s.is_ascii();
        self.bytes = s.into_bytes();
        Ok(())
    }

    pub fn append(&mut self, other: &str) {
        self.ascii = self.ascii && other.is_ascii();
        self.bytes.extend_from_slice(other.as_bytes());
    }
}

/// A cons cell. `length` caches the proper-list length computed the
/// last time it was asked for; `-1` means "unknown or improper" and
/// must be recomputed (and recached) on demand. Any mutation of `cdr`
/// invalidates the cache (spec §3's invariant).
pub struct Pair {
    pub car: Cell,
    pub cdr: Cell,
    cached_length: i64,
}

impl Pair {
    pub fn new(car: Cell, cdr: Cell) -> Self {
        Pair {
            car,
            cdr,
            cached_length: -1,
        }
    }

    pub fn set_car(&mut self, value: Cell) {
        self.car = value;
    }

    /// Mutating `cdr` invalidates the cached length — a cycle or a
    /// changed tail both make the previous length meaningless.
    pub fn set_cdr(&mut self, value: Cell) {
        self.cdr = value;
        self.cached_length = -1;
    }

    pub fn cached_length(&self) -> Option<usize> {
        if self.cached_length < 0 {
            None
        } else {
            Some(self.cached_length as usize)
        }
    }

    pub fn cache_length(&mut self, length: usize) {
        self.cached_length = length as i64;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BytevectorKind {
    U8,
    S8,
    U16,
    S16,
    U32,
    S32,
    U64,
    S64,
    F32,
    F64,
}

pub struct Bytevector {
    pub kind: BytevectorKind,
    pub data: Vec<i64>,
}

impl Bytevector {
    pub fn new(kind: BytevectorKind, data: Vec<i64>) -> Self {
        Bytevector { kind, data }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
    Async,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortMedium {
    File,
    String,
    Bytevector,
}

pub enum PortHandle {
    File(std::fs::File),
    InputString { data: Vec<u8>, pos: usize },
    OutputString(Vec<u8>),
}

pub struct Port {
    pub path: Option<String>,
    pub handle: PortHandle,
    pub direction: PortDirection,
    pub medium: PortMedium,
    pub open: bool,
}

pub enum Formals {
    Fixed(Vec<Symbol>),
    Variadic(Symbol),
    Dotted(Vec<Symbol>, Symbol),
}

pub enum Procedure {
    Builtin {
        name: String,
        func: BuiltinFn,
    },
    Lambda {
        name: RefCell<Option<String>>,
        formals: Formals,
        body: Vec<Cell>,
        env: Env,
    },
    /// A non-hygienic `defmacro` transformer. Bound in the global table
    /// exactly like a lambda, but the evaluator recognizes it at an
    /// application's head position and substitutes the unevaluated
    /// argument sub-expressions for `formals` before evaluating `body`
    /// to produce the expression that replaces the macro call.
    Macro {
        name: String,
        formals: Formals,
        body: Vec<Cell>,
        env: Env,
    },
}

impl Procedure {
    pub fn name(&self) -> Option<String> {
        match self {
            Procedure::Builtin { name, .. } => Some(name.clone()),
            Procedure::Lambda { name, .. } => name.borrow().clone(),
            Procedure::Macro { name, .. } => Some(name.clone()),
        }
    }

    pub fn is_macro(&self) -> bool {
        matches!(self, Procedure::Macro { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseStatus {
    Ready,
    Lazy,
    Running,
    Done,
}

pub struct Promise {
    pub status: PromiseStatus,
    pub expr: Cell,
    pub env: Option<Env>,
}

impl Promise {
    pub fn new_ready(expr: Cell, env: Env) -> Self {
        Promise {
            status: PromiseStatus::Ready,
            expr,
            env: Some(env),
        }
    }

    pub fn new_lazy(expr: Cell, env: Env) -> Self {
        Promise {
            status: PromiseStatus::Lazy,
            expr,
            env: Some(env),
        }
    }

    pub fn new_done(value: Cell) -> Self {
        Promise {
            status: PromiseStatus::Done,
            expr: value,
            env: None,
        }
    }
}

pub struct Stream {
    pub head: Cell,
    pub tail: Cell, // always a Cell::Promise
}

impl Cell {
    pub fn symbol(sym: Symbol) -> Cell {
        Cell::Symbol(sym)
    }

    pub fn string(s: impl Into<String>) -> Cell {
        Cell::String(Rc::new(RefCell::new(SchemeString::new(s))))
    }

    pub fn cons(car: Cell, cdr: Cell) -> Cell {
        Cell::Pair(Rc::new(RefCell::new(Pair::new(car, cdr))))
    }

    pub fn integer(n: i64) -> Cell {
        Cell::Number(Number::Integer(n))
    }

    pub fn boolean(b: bool) -> Cell {
        Cell::Boolean(b)
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Cell::Boolean(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Cell::Nil)
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Cell::Pair(_))
    }

    /// Build a proper list from a Rust `Vec`, ending in `Nil`.
    pub fn list(items: Vec<Cell>) -> Cell {
        items
            .into_iter()
            .rev()
            .fold(Cell::Nil, |acc, item| Cell::cons(item, acc))
    }

    /// Build a proper list from `items` with `tail` as the final `cdr`
    /// instead of `Nil` (used for dotted-formals binding and `apply`'s
    /// last-argument-is-a-list convention).
    pub fn list_with_tail(items: Vec<Cell>, tail: Cell) -> Cell {
        items
            .into_iter()
            .rev()
            .fold(tail, |acc, item| Cell::cons(item, acc))
    }

    /// Collect a proper list into a `Vec`. Returns `None` if the value
    /// is not `Nil` or a chain of pairs ending in `Nil` (an improper or
    /// cyclic list).
    pub fn to_vec(&self) -> Option<Vec<Cell>> {
        let mut out = Vec::new();
        let mut cur = self.clone();
        loop {
            match cur {
                Cell::Nil => return Some(out),
                Cell::Pair(p) => {
                    let pair = p.borrow();
                    out.push(pair.car.clone());
                    let next = pair.cdr.clone();
                    drop(pair);
                    cur = next;
                }
                _ => return None,
            }
        }
    }

    /// Reference equality (`eq?`). Singletons (`Nil`, `Boolean`, `Eof`,
    /// `Unspecified`) are reference-equal by value since they have no
    /// mutable identity; symbols compare by `Rc` pointer; everything
    /// else with heap identity compares by `Rc` pointer.
    pub fn eq(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Nil, Cell::Nil) | (Cell::Eof, Cell::Eof) | (Cell::Unspecified, Cell::Unspecified) => true,
            (Cell::Boolean(a), Cell::Boolean(b)) => a == b,
            (Cell::Char(a), Cell::Char(b)) => a == b,
            (Cell::Symbol(a), Cell::Symbol(b)) => symbol_eq(a, b),
            (Cell::Number(Number::Integer(a)), Cell::Number(Number::Integer(b))) => a == b,
            (Cell::String(a), Cell::String(b)) => Rc::ptr_eq(a, b),
            (Cell::Pair(a), Cell::Pair(b)) => Rc::ptr_eq(a, b),
            (Cell::Vector(a), Cell::Vector(b)) => Rc::ptr_eq(a, b),
            (Cell::Bytevector(a), Cell::Bytevector(b)) => Rc::ptr_eq(a, b),
            (Cell::Procedure(a), Cell::Procedure(b)) => Rc::ptr_eq(a, b),
            (Cell::Promise(a), Cell::Promise(b)) => Rc::ptr_eq(a, b),
            (Cell::Stream(a), Cell::Stream(b)) => Rc::ptr_eq(a, b),
            (Cell::Port(a), Cell::Port(b)) => Rc::ptr_eq(a, b),
            (Cell::HashTable(a), Cell::HashTable(b)) => Rc::ptr_eq(a, b),
            (Cell::Set(a), Cell::Set(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `eqv?`: like `eq?`, but numbers and characters compare by value
    /// within the same exactness (`(eqv? 2 2.0)` is `#f`).
    pub fn eqv(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a.eqv(b),
            _ => self.eq(other),
        }
    }

    /// `equal?`: structural equality, recursing into pairs/vectors/
    /// strings/bytevectors.
    pub fn equal(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Pair(a), Cell::Pair(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.car.equal(&b.car) && a.cdr.equal(&b.cdr)
            }
            (Cell::String(a), Cell::String(b)) => a.borrow().as_str() == b.borrow().as_str(),
            (Cell::Vector(a), Cell::Vector(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equal(y))
            }
            (Cell::Bytevector(a), Cell::Bytevector(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.kind == b.kind && a.data == b.data
            }
            _ => self.eqv(other),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Number(n) => match n {
                Number::Integer(_) | Number::BigInt(_) => "integer",
                Number::Rational(_) | Number::BigRat(_) => "rational",
                Number::Real(_) | Number::BigFloat(_) => "real",
                Number::Complex(_) => "complex",
            },
            Cell::Boolean(_) => "boolean",
            Cell::Char(_) => "char",
            Cell::String(_) => "string",
            Cell::Symbol(_) => "symbol",
            Cell::Pair(_) => "pair",
            Cell::Nil => "null",
            Cell::Vector(_) => "vector",
            Cell::Bytevector(_) => "bytevector",
            Cell::Procedure(_) => "procedure",
            Cell::Promise(_) => "promise",
            Cell::Stream(_) => "stream",
            Cell::Port(_) => "port",
            Cell::Error(_) => "error",
            Cell::HashTable(_) => "hash-table",
            Cell::Set(_) => "set",
            Cell::SExpr(_) => "s-expression",
            Cell::Trampoline(_) => "trampoline",
            Cell::Eof => "eof",
            Cell::Unspecified => "unspecified",
            Cell::Environment(_) => "environment",
        }
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Boolean(true) => write!(f, "#t"),
            Cell::Boolean(false) => write!(f, "#f"),
            Cell::Char(c) => write!(f, "{c}"),
            Cell::String(s) => write!(f, "{}", s.borrow().as_str()),
            Cell::Symbol(s) => write!(f, "{}", s.name),
            Cell::Nil => write!(f, "()"),
            Cell::Pair(_) => write_list(self, f),
            Cell::Vector(v) => {
                write!(f, "#(")?;
                for (i, item) in v.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Cell::Bytevector(bv) => {
                write!(f, "#u8(")?;
                let bv = bv.borrow();
                for (i, item) in bv.data.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Cell::Procedure(p) => match p.name() {
                Some(name) => write!(f, "#<procedure {name}>"),
                None => write!(f, "#<procedure>"),
            },
            Cell::Promise(_) => write!(f, "#<promise>"),
            Cell::Stream(_) => write!(f, "#<stream>"),
            Cell::Port(_) => write!(f, "#<port>"),
            Cell::Error(e) => write!(f, "#<error: {e}>"),
            Cell::HashTable(t) => write!(f, "#<hash-table {} entries>", t.borrow().len()),
            Cell::Set(s) => write!(f, "#<set {} entries>", s.borrow().len()),
            Cell::SExpr(items) => {
                write!(f, "(")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Cell::Trampoline(_) => write!(f, "#<trampoline>"),
            Cell::Eof => write!(f, "#<eof>"),
            Cell::Unspecified => write!(f, ""),
            Cell::Environment(_) => write!(f, "#<environment>"),
        }
    }
}

fn write_list(cell: &Cell, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "(")?;
    let mut first = true;
    let mut cell = cell.clone();
    loop {
        match cell {
            Cell::Pair(p) => {
                if !first {
                    write!(f, " ")?;
                }
                first = false;
                let pair = p.borrow();
                write!(f, "{}", pair.car)?;
                let next = pair.cdr.clone();
                drop(pair);
                cell = next;
            }
            Cell::Nil => break,
            other => {
                write!(f, " . {other}")?;
                break;
            }
        }
    }
    write!(f, ")")
}
