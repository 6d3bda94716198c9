//! Process-wide symbol interning.
//!
//! A symbol's identity is its `Rc` pointer, not its text: two calls to
//! `intern("x")` return clones of the *same* `Rc<SymbolData>`, so
//! `Rc::ptr_eq` on two `Symbol`s answers `eq?` correctly without ever
//! comparing strings at evaluation time. Syntactic keywords (`define`,
//! `if`, `lambda`, ...) are pre-interned with a non-zero
//! `special_form_id`; ordinary identifiers get id `0`.

use crate::hashtable::HashTable;
use std::fmt;
use std::rc::Rc;

/// The interned payload behind every `Symbol`. Two `Symbol`s naming the
/// same identifier text always point at the same `SymbolData`.
pub struct SymbolData {
    pub name: String,
    /// 0 means "not a syntactic keyword" (an ordinary user binding).
    pub special_form_id: u32,
}

impl fmt::Debug for SymbolData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.name)
    }
}

/// A handle to an interned symbol. Cloning is a refcount bump, not a
/// string copy; `Rc::ptr_eq` gives reference equality (`eq?`).
pub type Symbol = Rc<SymbolData>;

/// The process-wide (per-`Interner`-instance) symbol table: identifier
/// text -> unique `Symbol`. Kept separate from the global environment
/// table per spec §3 ("a dedicated string->Cell table separate from the
/// global environment").
pub struct Interner {
    table: HashTable<Symbol>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        Interner {
            table: HashTable::new(),
        }
    }

    /// Look up `text`, installing a fresh `Symbol` with `special_form_id`
    /// 0 if it has never been seen. This is `(string->symbol s)`.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(existing) = self.table.get(text) {
            return existing.clone();
        }
        let symbol: Symbol = Rc::new(SymbolData {
            name: text.to_string(),
            special_form_id: 0,
        });
        self.table.insert(text, symbol.clone());
        symbol
    }

    /// Pre-intern a syntactic keyword with a non-zero special-form id.
    /// Called once at startup for `define`, `if`, `lambda`, and the rest
    /// of the primitive special-form table; re-interning the same text
    /// later (e.g. by the reader) returns this same keyword `Symbol`.
    pub fn intern_keyword(&mut self, text: &str, special_form_id: u32) -> Symbol {
        debug_assert_ne!(special_form_id, 0, "keyword must have a non-zero id");
        let symbol: Symbol = Rc::new(SymbolData {
            name: text.to_string(),
            special_form_id,
        });
        self.table.insert(text, symbol.clone());
        symbol
    }

    pub fn lookup(&self, text: &str) -> Option<Symbol> {
        self.table.get(text).cloned()
    }
}

/// Reference equality for two symbols (`eq?` on symbols).
pub fn symbol_eq(a: &Symbol, b: &Symbol) -> bool {
    Rc::ptr_eq(a, b)
}
