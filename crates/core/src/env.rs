//! The environment model (spec §3): a chain of local frames (parallel
//! arrays of interned symbols and values) terminating at a shared
//! global hash table.
//!
//! Lookup walks the local chain first, then falls back to the global
//! table. `define` at top level always writes the global table; `set!`
//! rebinds the nearest existing binding, local or global, and errors if
//! none exists.

use crate::cell::Cell;
use crate::error::SchemeError;
use crate::hashtable::HashTable;
use crate::interner::{Symbol, symbol_eq};
use std::cell::RefCell;
use std::rc::Rc;

struct Frame {
    names: RefCell<Vec<Symbol>>,
    values: RefCell<Vec<Cell>>,
    parent: Option<Rc<Frame>>,
}

/// A lexical environment: the pair (innermost local frame, global
/// table). Cheap to clone — it's two `Rc`s.
#[derive(Clone)]
pub struct Env {
    local: Option<Rc<Frame>>,
    global: Rc<RefCell<HashTable<Cell>>>,
}

impl Env {
    /// A fresh top-level environment with an empty global table.
    pub fn new_global() -> Self {
        Env {
            local: None,
            global: Rc::new(RefCell::new(HashTable::new())),
        }
    }

    /// A child environment sharing this one's global table but with a
    /// brand new, empty local frame on top — used before binding
    /// `letrec`'s names (which must exist, as `Unspecified`, before
    /// their init expressions are evaluated in the new frame).
    pub fn new_child(&self) -> Env {
        Env {
            local: Some(Rc::new(Frame {
                names: RefCell::new(Vec::new()),
                values: RefCell::new(Vec::new()),
                parent: self.local.clone(),
            })),
            global: self.global.clone(),
        }
    }

    /// A child environment with `names` already bound to `values` — the
    /// common case for `lambda` application and `let`.
    pub fn extend(&self, names: Vec<Symbol>, values: Vec<Cell>) -> Env {
        Env {
            local: Some(Rc::new(Frame {
                names: RefCell::new(names),
                values: RefCell::new(values),
                parent: self.local.clone(),
            })),
            global: self.global.clone(),
        }
    }

    /// Append a new local binding to the innermost frame (used by
    /// `letrec`'s pre-allocation step before this env has one).
    pub fn bind_local(&self, name: Symbol, value: Cell) {
        let frame = self
            .local
            .as_ref()
            .expect("bind_local called on an environment with no local frame");
        frame.names.borrow_mut().push(name);
        frame.values.borrow_mut().push(value);
    }

    pub fn lookup(&self, sym: &Symbol) -> Result<Cell, SchemeError> {
        let mut frame = self.local.as_ref();
        while let Some(f) = frame {
            let names = f.names.borrow();
            if let Some(index) = names.iter().position(|n| symbol_eq(n, sym)) {
                return Ok(f.values.borrow()[index].clone());
            }
            frame = f.parent.as_ref();
        }
        self.global
            .borrow()
            .get(&sym.name)
            .cloned()
            .ok_or_else(|| SchemeError::unbound(&sym.name))
    }

    /// `define` at the global level: always writes the global table,
    /// shadowing any local binding of the same name for future lookups
    /// from environments that don't have that local frame in scope.
    pub fn define_global(&self, sym: &Symbol, value: Cell) {
        self.global.borrow_mut().insert(&sym.name, value);
    }

    /// `set!`: rebind the nearest existing binding (local frame first,
    /// then global). Errors if the symbol is unbound anywhere.
    pub fn set(&self, sym: &Symbol, value: Cell) -> Result<(), SchemeError> {
        let mut frame = self.local.as_ref();
        while let Some(f) = frame {
            let names = f.names.borrow();
            if let Some(index) = names.iter().position(|n| symbol_eq(n, sym)) {
                f.values.borrow_mut()[index] = value;
                return Ok(());
            }
            frame = f.parent.as_ref();
        }
        if self.global.borrow().contains_key(&sym.name) {
            self.global.borrow_mut().insert(&sym.name, value);
            Ok(())
        } else {
            Err(SchemeError::unbound(&sym.name))
        }
    }

    pub fn is_global(&self) -> bool {
        self.local.is_none()
    }

    /// The global-only view of this environment, discarding any local
    /// frame chain — what `interaction-environment` hands back as a
    /// first-class value.
    pub fn global_view(&self) -> Env {
        Env {
            local: None,
            global: self.global.clone(),
        }
    }

    /// Iterate the live global bindings (completion enumeration,
    /// diagnostics).
    pub fn global_names(&self) -> Vec<String> {
        self.global
            .borrow()
            .iter()
            .map(|(k, _)| k.to_string())
            .collect()
    }
}
