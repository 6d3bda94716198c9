//! File-library primitives (spec §4.5 supplement: R7RS `(scheme
//! file)`), grounded on `original_source/src/ports.c`'s file-backed
//! port constructors.

use cozenage_core::{Cell, Env, ErrorKind, Interner, Port, PortDirection, PortHandle, PortMedium, SchemeError, check_arity};
use std::cell::RefCell;
use std::fs::OpenOptions;
use std::rc::Rc;

use crate::registry::define_builtin;

fn path_arg(proc: &str, c: &Cell) -> Result<String, SchemeError> {
    match c {
        Cell::String(s) => Ok(s.borrow().as_str().to_string()),
        other => Err(SchemeError::wrong_type(proc, "a string", other.type_name())),
    }
}

pub fn install(env: &Env, interner: &mut Interner) {
    define_builtin(env, interner, "open-input-file", Rc::new(|_a, _e, args| {
        check_arity("open-input-file", args.len(), 1, Some(1))?;
        let path = path_arg("open-input-file", &args[0])?;
        let file = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|e| SchemeError::new(ErrorKind::Os, format!("open-input-file: {path}: {e}")))?;
        Ok(Cell::Port(Rc::new(RefCell::new(Port {
            path: Some(path),
            handle: PortHandle::File(file),
            direction: PortDirection::Input,
            medium: PortMedium::File,
            open: true,
        }))))
    }));
    define_builtin(env, interner, "open-output-file", Rc::new(|_a, _e, args| {
        check_arity("open-output-file", args.len(), 1, Some(1))?;
        let path = path_arg("open-output-file", &args[0])?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| SchemeError::new(ErrorKind::Os, format!("open-output-file: {path}: {e}")))?;
        Ok(Cell::Port(Rc::new(RefCell::new(Port {
            path: Some(path),
            handle: PortHandle::File(file),
            direction: PortDirection::Output,
            medium: PortMedium::File,
            open: true,
        }))))
    }));
    define_builtin(env, interner, "file-exists?", Rc::new(|_a, _e, args| {
        check_arity("file-exists?", args.len(), 1, Some(1))?;
        Ok(Cell::boolean(std::path::Path::new(&path_arg("file-exists?", &args[0])?).exists()))
    }));
    define_builtin(env, interner, "delete-file", Rc::new(|_a, _e, args| {
        check_arity("delete-file", args.len(), 1, Some(1))?;
        let path = path_arg("delete-file", &args[0])?;
        std::fs::remove_file(&path).map_err(|e| SchemeError::new(ErrorKind::Os, format!("delete-file: {path}: {e}")))?;
        Ok(Cell::Unspecified)
    }));
}
