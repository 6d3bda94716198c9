//! The `(import (base NAME))` shared-library loader (spec §6), grounded
//! on `original_source/src/extensions.c`'s `dlopen`/`dlsym` extension
//! mechanism.
//!
//! Search order: `./lib`, `../lib/<app>`, `$COZENAGE_LIB_PATH`,
//! `/usr/lib/<app>`, `/usr/lib64/<app>` (Linux only), `/usr/local/lib/
//! <app>`. The first candidate that exists on disk is `dlopen`ed; its
//! `cozenage_library_init` symbol is resolved and called with the
//! global environment. Loaded handles are kept alive for the process
//! lifetime by leaking them into `loaded`, matching the teacher's and
//! the original's "extensions stay resident" contract — there is no
//! unload primitive in the CORE.

use cozenage_core::Env;
use cozenage_core::SchemeError;
use cozenage_evaluator::LibraryLoader;
use std::ffi::CString;
use std::path::PathBuf;

const APP_NAME: &str = "cozenage";

/// Signature every extension library's `cozenage_library_init` export
/// must have: takes the global environment pointer, returns nothing.
/// The environment is threaded through as a raw pointer because `dlsym`
/// hands back a C function pointer with no knowledge of `Env`'s Rust
/// layout; the extension is expected to have linked against the same
/// `cozenage-core` to interpret it.
type LibraryInit = unsafe extern "C" fn(*const Env);

pub struct CozenageLibraryLoader {
    loaded: Vec<libloading_handle::Handle>,
}

impl Default for CozenageLibraryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CozenageLibraryLoader {
    pub fn new() -> Self {
        CozenageLibraryLoader { loaded: Vec::new() }
    }

    fn search_paths(&self, name: &str) -> Vec<PathBuf> {
        let filename = platform_filename(name);
        let mut dirs = vec![
            PathBuf::from("./lib"),
            PathBuf::from(format!("../lib/{APP_NAME}")),
        ];
        if let Ok(extra) = std::env::var("COZENAGE_LIB_PATH") {
            dirs.push(PathBuf::from(extra));
        }
        dirs.push(PathBuf::from(format!("/usr/lib/{APP_NAME}")));
        #[cfg(target_os = "linux")]
        dirs.push(PathBuf::from(format!("/usr/lib64/{APP_NAME}")));
        dirs.push(PathBuf::from(format!("/usr/local/lib/{APP_NAME}")));
        dirs.into_iter().map(|d| d.join(&filename)).collect()
    }
}

impl LibraryLoader for CozenageLibraryLoader {
    fn load(&mut self, category: &str, name: &str, env: &Env) -> Result<(), SchemeError> {
        if category != "base" {
            return Err(SchemeError::general(format!("import: unsupported category '{category}'")));
        }
        let candidates = self.search_paths(name);
        let path = candidates
            .iter()
            .find(|p| p.exists())
            .ok_or_else(|| {
                SchemeError::general(format!(
                    "import: library '{name}' not found in {}",
                    candidates.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
                ))
            })?;
        let handle = libloading_handle::open(path)
            .map_err(|e| SchemeError::new(cozenage_core::ErrorKind::Os, format!("import: {}: {e}", path.display())))?;
        let init: LibraryInit = unsafe {
            handle
                .symbol(&CString::new("cozenage_library_init").expect("static name has no interior NUL"))
                .map_err(|e| SchemeError::new(cozenage_core::ErrorKind::Os, format!("import: {name}: {e}")))?
        };
        unsafe { init(env as *const Env) };
        self.loaded.push(handle);
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn platform_filename(name: &str) -> String {
    format!("lib{name}.dylib")
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_filename(name: &str) -> String {
    format!("lib{name}.so")
}

/// A minimal `dlopen`/`dlsym`/`dlclose` wrapper over `libc`, scoped to
/// exactly what `CozenageLibraryLoader` needs. Kept in-crate rather than
/// pulling in the `libloading` crate since the teacher's dependency
/// stack already carries `libc` for this purpose and nothing else here
/// needs a general-purpose dynamic-loading abstraction.
mod libloading_handle {
    use std::ffi::{CStr, CString};
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    pub struct Handle(*mut libc::c_void);

    pub fn open(path: &Path) -> Result<Handle, String> {
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|e| e.to_string())?;
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW) };
        if handle.is_null() {
            Err(dlerror())
        } else {
            Ok(Handle(handle))
        }
    }

    impl Handle {
        /// # Safety
        /// The caller must ensure `T` matches the actual signature of
        /// the symbol named `name` in this library.
        pub unsafe fn symbol<T: Copy>(&self, name: &CStr) -> Result<T, String> {
            let sym = unsafe { libc::dlsym(self.0, name.as_ptr()) };
            if sym.is_null() {
                return Err(dlerror());
            }
            // SAFETY: forwarded to the caller's invariant above.
            Ok(unsafe { std::mem::transmute_copy::<*mut libc::c_void, T>(&sym) })
        }
    }

    fn dlerror() -> String {
        unsafe {
            let msg = libc::dlerror();
            if msg.is_null() {
                "unknown dlopen error".to_string()
            } else {
                CStr::from_ptr(msg).to_string_lossy().into_owned()
            }
        }
    }
}
