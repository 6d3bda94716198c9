//! File-mode execution (spec §6): run a source file to completion,
//! exiting non-zero on an unhandled error.

use std::path::Path;

use crate::pipeline::Session;

/// `.scm`/`.ss` are the conventional suffixes; anything else just gets
/// a warning on stderr rather than a rejection.
fn warn_on_unconventional_suffix(path: &Path) {
    let recognized = matches!(path.extension().and_then(|e| e.to_str()), Some("scm") | Some("ss"));
    if !recognized {
        eprintln!(
            "cozenage: warning: {} does not use the conventional .scm or .ss suffix",
            path.display()
        );
    }
}

/// Read and evaluate `path` top to bottom. Returns the process exit
/// code: 0 on a clean run, 1 if the file couldn't be read or an
/// unhandled Scheme error propagated to the top level.
pub fn run_file(path: &Path) -> i32 {
    warn_on_unconventional_suffix(path);
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("cozenage: {}: {e}", path.display());
            return 1;
        }
    };
    let mut session = Session::new();
    match session.eval_source(&source) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("cozenage: {e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn clean_script_exits_zero() {
        let mut file = tempfile::Builder::new().suffix(".scm").tempfile().unwrap();
        write!(file, "(define x 1) (+ x 1)").unwrap();
        assert_eq!(run_file(file.path()), 0);
    }

    #[test]
    fn unhandled_error_exits_non_zero() {
        let mut file = tempfile::Builder::new().suffix(".scm").tempfile().unwrap();
        write!(file, "(car '())").unwrap();
        assert_eq!(run_file(file.path()), 1);
    }

    #[test]
    fn missing_file_exits_non_zero() {
        assert_eq!(run_file(Path::new("/nonexistent/path/does-not-exist.scm")), 1);
    }
}
