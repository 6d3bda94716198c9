//! The interactive line-editing REPL (spec §6): reads a (possibly
//! multi-line) datum at a time, evaluates it, and echoes the result the
//! way `write` would print it. The top level is the only place an
//! Error recovers instead of propagating (spec §7) — it's printed and
//! the loop just asks for another line.

use std::path::Path;
use std::sync::atomic::Ordering;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::pipeline::{Session, is_incomplete};

const PROMPT: &str = "cozenage> ";
const CONTINUATION_PROMPT: &str = "...     ";

pub fn run(history_file: &Path) -> i32 {
    let mut editor = match DefaultEditor::new() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("cozenage: could not start line editor: {e}");
            return 1;
        }
    };
    if let Some(dir) = history_file.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    if editor.load_history(history_file).is_err() {
        tracing::debug!(path = %history_file.display(), "no prior REPL history to load");
    }

    let interrupted = crate::signal::install_sigint_flag();
    let mut session = Session::new();
    let mut buffer = String::new();

    loop {
        if interrupted.swap(false, Ordering::Relaxed) {
            // SIGINT landed between reads rather than inside rustyline's
            // own readline() call; still discard any partial buffer.
            buffer.clear();
        }
        let prompt = if buffer.is_empty() { PROMPT } else { CONTINUATION_PROMPT };
        match editor.readline(prompt) {
            Ok(line) => {
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                match session.eval_source_repl(&buffer) {
                    Ok(value) => {
                        let _ = editor.add_history_entry(buffer.as_str());
                        buffer.clear();
                        if !matches!(value, cozenage_core::Cell::Unspecified) {
                            println!("{}", cozenage_runtime::write_repr(&value));
                        }
                    }
                    Err(e) if is_incomplete(&e) => {
                        // Keep the buffer and prompt for the rest of the datum.
                    }
                    Err(e) => {
                        eprintln!("cozenage: {e}");
                        let _ = editor.add_history_entry(buffer.as_str());
                        buffer.clear();
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // SIGINT during a read: discard any partial multi-line
                // input and return to a fresh prompt (spec §5).
                buffer.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("cozenage: line editor error: {e}");
                break;
            }
        }
    }

    let _ = editor.save_history(history_file);
    0
}
