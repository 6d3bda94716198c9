//! SIGINT handling (spec §5's cancellation contract): a flag set from
//! the signal handler, polled by the REPL loop around each call to
//! `rustyline`. `rustyline` already turns a SIGINT delivered mid-read
//! into `ReadlineError::Interrupted`, which aborts the current line on
//! its own — this flag exists so the loop can also notice an interrupt
//! that arrives between reads and reset any partial multi-line buffer.
//!
//! Grounded on the teacher's `runtime::diagnostics::install_signal_handler`
//! (a `signal_hook`-registered handler gated behind `#[cfg(unix)]`),
//! using `signal_hook::flag::register` rather than `low_level::register`
//! since a boolean flag, not a callback, is all this needs.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Install a SIGINT handler that sets the returned flag. A no-op stub on
/// non-Unix targets, matching the teacher's platform split.
pub fn install_sigint_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    {
        if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&flag)) {
            tracing::warn!(error = %e, "failed to install SIGINT handler");
        }
    }
    flag
}
