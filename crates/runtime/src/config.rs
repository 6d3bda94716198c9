//! Runtime configuration resolved from the environment (spec §6),
//! grounded on the teacher's `compiler/src/config.rs` env-driven
//! settings struct.

use std::path::PathBuf;

const APP_NAME: &str = "cozenage";

/// Settings the REPL and library loader read once at startup. Kept as
/// plain owned data rather than re-reading `std::env` on every lookup.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// `$COZENAGE_LIB_PATH`, an extra directory searched for extension
    /// libraries ahead of the built-in system paths.
    pub extra_library_path: Option<PathBuf>,
    /// Where the REPL persists its input history between sessions.
    pub history_file: PathBuf,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        RuntimeConfig {
            extra_library_path: std::env::var_os("COZENAGE_LIB_PATH").map(PathBuf::from),
            history_file: history_file_path(),
        }
    }
}

/// `$XDG_STATE_HOME/<app>/history` if set, else
/// `$HOME/.local/state/<app>/history` (spec §6).
fn history_file_path() -> PathBuf {
    if let Some(state_home) = std::env::var_os("XDG_STATE_HOME") {
        return PathBuf::from(state_home).join(APP_NAME).join("history");
    }
    let home = home::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".local").join("state").join(APP_NAME).join("history")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn xdg_state_home_takes_priority_over_home_fallback() {
        // SAFETY: test runs single-threaded within this process; no
        // other test reads these two env vars concurrently.
        unsafe {
            std::env::set_var("XDG_STATE_HOME", "/tmp/cozenage-test-state");
            std::env::remove_var("COZENAGE_LIB_PATH");
        }
        let config = RuntimeConfig::from_env();
        assert_eq!(config.history_file, PathBuf::from("/tmp/cozenage-test-state/cozenage/history"));
        unsafe {
            std::env::remove_var("XDG_STATE_HOME");
        }
    }
}
