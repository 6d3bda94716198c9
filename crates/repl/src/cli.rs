//! Command-line argument parsing (spec §6), matching the teacher's
//! `clap::Parser` derive style (`compiler/src/main.rs`).

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "cozenage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A tree-walking R7RS-leaning Scheme interpreter", long_about = None)]
pub struct Cli {
    /// Scheme source file to run; omit to start an interactive REPL
    pub script: Option<PathBuf>,

    /// Arguments passed to the script, visible to it via (command-line)
    #[arg(last = true)]
    pub script_args: Vec<String>,
}
