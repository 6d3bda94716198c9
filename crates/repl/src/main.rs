//! cozenage - command-line front end for the Cozenage Scheme runtime.
//!
//! Usage:
//!   cozenage                  # interactive REPL
//!   cozenage prog.scm         # run a script
//!   cozenage prog.scm -- a b  # run a script, passing it arguments

mod cli;
mod pipeline;
mod repl;
mod script;
mod signal;

use clap::Parser as _;
use cozenage_runtime::RuntimeConfig;

fn main() {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let config = RuntimeConfig::from_env();

    let code = match &cli.script {
        Some(path) => script::run_file(path),
        None => repl::run(&config.history_file),
    };
    std::process::exit(code);
}
