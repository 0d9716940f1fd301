//! Compile a YAML rule set.
//!
//! Usage: `rulebook-compile <rules.yaml> [--output FILE] [--rule NAME]... [--deny-warnings]`

use clap::Parser;
use std::process;
use tracing::error;

use rulebook_tools::cli::{run, Args};

fn main() {
    rulebook_tools::init_logging();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}
