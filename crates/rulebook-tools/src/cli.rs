//! `rulebook-compile` command.

use clap::Parser;
use rulebook::{
    compile_with, parse_source, CollectingSink, CompileOptions, CompiledRules, DiagnosticSink,
    MechanismParser, TracingSink,
};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rulebook-compile")]
#[command(about = "Compile a YAML rule set and dump the compiled rules as JSON")]
pub struct Args {
    /// Path to the YAML rule file
    pub input: PathBuf,

    /// Write the JSON dump here instead of stdout
    #[arg(long = "output", short = 'o')]
    pub output: Option<PathBuf>,

    /// Only dump these rules (fully qualified names)
    #[arg(long = "rule")]
    pub rules: Vec<String>,

    /// Fail if the compile emits any warning
    #[arg(long = "deny-warnings")]
    pub deny_warnings: bool,

    /// Lowercase unit annotations
    #[arg(long = "lowercase-units")]
    pub lowercase_units: bool,

    /// Emit compact JSON
    #[arg(long = "compact")]
    pub compact: bool,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Rulebook(#[from] rulebook::Error),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0} warning(s) emitted with --deny-warnings")]
    DeniedWarnings(usize),

    #[error("unknown rule `{0}`")]
    UnknownRule(String),
}

/// Forwards to tracing while counting warnings.
struct CountingSink {
    inner: TracingSink,
    collected: CollectingSink,
}

impl DiagnosticSink for CountingSink {
    fn emit(&mut self, diagnostic: rulebook::CompileError) {
        self.inner.emit(diagnostic.clone());
        self.collected.emit(diagnostic);
    }
}

/// Compile `args.input` and render the JSON dump.
///
/// # Errors
///
/// I/O, decoding and compile failures; warnings with `--deny-warnings`;
/// unknown `--rule` names.
pub fn render(args: &Args) -> Result<String, CliError> {
    let source = fs::read_to_string(&args.input).map_err(|source| CliError::Read {
        path: args.input.clone(),
        source,
    })?;

    let mut options = CompileOptions::default();
    if args.lowercase_units {
        options = options.with_unit_label(|unit| unit.to_lowercase());
    }

    let mut sink = CountingSink {
        inner: TracingSink,
        collected: CollectingSink::new(),
    };
    let compiled = compile_with(parse_source(&source)?, options, &MechanismParser, &mut sink)?;

    let warnings = sink
        .collected
        .diagnostics
        .iter()
        .filter(|d| d.severity >= rulebook::Severity::Warning)
        .count();
    if args.deny_warnings && warnings > 0 {
        return Err(CliError::DeniedWarnings(warnings));
    }
    info!(rules = compiled.len(), warnings, "compiled {}", args.input.display());

    let compiled = select(compiled, &args.rules)?;
    let json = if args.compact {
        serde_json::to_string(&compiled)?
    } else {
        serde_json::to_string_pretty(&compiled)?
    };
    Ok(json)
}

/// Run the command: render, then write to `--output` or stdout.
///
/// # Errors
///
/// See [`render`].
pub fn run(args: &Args) -> Result<(), CliError> {
    let json = render(args)?;
    match &args.output {
        Some(path) => fs::write(path, json).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        }),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn select(compiled: CompiledRules, names: &[String]) -> Result<CompiledRules, CliError> {
    if names.is_empty() {
        return Ok(compiled);
    }
    let mut selected = CompiledRules {
        rules: Default::default(),
        nullability: Default::default(),
    };
    for name in names {
        let key = rulebook::DottedName::parse(name);
        let rule = compiled
            .rules
            .get(&key)
            .ok_or_else(|| CliError::UnknownRule(name.clone()))?;
        if let Some(&nullable) = compiled.nullability.get(&key) {
            selected.nullability.insert(key.clone(), nullable);
        }
        selected.rules.insert(key, rule.clone());
    }
    Ok(selected)
}
