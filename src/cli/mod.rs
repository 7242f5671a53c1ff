//! The Cradle Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands. It owns the
//! decision the library leaves to its caller: a failed translation ends the
//! process for `translate`, and is reported and skipped for `batch`.

use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
    process,
};

use clap::Parser;

use crate::{
    config::Config,
    errors::{
        self, print_error, unspanned, ErrorReporting, PhaseContext, SourceContext,
        TranslateError,
    },
    repl,
    translator::Translator,
};

use self::{
    args::{Command, CradleArgs, GlobalOptions},
    diagnostics::{print_diagnostic_to_stderr, CradleDiagnostic},
    output::print_trace,
};

pub mod args;
pub mod diagnostics;
pub mod output;

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = CradleArgs::parse();
    let config = args.options.resolve().unwrap_or_else(|e| {
        present_error(e, None, &args.options);
        process::exit(1);
    });

    let ok = match args.command.unwrap_or(Command::Translate {
        expr: None,
        file: None,
    }) {
        Command::Translate { expr, file } => {
            let (name, source) = match (expr, file) {
                (Some(expr), _) => ("<arg>".to_string(), expr),
                (None, Some(path)) => {
                    let source = read_file_or_exit(&path, &args.options);
                    (path.display().to_string(), source)
                }
                (None, None) => ("<stdin>".to_string(), read_stdin_or_exit(&args.options)),
            };
            translate_source(&name, &source, &config, &args.options)
        }
        Command::Batch { file } => {
            let source = read_file_or_exit(&file, &args.options);
            run_batch(&file, &source, &config, &args.options)
        }
        Command::Repl => {
            repl::run_repl(config);
            true
        }
    };

    if !ok {
        process::exit(1);
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

/// Translates one source to stdout and presents any error on stderr.
fn translate_source(name: &str, source: &str, config: &Config, options: &GlobalOptions) -> bool {
    let stdout = io::stdout();
    let mut translator = Translator::for_source(name, source, stdout.lock(), config);
    let result = translator.translate();
    if let Some(trace) = translator.trace() {
        print_trace(trace);
    }
    drop(translator);

    match result {
        Ok(()) => true,
        Err(e) => {
            let _ = io::stdout().flush();
            present_error(e, Some(source), options);
            false
        }
    }
}

/// Each non-blank line is its own expression. Failures are reported and the
/// batch moves on; the return value says whether every line succeeded.
fn run_batch(path: &Path, source: &str, config: &Config, options: &GlobalOptions) -> bool {
    let mut failed = 0;
    let mut stderr = io::stderr();

    for (index, line) in source.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let name = format!("{}:{}", path.display(), index + 1);
        let mut translator = Translator::for_source(&name, line, io::stdout().lock(), config);
        let result = translator.translate();
        if let Some(trace) = translator.trace() {
            print_trace(trace);
        }
        drop(translator);

        if let Err(e) = result {
            failed += 1;
            let _ = io::stdout().flush();
            if options.fancy {
                print_error(e);
            } else {
                let _ = errors::report(&mut stderr, &format!("{} ({})", e, name));
            }
        }
    }

    failed == 0
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

pub(crate) fn present_error(error: TranslateError, source: Option<&str>, options: &GlobalOptions) {
    if options.fancy {
        print_error(error);
        return;
    }
    print_diagnostic_to_stderr(&CradleDiagnostic::new(&error, source));
}

fn read_file_or_exit(path: &Path, options: &GlobalOptions) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        let name = path.display().to_string();
        let ctx = PhaseContext::new(SourceContext::fallback(&name), "input");
        present_error(ctx.io_error(&e, unspanned()), None, options);
        process::exit(1);
    })
}

fn read_stdin_or_exit(options: &GlobalOptions) -> String {
    let mut source = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut source) {
        let ctx = PhaseContext::new(SourceContext::fallback("<stdin>"), "input");
        present_error(ctx.io_error(&e, unspanned()), None, options);
        process::exit(1);
    }
    source
}
