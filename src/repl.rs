//! Cradle REPL (Read-Translate-Print Loop)
//!
//! Each line is translated on its own. A failed line is reported and the
//! loop continues with the next one.

use std::io::{self, BufRead, Write};

use crate::{
    cli::{
        diagnostics::{print_diagnostic_to_stderr, CradleDiagnostic},
        output::print_trace,
    },
    config::{Config, Dialect},
    emit::OutputBuffer,
    translator::Translator,
};

/// REPL state that persists across lines
pub struct ReplState {
    config: Config,
    line_number: usize,
}

/// What a single line of input produced.
#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// Generated code, already indented and newline-terminated.
    Code(String),
    /// The error message plus any code emitted before the failure.
    Failed { message: String, partial: String },
}

impl ReplState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            line_number: 1,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    /// Translate one line of input.
    pub fn eval_line(&mut self, input: &str) -> LineOutcome {
        let source_name = format!("<repl:{}>", self.line_number);
        self.line_number += 1;

        let mut translator =
            Translator::for_source(&source_name, input, OutputBuffer::new(), &self.config);
        let result = translator.translate();
        if let Some(trace) = translator.trace() {
            print_trace(trace);
        }
        let partial = translator.into_emitter().into_inner().as_str().to_string();

        match result {
            Ok(()) => LineOutcome::Code(partial),
            Err(e) => {
                print_diagnostic_to_stderr(&CradleDiagnostic::new(&e, Some(input)));
                LineOutcome::Failed {
                    message: e.to_string(),
                    partial,
                }
            }
        }
    }
}

/// Main REPL entry point
pub fn run_repl(config: Config) {
    let interactive = atty::is(atty::Stream::Stdin);
    if interactive {
        println!("Cradle REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit");
        println!();
    }

    let mut state = ReplState::new(config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            print!("cradle> ");
            let _ = io::stdout().flush();
        }

        let line = match lines.next() {
            None => break,
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        };
        let line = line.trim_end();

        if line.starts_with(':') {
            match handle_repl_command(line, &mut state) {
                ReplCommand::Continue => continue,
                ReplCommand::Quit => break,
            }
        }
        if line.is_empty() {
            continue;
        }

        match state.eval_line(line) {
            LineOutcome::Code(code) => print!("{}", code),
            LineOutcome::Failed { partial, .. } => print!("{}", partial),
        }
        let _ = io::stdout().flush();
    }
}

/// REPL command results
enum ReplCommand {
    Continue,
    Quit,
}

/// Handle special REPL commands that start with ':'
fn handle_repl_command(command: &str, state: &mut ReplState) -> ReplCommand {
    match command.to_ascii_lowercase().as_str() {
        ":help" | ":h" => {
            println!("Cradle REPL Commands:");
            println!("  :help, :h     Show this help");
            println!("  :quit, :q     Exit the REPL");
            println!("  :legacy, :l   Toggle the legacy dialect");
            println!();
            println!("Enter one expression per line, e.g. 1+2*3 or (a-b)/4.");
            ReplCommand::Continue
        }
        ":quit" | ":q" => ReplCommand::Quit,
        ":legacy" | ":l" => {
            state.config.dialect = match state.config.dialect {
                Dialect::Standard => Dialect::Legacy,
                Dialect::Legacy => Dialect::Standard,
            };
            println!("Dialect: {:?}", state.config.dialect);
            ReplCommand::Continue
        }
        _ => {
            println!(
                "Unknown command: {}. Type :help for available commands.",
                command
            );
            ReplCommand::Continue
        }
    }
}
