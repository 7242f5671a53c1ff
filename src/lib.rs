//! Cradle: a single-pass recursive-descent translator from infix arithmetic
//! to 68000 stack-machine assembly.
//!
//! - `cursor` holds the one-character lookahead.
//! - `classify` decides letters and digits.
//! - `translator` is the grammar engine; it recognizes and emits in one step.
//! - `emit` turns instructions into indented lines on any `io::Write`.
//! - `errors` builds the diagnostics every failure is reported with.

pub use crate::config::{Config, Dialect};
pub use crate::errors::{ErrorKind, TranslateError};
pub use crate::translator::{translate_str, Translator};

pub mod classify;
pub mod cli;
pub mod config;
pub mod cursor;
pub mod emit;
pub mod errors;
pub mod repl;
pub mod translator;
