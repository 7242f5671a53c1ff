//! Defines the command-line arguments and subcommands for the Cradle CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Config, Dialect};
use crate::errors::TranslateError;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "cradle",
    version,
    about = "Translate infix arithmetic into 68000 stack-machine assembly."
)]
pub struct CradleArgs {
    #[command(flatten)]
    pub options: GlobalOptions,

    /// Defaults to `translate`, reading standard input.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by every subcommand.
#[derive(Debug, Default, Args)]
pub struct GlobalOptions {
    /// YAML or JSON file with translator settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Grammar and output conventions to follow.
    #[arg(long, global = true, value_enum)]
    pub dialect: Option<Dialect>,

    /// Shorthand for `--dialect legacy`.
    #[arg(long, global = true, conflicts_with = "dialect")]
    pub legacy: bool,

    /// Text written before every instruction (default: a tab).
    #[arg(long, global = true)]
    pub indent: Option<String>,

    /// Deepest production nesting allowed before translation fails.
    #[arg(long, global = true, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Print the productions entered to stderr.
    #[arg(long, global = true)]
    pub trace: bool,

    /// Render errors as full graphical diagnostics.
    #[arg(long, global = true)]
    pub fancy: bool,
}

impl GlobalOptions {
    /// Builds the effective configuration: defaults, then the config file,
    /// then flags.
    pub fn resolve(&self) -> Result<Config, TranslateError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(dialect) = self.dialect {
            config.dialect = dialect;
        }
        if self.legacy {
            config.dialect = Dialect::Legacy;
        }
        if let Some(indent) = &self.indent {
            config.indent = indent.clone();
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        config.trace |= self.trace;
        Ok(config)
    }
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Translate one expression.
    Translate {
        /// The expression to translate; standard input is read when neither
        /// this nor --file is given.
        expr: Option<String>,

        /// Read the expression from a file.
        #[arg(short, long, conflicts_with = "expr")]
        file: Option<PathBuf>,
    },
    /// Translate every non-blank line of a file, continuing past errors.
    Batch {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Translate expressions interactively.
    Repl,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn argument_definitions_are_consistent() {
        CradleArgs::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let args =
            CradleArgs::parse_from(["cradle", "--legacy", "--indent", "  ", "translate", "1"]);
        let config = args.options.resolve().unwrap();
        assert_eq!(config.dialect, Dialect::Legacy);
        assert_eq!(config.indent, "  ");
        assert!(matches!(
            args.command,
            Some(Command::Translate { expr: Some(ref e), file: None }) if e == "1"
        ));
    }

    #[test]
    fn max_depth_flag_overrides_default() {
        let args = CradleArgs::parse_from(["cradle", "--max-depth", "9", "translate", "1"]);
        assert_eq!(args.options.resolve().unwrap().max_depth, 9);

        let args = CradleArgs::parse_from(["cradle", "translate", "1"]);
        assert_eq!(
            args.options.resolve().unwrap().max_depth,
            crate::config::DEFAULT_MAX_DEPTH
        );
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let args = CradleArgs::parse_from(["cradle", "--trace"]);
        assert!(args.command.is_none());
        assert!(args.options.resolve().unwrap().trace);
    }

    #[test]
    fn legacy_conflicts_with_dialect() {
        let parsed =
            CradleArgs::try_parse_from(["cradle", "--legacy", "--dialect", "standard", "repl"]);
        assert!(parsed.is_err());
    }
}
