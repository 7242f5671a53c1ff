//! Translator configuration.
//!
//! Options come from defaults, then an optional YAML or JSON file, then
//! command-line flags. Unknown keys in a file are rejected.

use std::{fs, path::Path};

use miette::SourceSpan;
use serde::{Deserialize, Serialize};

use crate::emit::DEFAULT_INDENT;
use crate::errors::{
    unspanned, ErrorKind, ErrorReporting, PhaseContext, SourceContext, TranslateError,
};

/// Default limit on nested productions; each parenthesis level costs three.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Which grammar and output conventions the translator follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Digits, identifiers and parentheses as factors; one push per binary
    /// operator; trailing input is rejected.
    #[default]
    Standard,
    /// The original cradle: single digits only, one unconditional push after
    /// the first term, and trailing input ignored.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dialect: Dialect,
    /// Prefix written before every instruction.
    pub indent: String,
    /// Record each production as it is entered.
    pub trace: bool,
    /// Deepest production nesting allowed before translation fails.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::Standard,
            indent: DEFAULT_INDENT.to_string(),
            trace: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON; anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

impl Config {
    pub fn legacy() -> Self {
        Self {
            dialect: Dialect::Legacy,
            ..Self::default()
        }
    }

    /// Reads a configuration file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self, TranslateError> {
        let name = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| {
            PhaseContext::new(SourceContext::fallback(&name), "config")
                .report(
                    ErrorKind::Config {
                        message: format!("cannot read '{}': {}", name, e),
                    },
                    unspanned(),
                )
        })?;
        Self::parse(&name, &content, ConfigFormat::from_path(path))
    }

    pub fn parse(name: &str, content: &str, format: ConfigFormat) -> Result<Self, TranslateError> {
        let ctx = PhaseContext::new(SourceContext::new(name, content), "config");
        let config_error = |message: String, span: SourceSpan| {
            ctx.report(ErrorKind::Config { message }, span)
        };

        match format {
            ConfigFormat::Yaml => {
                // An empty document means "all defaults".
                if content.trim().is_empty() {
                    return Ok(Self::default());
                }
                serde_yaml::from_str(content).map_err(|e| {
                    let span = e
                        .location()
                        .map_or_else(unspanned, |loc| SourceSpan::from(loc.index()..loc.index()));
                    config_error(e.to_string(), span)
                })
            }
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| {
                let offset = line_col_offset(content, e.line(), e.column());
                config_error(e.to_string(), SourceSpan::from(offset..offset))
            }),
        }
    }
}

/// Byte offset of a 1-based line and column, clamped to the content.
fn line_col_offset(content: &str, line: usize, column: usize) -> usize {
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(content.len())
}
