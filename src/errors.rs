//! Cradle error handling.
//!
//! Every failure in the translator is a `TranslateError`. Grammar violations
//! are fatal for the translation that raised them: they are returned up the
//! call chain and the caller decides whether to halt the process or move on
//! to the next expression.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Names the text being translated so diagnostics can quote it.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Used when the source text is not available, e.g. for I/O failures.
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: format!("; {}", context),
        }
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("no source")
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// A translation failure with everything needed to present it.
#[derive(Debug)]
pub struct TranslateError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened
    pub source_info: SourceInfo,
    /// How to help
    pub diagnostic_info: DiagnosticInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The lookahead did not satisfy the current production.
    #[error("{what} Expected")]
    Expected { what: String },
    /// Productions nested past the configured limit.
    #[error("Expression nested deeper than {limit} productions")]
    TooDeep { limit: usize },
    #[error("I/O failure: {message}")]
    Io { message: String },
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl ErrorKind {
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::Expected { .. } => "expected",
            Self::TooDeep { .. } => "too_deep",
            Self::Io { .. } => "io",
            Self::Config { .. } => "config",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::Expected { .. } => "found here",
            Self::TooDeep { .. } => "nesting limit reached here",
            Self::Io { .. } => "while writing",
            Self::Config { .. } => "in this configuration",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

impl TranslateError {
    pub fn span(&self) -> SourceSpan {
        self.source_info.primary_span
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }
}

impl std::error::Error for TranslateError {}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Diagnostic for TranslateError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

// ============================================================================
// ERROR REPORTING - Context-aware construction
// ============================================================================

/// Anything that knows its source and phase can build errors for it.
pub trait ErrorReporting {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> TranslateError;

    /// `<what> Expected`; every grammar violation goes through here.
    fn expected(&self, what: &str, span: SourceSpan) -> TranslateError {
        self.report(
            ErrorKind::Expected {
                what: what.to_string(),
            },
            span,
        )
    }

    fn io_error(&self, err: &io::Error, span: SourceSpan) -> TranslateError {
        self.report(
            ErrorKind::Io {
                message: err.to_string(),
            },
            span,
        )
    }
}

/// Error construction for a phase that only has a source, such as loading
/// configuration or reading input.
pub struct PhaseContext {
    pub source: SourceContext,
    pub phase: String,
}

impl PhaseContext {
    pub fn new(source: SourceContext, phase: impl Into<String>) -> Self {
        Self {
            source,
            phase: phase.into(),
        }
    }
}

impl ErrorReporting for PhaseContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> TranslateError {
        build_error(&self.source, &self.phase, kind, span)
    }
}

pub(crate) fn build_error(
    source: &SourceContext,
    phase: &str,
    kind: ErrorKind,
    span: SourceSpan,
) -> TranslateError {
    let error_code = format!("cradle::{}::{}", phase, kind.code_suffix());
    TranslateError {
        kind,
        source_info: SourceInfo {
            source: source.to_named_source(),
            primary_span: span,
            phase: phase.to_string(),
        },
        diagnostic_info: DiagnosticInfo {
            help: None,
            error_code,
        },
    }
}

/// Placeholder span for errors not tied to a source location.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Writes `Error: <message>` and returns; the caller carries on.
pub fn report(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "Error: {}", message)
}

/// Prints a TranslateError as a full miette report on stderr.
pub fn print_error(error: TranslateError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PhaseContext {
        PhaseContext::new(SourceContext::new("<test>", "1+x"), "parse")
    }

    #[test]
    fn expected_formats_message_and_code() {
        let err = ctx().expected("Integer", SourceSpan::from(2..3));
        assert_eq!(err.to_string(), "Integer Expected");
        assert_eq!(err.diagnostic_info.error_code, "cradle::parse::expected");
        assert_eq!(err.span().offset(), 2);
    }

    #[test]
    fn report_is_non_fatal_and_prefixed() {
        let mut out = Vec::new();
        report(&mut out, "Name Expected").unwrap();
        report(&mut out, "')' Expected").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Error: Name Expected\nError: ')' Expected\n"
        );
    }

    #[test]
    fn help_is_exposed_through_diagnostic() {
        let err = ctx()
            .expected("Newline", SourceSpan::from(1..2))
            .with_help("remove the trailing text");
        let help = Diagnostic::help(&err).map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("remove the trailing text"));
    }

    #[test]
    fn io_errors_are_categorized() {
        let io = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err = ctx().io_error(&io, unspanned());
        assert!(matches!(err.kind, ErrorKind::Io { .. }));
        assert!(err.to_string().contains("pipe closed"));
    }
}
