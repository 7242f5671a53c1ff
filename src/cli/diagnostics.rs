//! Plain diagnostic presentation for translation errors.
//!
//! The first line is always `Error: <message>`. When the source text is
//! available it is followed by the offending line and a caret under the
//! lookahead.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;

use termcolor::{Color, ColorSpec, StandardStream, WriteColor};
use unicode_width::UnicodeWidthStr;

use crate::cli::output::color_choice;
use crate::errors::TranslateError;

// === Core Types ===

pub struct CradleDiagnostic<'a> {
    error: &'a TranslateError,
    source: Option<&'a str>,
}

impl<'a> CradleDiagnostic<'a> {
    pub fn new(error: &'a TranslateError, source: Option<&'a str>) -> Self {
        Self { error, source }
    }

    fn snippet(&self) -> Option<String> {
        let source = self.source?;
        let help = self.error.diagnostic_info.help.as_deref();
        generate_code_snippet(source, self.error.span().offset(), help)
    }
}

impl<'a> Display for CradleDiagnostic<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Error: {}", self.error)?;
        if let Some(snippet) = self.snippet() {
            write!(f, "{}", snippet)?;
        }
        Ok(())
    }
}

// === Formatting Helpers ===

/// 1-based line number, the line's text, and the byte column within it.
fn locate(source: &str, offset: usize) -> (usize, &str, usize) {
    let offset = offset.min(source.len());
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |i| line_start + i);
    let line_number = source[..line_start].matches('\n').count() + 1;
    let line = source[line_start..line_end].trim_end_matches('\r');
    (line_number, line, offset - line_start)
}

fn generate_code_snippet(source: &str, offset: usize, help: Option<&str>) -> Option<String> {
    if source.is_empty() {
        return None;
    }
    let (line_number, line, column) = locate(source, offset);
    let gutter = line_number.to_string();
    let prefix = line.get(..column.min(line.len())).unwrap_or(line);
    let pad = " ".repeat(UnicodeWidthStr::width(prefix));

    let mut result = String::new();
    result.push_str(&format!("{} | {}\n", gutter, line));
    result.push_str(&format!("{:width$} | {}^", "", pad, width = gutter.len()));
    if let Some(help) = help {
        result.push(' ');
        result.push_str(help);
    }
    result.push('\n');
    Some(result)
}

// === Public API ===

/// Prints a diagnostic to standard error, coloring the `Error` tag when
/// stderr is a terminal.
pub fn print_diagnostic_to_stderr(diagnostic: &CradleDiagnostic) {
    let mut stderr = StandardStream::stderr(color_choice(atty::Stream::Stderr));
    if print_diagnostic_colored(&mut stderr, diagnostic).is_err() {
        eprint!("{}", diagnostic);
    }
}

fn print_diagnostic_colored(
    writer: &mut impl WriteColor,
    diagnostic: &CradleDiagnostic,
) -> io::Result<()> {
    writer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(writer, "Error")?;
    writer.reset()?;
    writeln!(writer, ": {}", diagnostic.error)?;
    if let Some(snippet) = diagnostic.snippet() {
        write!(writer, "{}", snippet)?;
    }
    Ok(())
}
