//! Handles user-facing output for the CLI that is not generated code:
//! production traces and color selection.

use std::io;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::translator::TraceEvent;

/// Colors only when the stream is a terminal.
pub fn color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Prints a production trace to stderr.
pub fn print_trace(trace: &[TraceEvent]) {
    let mut stderr = StandardStream::stderr(color_choice(atty::Stream::Stderr));
    let _ = write_trace(&mut stderr, trace);
}

/// Writes one line per production, indented by nesting depth:
/// `  term  '1' @0`.
pub fn write_trace(writer: &mut impl WriteColor, trace: &[TraceEvent]) -> io::Result<()> {
    for event in trace {
        write!(writer, "{}", "  ".repeat(event.depth))?;
        writer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(writer, "{}", event.production)?;
        writer.reset()?;
        let look = match event.lookahead {
            Some(c) => format!("'{}'", c.escape_default()),
            None => "<eof>".to_string(),
        };
        writeln!(writer, "  {} @{}", look, event.offset)?;
    }
    writer.reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::emit::OutputBuffer;
    use crate::translator::Translator;
    use termcolor::NoColor;

    #[test]
    fn trace_lines_are_indented_by_depth() {
        let config = Config {
            trace: true,
            ..Config::default()
        };
        let mut translator = Translator::for_source("<test>", "a-1", OutputBuffer::new(), &config);
        translator.translate().unwrap();

        let mut out = NoColor::new(Vec::new());
        write_trace(&mut out, translator.trace().unwrap()).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        let expected = "expression  'a' @0
  term  'a' @0
    factor  'a' @0
  subtract  '-' @1
    term  '1' @2
      factor  '1' @2
";
        assert_eq!(text, expected);
    }
}
