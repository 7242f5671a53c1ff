//! The expression grammar engine.
//!
//! A single-pass recursive-descent translator: every production recognizes
//! its piece of the input and emits the code for it in the same step. There
//! is no tree; the call stack and the lookahead are the whole parse state.
//!
//! ```text
//! expression := term { ('+' | '-') term } ;
//! term       := factor { ('*' | '/') factor } ;
//! factor     := '(' expression ')' | identifier | digit ;
//! ```
//!
//! In the legacy dialect `factor := digit`.
//!
//! Any lookahead that does not fit the current production ends the
//! translation with an `<what> Expected` error. Lines already written stay
//! in the output.

use std::fmt;
use std::io::Write;
use std::str::Chars;

use miette::SourceSpan;

use crate::classify::{is_alpha, is_digit};
use crate::config::{Config, Dialect};
use crate::cursor::Cursor;
use crate::emit::{Emitter, Instruction, OutputBuffer};
use crate::errors::{build_error, ErrorKind, ErrorReporting, SourceContext, TranslateError};

pub type TranslateResult<T = ()> = Result<T, TranslateError>;

// ============================================================================
// OPERATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddOp {
    Add,
    Subtract,
}

impl AddOp {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(AddOp::Add),
            '-' => Some(AddOp::Subtract),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MulOp {
    Multiply,
    Divide,
}

impl MulOp {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(MulOp::Multiply),
            '/' => Some(MulOp::Divide),
            _ => None,
        }
    }
}

// ============================================================================
// TRACING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    Expression,
    Term,
    Factor,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Production::Expression => "expression",
            Production::Term => "term",
            Production::Factor => "factor",
            Production::Add => "add",
            Production::Subtract => "subtract",
            Production::Multiply => "multiply",
            Production::Divide => "divide",
        };
        f.write_str(name)
    }
}

/// One production entered during translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub production: Production,
    /// Nesting depth; the outermost expression is 0.
    pub depth: usize,
    pub lookahead: Option<char>,
    pub offset: usize,
}

// ============================================================================
// TRANSLATOR
// ============================================================================

pub struct Translator<I: Iterator<Item = char>, W: Write> {
    cursor: Cursor<I>,
    emitter: Emitter<W>,
    source: SourceContext,
    dialect: Dialect,
    trace: Option<Vec<TraceEvent>>,
    depth: usize,
    max_depth: usize,
}

impl<'a, W: Write> Translator<Chars<'a>, W> {
    /// Translator over in-memory text; `name` labels diagnostics.
    pub fn for_source(name: &str, source: &'a str, out: W, config: &Config) -> Self {
        Self::new(
            Cursor::from_str(source),
            Emitter::with_indent(out, config.indent.clone()),
            SourceContext::new(name, source),
            config,
        )
    }
}

impl<I: Iterator<Item = char>, W: Write> Translator<I, W> {
    /// The cursor arrives already primed with its first character.
    pub fn new(
        cursor: Cursor<I>,
        emitter: Emitter<W>,
        source: SourceContext,
        config: &Config,
    ) -> Self {
        Self {
            cursor,
            emitter,
            source,
            dialect: config.dialect,
            trace: config.trace.then(Vec::new),
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    pub fn lookahead(&self) -> Option<char> {
        self.cursor.peek()
    }

    /// Productions entered so far, if tracing is enabled.
    pub fn trace(&self) -> Option<&[TraceEvent]> {
        self.trace.as_deref()
    }

    pub fn into_emitter(self) -> Emitter<W> {
        self.emitter
    }

    /// Translates one complete expression.
    ///
    /// In the standard dialect the expression must be followed by the end of
    /// input, optionally after a line break and trailing whitespace.
    pub fn translate(&mut self) -> TranslateResult {
        self.expression()?;
        if self.dialect == Dialect::Standard {
            self.expect_end()?;
        }
        let span = self.look_span();
        self.emitter.flush().map_err(|e| self.io_error(&e, span))
    }

    // ------------------------------------------------------------------------
    // Productions
    // ------------------------------------------------------------------------

    /// `expression := term { ('+' | '-') term }`
    pub fn expression(&mut self) -> TranslateResult {
        self.traced(Production::Expression, |t| {
            t.term()?;
            if t.dialect == Dialect::Legacy {
                t.emit(Instruction::Push)?;
            }
            while let Some(op) = t.lookahead().and_then(AddOp::from_char) {
                if t.dialect == Dialect::Standard {
                    t.emit(Instruction::Push)?;
                }
                match op {
                    AddOp::Add => t.add()?,
                    AddOp::Subtract => t.subtract()?,
                }
            }
            Ok(())
        })
    }

    /// `term := factor { ('*' | '/') factor }`
    pub fn term(&mut self) -> TranslateResult {
        self.traced(Production::Term, |t| {
            t.factor()?;
            while let Some(op) = t.lookahead().and_then(MulOp::from_char) {
                t.emit(Instruction::Push)?;
                match op {
                    MulOp::Multiply => t.multiply()?,
                    MulOp::Divide => t.divide()?,
                }
            }
            Ok(())
        })
    }

    /// `factor := '(' expression ')' | identifier | digit`
    pub fn factor(&mut self) -> TranslateResult {
        self.traced(Production::Factor, |t| {
            if t.dialect == Dialect::Standard {
                match t.lookahead() {
                    Some('(') => {
                        t.match_char('(')?;
                        t.expression()?;
                        return t.match_char(')');
                    }
                    Some(c) if is_alpha(c) => {
                        let name = t.get_name()?;
                        return t.emit(Instruction::LoadVar(name.to_string()));
                    }
                    _ => {}
                }
            }
            let digit = t.get_number()?;
            t.emit(Instruction::LoadConst(digit))
        })
    }

    pub fn add(&mut self) -> TranslateResult {
        self.traced(Production::Add, |t| {
            t.match_char('+')?;
            t.term()?;
            t.emit(Instruction::AddPop)
        })
    }

    /// The stack holds the left operand, so `SUB` computes right minus left
    /// and `NEG` restores the order.
    pub fn subtract(&mut self) -> TranslateResult {
        self.traced(Production::Subtract, |t| {
            t.match_char('-')?;
            t.term()?;
            t.emit(Instruction::SubPop)?;
            t.emit(Instruction::Negate)
        })
    }

    pub fn multiply(&mut self) -> TranslateResult {
        self.traced(Production::Multiply, |t| {
            t.match_char('*')?;
            t.factor()?;
            t.emit(Instruction::MulPop)
        })
    }

    pub fn divide(&mut self) -> TranslateResult {
        self.traced(Production::Divide, |t| {
            t.match_char('/')?;
            t.factor()?;
            t.emit(Instruction::DivPop)
        })
    }

    // ------------------------------------------------------------------------
    // Matching and recognizers
    // ------------------------------------------------------------------------

    /// Consumes `expected` or fails with `'<expected>' Expected`.
    pub fn match_char(&mut self, expected: char) -> TranslateResult {
        if self.lookahead() == Some(expected) {
            self.cursor.advance();
            return Ok(());
        }
        Err(self.expected_here(&format!("'{}'", expected)))
    }

    /// Consumes a one-letter identifier.
    pub fn get_name(&mut self) -> TranslateResult<char> {
        match self.lookahead() {
            Some(c) if is_alpha(c) => {
                self.cursor.advance();
                Ok(c)
            }
            _ => Err(self.expected_here("Name")),
        }
    }

    /// Consumes a single decimal digit.
    pub fn get_number(&mut self) -> TranslateResult<char> {
        match self.lookahead() {
            Some(c) if is_digit(c) => {
                self.cursor.advance();
                Ok(c)
            }
            _ => Err(self.expected_here("Integer")),
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Only whitespace may follow the line break that ends the expression.
    fn expect_end(&mut self) -> TranslateResult {
        match self.lookahead() {
            None => return Ok(()),
            Some('\n' | '\r') => {}
            Some(_) => return Err(self.expected_here("Newline")),
        }
        while self.lookahead().is_some_and(char::is_whitespace) {
            self.cursor.advance();
        }
        if self.cursor.is_at_end() {
            return Ok(());
        }
        Err(self.expected_here("End of input"))
    }

    fn emit(&mut self, instruction: Instruction) -> TranslateResult {
        let span = self.look_span();
        self.emitter
            .instruction(&instruction)
            .map_err(|e| self.io_error(&e, span))
    }

    fn look_span(&self) -> SourceSpan {
        SourceSpan::from(self.cursor.offset()..self.cursor.offset() + self.cursor.look_len())
    }

    /// `<what> Expected` at the lookahead, with what was actually found.
    fn expected_here(&self, what: &str) -> TranslateError {
        let found = match self.lookahead() {
            Some(c) => format!("found '{}'", c.escape_default()),
            None => "reached the end of input".to_string(),
        };
        ErrorReporting::expected(self, what, self.look_span()).with_help(found)
    }

    fn traced<T>(
        &mut self,
        production: Production,
        body: impl FnOnce(&mut Self) -> TranslateResult<T>,
    ) -> TranslateResult<T> {
        if self.depth >= self.max_depth {
            let limit = self.max_depth;
            return Err(self
                .report(ErrorKind::TooDeep { limit }, self.look_span())
                .with_help("simplify the expression or raise max_depth"));
        }
        if let Some(events) = self.trace.as_mut() {
            events.push(TraceEvent {
                production,
                depth: self.depth,
                lookahead: self.cursor.peek(),
                offset: self.cursor.offset(),
            });
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }
}

impl<I: Iterator<Item = char>, W: Write> ErrorReporting for Translator<I, W> {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> TranslateError {
        build_error(&self.source, "parse", kind, span)
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Translates `source` and returns the generated code.
pub fn translate_str(source: &str, config: &Config) -> TranslateResult<String> {
    let mut translator = Translator::for_source("<input>", source, OutputBuffer::new(), config);
    translator.translate()?;
    Ok(translator.into_emitter().into_inner().as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, config: &Config) -> (Vec<String>, TranslateResult) {
        let mut translator = Translator::for_source("<test>", source, OutputBuffer::new(), config);
        let result = translator.translate();
        let out = translator.into_emitter().into_inner();
        let lines = out.instructions().into_iter().map(String::from).collect();
        (lines, result)
    }

    #[test]
    fn match_char_consumes_exactly_one() {
        let config = Config::default();
        let mut t = Translator::for_source("<test>", "*/", OutputBuffer::new(), &config);
        t.match_char('*').unwrap();
        assert_eq!(t.lookahead(), Some('/'));
        let err = t.match_char('*').unwrap_err();
        assert_eq!(err.to_string(), "'*' Expected");
        assert_eq!(t.lookahead(), Some('/'));
    }

    #[test]
    fn get_number_and_get_name() {
        let config = Config::default();
        let mut t = Translator::for_source("<test>", "7a", OutputBuffer::new(), &config);
        assert_eq!(t.get_name().unwrap_err().to_string(), "Name Expected");
        assert_eq!(t.get_number().unwrap(), '7');
        assert_eq!(t.get_number().unwrap_err().to_string(), "Integer Expected");
        assert_eq!(t.get_name().unwrap(), 'a');
        assert_eq!(t.lookahead(), None);
    }

    #[test]
    fn get_name_rejects_punctuation_between_cases() {
        let config = Config::default();
        for source in ["_", "[", "`"] {
            let mut t = Translator::for_source("<test>", source, OutputBuffer::new(), &config);
            assert_eq!(t.get_name().unwrap_err().to_string(), "Name Expected");
        }
    }

    #[test]
    fn nesting_limit_counts_productions() {
        let config = Config {
            max_depth: 6,
            ..Config::default()
        };
        // expression, term, factor, then the same three inside the parens.
        let (_, result) = run("(1)", &config);
        result.unwrap();

        let (lines, result) = run("((1))", &config);
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TooDeep { limit: 6 });
        assert_eq!(err.diagnostic_info.error_code, "cradle::parse::too_deep");
        assert_eq!(err.span().offset(), 2);
        assert!(lines.is_empty());
    }

    #[test]
    fn line_break_may_only_be_followed_by_whitespace() {
        let (_, result) = run("1\n \t\n", &Config::default());
        result.unwrap();

        let (lines, result) = run("1\n 2", &Config::default());
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "End of input Expected");
        assert_eq!(err.span().offset(), 3);
        assert_eq!(lines, vec!["MOVE #1,D0"]);
    }

    #[test]
    fn error_span_points_at_lookahead() {
        let (_, result) = run("1+x*", &Config::default());
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Integer Expected");
        assert_eq!(err.span().offset(), 4);
        assert_eq!(err.span().len(), 0);
        assert_eq!(
            err.diagnostic_info.help.as_deref(),
            Some("reached the end of input")
        );
    }

    #[test]
    fn trace_records_nesting() {
        let config = Config {
            trace: true,
            ..Config::default()
        };
        let mut t = Translator::for_source("<test>", "1*2", OutputBuffer::new(), &config);
        t.translate().unwrap();
        let trace: Vec<_> = t
            .trace()
            .unwrap()
            .iter()
            .map(|e| (e.production, e.depth))
            .collect();
        assert_eq!(
            trace,
            vec![
                (Production::Expression, 0),
                (Production::Term, 1),
                (Production::Factor, 2),
                (Production::Multiply, 2),
                (Production::Factor, 3),
            ]
        );
    }

    #[test]
    fn trace_is_off_by_default() {
        let config = Config::default();
        let mut t = Translator::for_source("<test>", "1", OutputBuffer::new(), &config);
        t.translate().unwrap();
        assert!(t.trace().is_none());
    }

    #[test]
    fn failure_keeps_earlier_output() {
        let (lines, result) = run("1*(2+", &Config::default());
        assert!(result.is_err());
        assert_eq!(
            lines,
            vec!["MOVE #1,D0", "MOVE D0,-(SP)", "MOVE #2,D0", "MOVE D0,-(SP)"]
        );
    }

    #[test]
    fn accepts_trailing_newline() {
        let (lines, result) = run("5\n", &Config::default());
        result.unwrap();
        assert_eq!(lines, vec!["MOVE #5,D0"]);
        let (_, result) = run("5\r\n", &Config::default());
        result.unwrap();
    }
}
