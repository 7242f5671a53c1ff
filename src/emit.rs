//! Instruction text and the sink it is written to.
//!
//! Every reduction in the grammar produces one or two [`Instruction`]s. The
//! [`Emitter`] writes each one immediately, one per line, prefixed with a
//! single indentation unit.

use std::fmt;
use std::io::{self, Write};

/// The default indentation unit, one tab.
pub const DEFAULT_INDENT: &str = "\t";

/// The 68000 instructions the translator can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `MOVE #d,D0`: load a literal into the accumulator.
    LoadConst(char),
    /// `MOVE x(PC),D0`: load a named variable into the accumulator.
    LoadVar(String),
    /// `MOVE D0,-(SP)`: push the accumulator.
    Push,
    /// `ADD (SP)+,D1`
    AddPop,
    /// `SUB (SP)+,D0`
    SubPop,
    /// `NEG D0`
    Negate,
    /// `MULS (SP)+,D1`
    MulPop,
    /// `DIVS (SP)+,D1`
    DivPop,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::LoadConst(digit) => write!(f, "MOVE #{},D0", digit),
            Instruction::LoadVar(name) => write!(f, "MOVE {}(PC),D0", name),
            Instruction::Push => f.write_str("MOVE D0,-(SP)"),
            Instruction::AddPop => f.write_str("ADD (SP)+,D1"),
            Instruction::SubPop => f.write_str("SUB (SP)+,D0"),
            Instruction::Negate => f.write_str("NEG D0"),
            Instruction::MulPop => f.write_str("MULS (SP)+,D1"),
            Instruction::DivPop => f.write_str("DIVS (SP)+,D1"),
        }
    }
}

/// Writes generated code to any `io::Write` sink.
pub struct Emitter<W: Write> {
    out: W,
    indent: String,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self::with_indent(out, DEFAULT_INDENT)
    }

    pub fn with_indent(out: W, indent: impl Into<String>) -> Self {
        Self {
            out,
            indent: indent.into(),
        }
    }

    /// Writes the indentation unit and `text`, without a newline.
    pub fn emit(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{}{}", self.indent, text)
    }

    /// `emit` followed by a newline.
    pub fn emit_line(&mut self, text: &str) -> io::Result<()> {
        self.emit(text)?;
        writeln!(self.out)
    }

    pub fn instruction(&mut self, instruction: &Instruction) -> io::Result<()> {
        self.emit_line(&instruction.to_string())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Collects emitted text in memory, for tests and programmatic use.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    pub buffer: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buffer).unwrap_or_default()
    }

    /// The emitted lines without their indentation.
    pub fn instructions(&self) -> Vec<&str> {
        self.as_str().lines().map(str::trim_start).collect()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_text_is_exact() {
        let cases = [
            (Instruction::LoadConst('7'), "MOVE #7,D0"),
            (Instruction::LoadVar("x".into()), "MOVE x(PC),D0"),
            (Instruction::Push, "MOVE D0,-(SP)"),
            (Instruction::AddPop, "ADD (SP)+,D1"),
            (Instruction::SubPop, "SUB (SP)+,D0"),
            (Instruction::Negate, "NEG D0"),
            (Instruction::MulPop, "MULS (SP)+,D1"),
            (Instruction::DivPop, "DIVS (SP)+,D1"),
        ];
        for (instruction, text) in cases {
            assert_eq!(instruction.to_string(), text);
        }
    }

    #[test]
    fn emit_has_no_newline_and_emit_line_does() {
        let mut emitter = Emitter::new(OutputBuffer::new());
        emitter.emit("A").unwrap();
        emitter.emit_line("B").unwrap();
        assert_eq!(emitter.into_inner().as_str(), "\tA\tB\n");
    }

    #[test]
    fn custom_indent_unit() {
        let mut emitter = Emitter::with_indent(OutputBuffer::new(), "    ");
        emitter.instruction(&Instruction::Push).unwrap();
        let out = emitter.into_inner();
        assert_eq!(out.as_str(), "    MOVE D0,-(SP)\n");
        assert_eq!(out.instructions(), vec!["MOVE D0,-(SP)"]);
    }
}
