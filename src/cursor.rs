//! Single-character lookahead over a character stream.
//!
//! The cursor is the only parsing state the translator carries. It is primed
//! on construction, so the lookahead is always valid before any production
//! runs.

use std::str::Chars;

/// Owns the lookahead character and the stream it is read from.
#[derive(Debug, Clone)]
pub struct Cursor<I: Iterator<Item = char>> {
    chars: I,
    look: Option<char>,
    /// Byte offset of `look` within the source.
    offset: usize,
    /// Byte offset just past `look`.
    next_offset: usize,
}

impl<'a> Cursor<Chars<'a>> {
    /// Creates a cursor over in-memory source text.
    pub fn from_str(source: &'a str) -> Self {
        Self::new(source.chars())
    }
}

impl<I: Iterator<Item = char>> Cursor<I> {
    /// Creates a cursor and reads the first character into the lookahead.
    pub fn new(chars: I) -> Self {
        let mut cursor = Self {
            chars,
            look: None,
            offset: 0,
            next_offset: 0,
        };
        cursor.advance();
        cursor
    }

    /// The current lookahead, or `None` once the stream is exhausted.
    pub fn peek(&self) -> Option<char> {
        self.look
    }

    /// Reads the next character into the lookahead.
    pub fn advance(&mut self) {
        self.offset = self.next_offset;
        self.look = self.chars.next();
        if let Some(c) = self.look {
            self.next_offset += c.len_utf8();
        }
    }

    /// Byte offset of the lookahead in the source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte length of the lookahead; zero at end of input.
    pub fn look_len(&self) -> usize {
        self.look.map_or(0, char::len_utf8)
    }

    pub fn is_at_end(&self) -> bool {
        self.look.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primes_lookahead_on_construction() {
        let cursor = Cursor::from_str("12");
        assert_eq!(cursor.peek(), Some('1'));
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn advance_walks_to_end_sentinel() {
        let mut cursor = Cursor::from_str("ab");
        cursor.advance();
        assert_eq!(cursor.peek(), Some('b'));
        assert_eq!(cursor.offset(), 1);
        cursor.advance();
        assert!(cursor.is_at_end());
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.look_len(), 0);

        // Advancing past the end stays at the sentinel.
        cursor.advance();
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn offsets_are_byte_based() {
        let mut cursor = Cursor::from_str("é+");
        assert_eq!(cursor.look_len(), 2);
        cursor.advance();
        assert_eq!(cursor.peek(), Some('+'));
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn empty_source_starts_at_end() {
        let cursor = Cursor::from_str("");
        assert!(cursor.is_at_end());
    }
}
