//! Character classification for the lookahead.

/// True for ASCII letters in either case. The punctuation between `'Z'`
/// and `'a'` is not a letter.
pub fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// True for `'0'..='9'`.
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_accepts_both_cases_only() {
        assert!(is_alpha('a'));
        assert!(is_alpha('Z'));
        assert!(!is_alpha('_'));
        assert!(!is_alpha('['));
        assert!(!is_alpha('1'));
        assert!(!is_alpha('é'));
    }

    #[test]
    fn punctuation_between_the_cases_is_not_alpha() {
        for c in ['[', '\\', ']', '^', '_', '`'] {
            assert!(!is_alpha(c), "{c:?} is not a letter");
        }
    }

    #[test]
    fn digits() {
        assert!(('0'..='9').all(is_digit));
        assert!(!is_digit('a'));
        assert!(!is_digit('٣'));
    }
}
