//! Morse code table

use std::fmt;

/// Keyed element of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Dot,
    Dash,
}

/// Code sent for characters outside the table (the "?" pattern)
pub const UNKNOWN_CODE: Code = Code("..--..");

const LETTERS: [&str; 26] = [
    ".-", "-...", "-.-.", "-..", ".", "..-.", "--.", "....", "..", ".---",
    "-.-", ".-..", "--", "-.", "---", ".--.", "--.-", ".-.", "...", "-",
    "..-", "...-", ".--", "-..-", "-.--", "--..",
];

const DIGITS: [&str; 10] = [
    "-----", ".----", "..---", "...--", "....-",
    ".....", "-....", "--...", "---..", "----.",
];

/// Dot/dash pattern of one character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code(&'static str);

impl Code {
    /// Pattern written with '.' and '-'
    pub fn pattern(&self) -> &'static str {
        self.0
    }

    /// Symbols in keying order
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.bytes().map(|b| if b == b'.' { Symbol::Dot } else { Symbol::Dash })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Look up a character, `None` if it is not in the table
pub fn lookup(ch: char) -> Option<Code> {
    let c = ch.to_ascii_uppercase();
    match c {
        'A'..='Z' => Some(Code(LETTERS[(c as u8 - b'A') as usize])),
        '0'..='9' => Some(Code(DIGITS[(c as u8 - b'0') as usize])),
        '/' => Some(Code("-..-.")),
        // AR, end of message
        '+' => Some(Code(".-.-.")),
        _ => None,
    }
}

/// Code for a character, falling back to [`UNKNOWN_CODE`]
pub fn code_for(ch: char) -> Code {
    lookup(ch).unwrap_or(UNKNOWN_CODE)
}

/// Render text as dot/dash patterns separated by spaces
pub fn to_pattern_string(text: &str) -> String {
    text.chars()
        .map(|c| code_for(c).pattern())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_letters_and_digits() {
        assert_eq!(code_for('A').pattern(), ".-");
        assert_eq!(code_for('q').pattern(), "--.-");
        assert_eq!(code_for('Z').pattern(), "--..");
        assert_eq!(code_for('0').pattern(), "-----");
        assert_eq!(code_for('7').pattern(), "--...");
        assert_eq!(code_for('9').pattern(), "----.");
    }

    #[test]
    fn test_punctuation_and_prosign() {
        assert_eq!(code_for('/').pattern(), "-..-.");
        assert_eq!(code_for('+').pattern(), ".-.-.");
    }

    #[test]
    fn test_unknown_falls_back() {
        assert_eq!(lookup(' '), None);
        assert_eq!(code_for(' '), UNKNOWN_CODE);
        assert_eq!(code_for('?'), UNKNOWN_CODE);
        assert_eq!(code_for('ä'), UNKNOWN_CODE);
    }

    #[test]
    fn test_symbols() {
        let syms: Vec<Symbol> = code_for('K').symbols().collect();
        assert_eq!(syms, vec![Symbol::Dash, Symbol::Dot, Symbol::Dash]);
    }

    #[test]
    fn test_pattern_string() {
        assert_eq!(to_pattern_string("SOS"), "... --- ...");
        assert_eq!(to_pattern_string("73"), "--... ...--");
    }

    #[quickcheck]
    fn prop_every_char_has_a_code(c: char) -> bool {
        let code = code_for(c);
        !code.is_empty() && code.pattern().bytes().all(|b| b == b'.' || b == b'-')
    }

    #[quickcheck]
    fn prop_case_insensitive(c: char) -> bool {
        !c.is_ascii_alphabetic() || code_for(c.to_ascii_lowercase()) == code_for(c.to_ascii_uppercase())
    }
}
