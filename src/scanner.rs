//! Character-level input shared by the format lexers.
//!
//! [`Scanner`] owns the decoded text and tracks line/column positions;
//! each front end (`blif`, `iscas89`, `netlist`) wraps it with its own token
//! rules and keyword dictionary and produces [`Token`]s.

use crate::location::{Loc, Span};

/// A token produced by a format lexer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token<K> {
    pub kind: K,
    pub span: Span,
    /// Literal text for identifier-like tokens.
    pub text: Option<String>,
}

impl<K> Token<K> {
    pub fn new(kind: K, span: Span) -> Self {
        Self { kind, span, text: None }
    }

    pub fn with_text(kind: K, span: Span, text: String) -> Self {
        Self { kind, span, text: Some(text) }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    /// Location of the next unread character.
    next_loc: Loc,
    /// Location of the last consumed character.
    last_loc: Loc,
    /// Start of the current token.
    first_loc: Loc,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            next_loc: Loc::default(),
            last_loc: Loc::default(),
            first_loc: Loc::default(),
        }
    }

    /// Next character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Character `n` positions ahead of the next one.
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    /// Consumes and returns the next character.
    pub fn get(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        self.last_loc = self.next_loc;
        if c == '\n' {
            self.next_loc = Loc::new(self.next_loc.line + 1, 1);
        } else {
            self.next_loc.column += 1;
        }
        Some(c)
    }

    /// Consumes the next character if it equals `c`.
    pub fn accept(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.get();
            true
        } else {
            false
        }
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Marks the next character as the start of a token.
    pub fn set_first_loc(&mut self) {
        self.first_loc = self.next_loc;
    }

    /// Span from the marked token start to the last consumed character.
    pub fn cur_span(&self) -> Span {
        if self.last_loc < self.first_loc {
            Span::point(self.first_loc)
        } else {
            Span::new(self.first_loc, self.last_loc)
        }
    }

    /// Location of the next unread character.
    pub fn next_loc(&self) -> Loc {
        self.next_loc
    }

    /// Skips up to (not including) the next newline.
    pub fn skip_to_eol(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.get();
        }
    }

    /// Skips the body of a `/* ... */` comment whose opening has been consumed.
    ///
    /// Returns `false` if the input ends before the closing `*/`.
    pub fn skip_block_comment(&mut self) -> bool {
        loop {
            match self.get() {
                None => return false,
                Some('*') => {
                    if self.accept('/') {
                        return true;
                    }
                }
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_positions() {
        let mut s = Scanner::new("ab\ncd");
        s.set_first_loc();
        assert_eq!(s.get(), Some('a'));
        assert_eq!(s.get(), Some('b'));
        assert_eq!(s.cur_span(), Span::new(Loc::new(1, 1), Loc::new(1, 2)));
        assert_eq!(s.get(), Some('\n'));
        assert_eq!(s.next_loc(), Loc::new(2, 1));
        s.set_first_loc();
        assert!(s.accept('c'));
        assert!(!s.accept('x'));
        assert_eq!(s.peek(), Some('d'));
        assert_eq!(s.get(), Some('d'));
        assert!(s.is_eof());
        assert_eq!(s.get(), None);
        assert_eq!(s.get(), None);
    }

    #[test]
    fn test_block_comment() {
        let mut s = Scanner::new("/* x * y */z");
        assert!(s.accept('/'));
        assert!(s.accept('*'));
        assert!(s.skip_block_comment());
        assert_eq!(s.peek(), Some('z'));

        let mut s = Scanner::new("/* never closed");
        s.get();
        s.get();
        assert!(!s.skip_block_comment());
        assert!(s.is_eof());
    }

    #[test]
    fn test_empty_token_span() {
        let mut s = Scanner::new("");
        s.set_first_loc();
        assert_eq!(s.cur_span(), Span::point(Loc::new(1, 1)));
    }
}
