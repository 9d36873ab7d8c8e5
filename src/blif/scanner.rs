use std::fmt;

use crate::scanner::{Scanner, Token};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlifToken {
    Nl,
    Str,
    Eq,
    Eof,
    /// Malformed input, e.g. an unterminated `/* */` comment.
    Error,
    Model,
    Inputs,
    Outputs,
    Clock,
    End,
    Names,
    Exdc,
    Latch,
    Gate,
    Mlatch,
    Subckt,
    Search,
    StartKiss,
    I,
    O,
    P,
    R,
    EndKiss,
    LatchOrder,
    Code,
    Cycle,
    ClockEvent,
    Area,
    Delay,
    WireLoadSlope,
    Wire,
    InputArrival,
    DefaultInputArrival,
    OutputRequired,
    DefaultOutputRequired,
    InputDrive,
    DefaultInputDrive,
    OutputLoad,
    DefaultOutputLoad,
}

impl BlifToken {
    /// Looks up a dot-keyword.
    pub fn keyword(word: &str) -> Option<BlifToken> {
        use BlifToken::*;
        let tok = match word {
            ".model" => Model,
            ".inputs" => Inputs,
            ".outputs" => Outputs,
            ".clock" => Clock,
            ".end" => End,
            ".names" => Names,
            ".exdc" => Exdc,
            ".latch" => Latch,
            ".gate" => Gate,
            ".mlatch" => Mlatch,
            ".subckt" => Subckt,
            ".search" => Search,
            ".start_kiss" => StartKiss,
            ".i" => I,
            ".o" => O,
            ".p" => P,
            ".r" => R,
            ".end_kiss" => EndKiss,
            ".latch_order" => LatchOrder,
            ".code" => Code,
            ".cycle" => Cycle,
            ".clock_event" => ClockEvent,
            ".area" => Area,
            ".delay" => Delay,
            ".wire_load_slope" => WireLoadSlope,
            ".wire" => Wire,
            ".input_arrival" => InputArrival,
            ".default_input_arrival" => DefaultInputArrival,
            ".output_required" => OutputRequired,
            ".default_output_required" => DefaultOutputRequired,
            ".input_drive" => InputDrive,
            ".default_input_drive" => DefaultInputDrive,
            ".output_load" => OutputLoad,
            ".default_output_load" => DefaultOutputLoad,
            _ => return None,
        };
        Some(tok)
    }

    /// Statements that are recognized but carry nothing the network keeps.
    pub fn is_annotation(self) -> bool {
        use BlifToken::*;
        matches!(
            self,
            Clock
                | Mlatch
                | Subckt
                | Search
                | StartKiss
                | I
                | O
                | P
                | R
                | EndKiss
                | LatchOrder
                | Code
                | Cycle
                | ClockEvent
                | Area
                | Delay
                | WireLoadSlope
                | Wire
                | InputArrival
                | DefaultInputArrival
                | OutputRequired
                | DefaultOutputRequired
                | InputDrive
                | DefaultInputDrive
                | OutputLoad
                | DefaultOutputLoad
        )
    }
}

impl fmt::Display for BlifToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlifToken::Nl => write!(f, "newline"),
            BlifToken::Str => write!(f, "string"),
            BlifToken::Eq => write!(f, "'='"),
            BlifToken::Eof => write!(f, "end of file"),
            BlifToken::Error => write!(f, "invalid token"),
            kw => write!(f, "keyword {:?}", kw),
        }
    }
}

pub struct BlifScanner {
    scanner: Scanner,
}

impl BlifScanner {
    pub fn new(text: &str) -> Self {
        Self {
            scanner: Scanner::new(text),
        }
    }

    fn is_delimiter(c: char) -> bool {
        matches!(c, ' ' | '\t' | '\r' | '\n' | '=' | '#' | '\\')
    }

    pub fn read_token(&mut self) -> Token<BlifToken> {
        loop {
            self.scanner.set_first_loc();
            let c = match self.scanner.get() {
                None => return Token::new(BlifToken::Eof, self.scanner.cur_span()),
                Some(c) => c,
            };
            match c {
                ' ' | '\t' | '\r' => continue,
                '\n' => return Token::new(BlifToken::Nl, self.scanner.cur_span()),
                '=' => return Token::new(BlifToken::Eq, self.scanner.cur_span()),
                '#' => {
                    self.scanner.skip_to_eol();
                    if self.scanner.accept('\n') {
                        return Token::new(BlifToken::Nl, self.scanner.cur_span());
                    }
                    continue;
                }
                '/' if self.scanner.peek() == Some('*') => {
                    self.scanner.get();
                    if !self.scanner.skip_block_comment() {
                        return Token::new(BlifToken::Error, self.scanner.cur_span());
                    }
                    continue;
                }
                '\\' => match self.scanner.peek() {
                    Some('\n') => {
                        self.scanner.get();
                        continue;
                    }
                    Some('\r') if self.scanner.peek_nth(1) == Some('\n') => {
                        self.scanner.get();
                        self.scanner.get();
                        continue;
                    }
                    Some(_) => {
                        let mut text = String::new();
                        if let Some(c) = self.scanner.get() {
                            text.push(c);
                        }
                        return self.read_string(text, true);
                    }
                    None => return Token::new(BlifToken::Eof, self.scanner.cur_span()),
                },
                c => {
                    let mut text = String::new();
                    text.push(c);
                    return self.read_string(text, false);
                }
            }
        }
    }

    /// Reads the rest of a string. An escaped first character keeps the
    /// word from being taken as a keyword.
    fn read_string(&mut self, mut text: String, escaped: bool) -> Token<BlifToken> {
        while let Some(c) = self.scanner.peek() {
            if c == '\\' {
                // An escaped character continues the string; a line
                // continuation ends it.
                match self.scanner.peek_nth(1) {
                    Some('\n') | Some('\r') | None => break,
                    Some(next) => {
                        self.scanner.get();
                        self.scanner.get();
                        text.push(next);
                        continue;
                    }
                }
            }
            if Self::is_delimiter(c) {
                break;
            }
            self.scanner.get();
            text.push(c);
        }
        let span = self.scanner.cur_span();
        if !escaped && text.starts_with('.') {
            if let Some(kw) = BlifToken::keyword(&text) {
                return Token::new(kw, span);
            }
        }
        Token::with_text(BlifToken::Str, span, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn kinds(text: &str) -> Vec<BlifToken> {
        let mut s = BlifScanner::new(text);
        let mut v = Vec::new();
        loop {
            let t = s.read_token();
            v.push(t.kind);
            if t.kind == BlifToken::Eof {
                break;
            }
        }
        v
    }

    #[test]
    fn test_keywords_and_strings() {
        use BlifToken::*;
        assert_eq!(kinds(".model top\n.inputs a b\n"), vec![Model, Str, Nl, Inputs, Str, Str, Nl, Eof]);
        assert_eq!(kinds(".unknown x"), vec![Str, Str, Eof]);
        assert_eq!(kinds("A=n1"), vec![Str, Eq, Str, Eof]);
    }

    #[test]
    fn test_comments_and_continuation() {
        use BlifToken::*;
        assert_eq!(kinds("a # comment\nb"), vec![Str, Nl, Str, Eof]);
        assert_eq!(kinds("a /* x\ny */ b"), vec![Str, Str, Eof]);
        assert_eq!(kinds(".inputs a \\\n b\n"), vec![Inputs, Str, Str, Nl, Eof]);
        assert_eq!(kinds("a /* open"), vec![Str, Error, Eof]);
    }

    #[test]
    fn test_escape_and_text() {
        let mut s = BlifScanner::new("\\.end x\\=y");
        let t = s.read_token();
        assert_eq!(t.kind, BlifToken::Str);
        assert_eq!(t.text(), ".end");
        let t = s.read_token();
        assert_eq!(t.text(), "x=y");
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut s = BlifScanner::new("");
        assert_eq!(s.read_token().kind, BlifToken::Eof);
        assert_eq!(s.read_token().kind, BlifToken::Eof);
    }

    #[test]
    fn test_spans() {
        let mut s = BlifScanner::new(".names a\n11 1");
        let t = s.read_token();
        assert_eq!(t.span.to_string(), "1:1-6");
        s.read_token();
        s.read_token();
        let t = s.read_token();
        assert_eq!(t.span.to_string(), "2:1-2");
    }
}
