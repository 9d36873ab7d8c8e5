use crate::prim::PrimType;
use crate::scanner::{Scanner, Token};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Iscas89Token {
    LPar,
    RPar,
    Eq,
    Comma,
    Input,
    Output,
    /// A built-in gate keyword (`AND`, `NOT`, `CONST0`, ...).
    Gate(PrimType),
    Dff,
    Mux,
    Name,
    Eof,
}

impl Iscas89Token {
    pub fn keyword(word: &str) -> Option<Iscas89Token> {
        let tok = match word {
            "INPUT" => Iscas89Token::Input,
            "OUTPUT" => Iscas89Token::Output,
            "CONST0" => Iscas89Token::Gate(PrimType::C0),
            "CONST1" => Iscas89Token::Gate(PrimType::C1),
            "BUFF" | "BUF" => Iscas89Token::Gate(PrimType::Buff),
            "NOT" | "INV" => Iscas89Token::Gate(PrimType::Not),
            "AND" => Iscas89Token::Gate(PrimType::And),
            "NAND" => Iscas89Token::Gate(PrimType::Nand),
            "OR" => Iscas89Token::Gate(PrimType::Or),
            "NOR" => Iscas89Token::Gate(PrimType::Nor),
            "XOR" => Iscas89Token::Gate(PrimType::Xor),
            "XNOR" => Iscas89Token::Gate(PrimType::Xnor),
            "DFF" => Iscas89Token::Dff,
            "MUX" => Iscas89Token::Mux,
            _ => return None,
        };
        Some(tok)
    }

    /// Text used in "expected ..." messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Iscas89Token::LPar => "(",
            Iscas89Token::RPar => ")",
            Iscas89Token::Eq => "=",
            Iscas89Token::Comma => ",",
            Iscas89Token::Input => "INPUT",
            Iscas89Token::Output => "OUTPUT",
            Iscas89Token::Gate(prim) => prim.bench_name(),
            Iscas89Token::Dff => "DFF",
            Iscas89Token::Mux => "MUX",
            Iscas89Token::Name => "__name__",
            Iscas89Token::Eof => "__eof__",
        }
    }
}

pub struct Iscas89Scanner {
    scanner: Scanner,
}

impl Iscas89Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            scanner: Scanner::new(text),
        }
    }

    pub fn read_token(&mut self) -> Token<Iscas89Token> {
        loop {
            self.scanner.set_first_loc();
            let c = match self.scanner.get() {
                None => return Token::new(Iscas89Token::Eof, self.scanner.cur_span()),
                Some(c) => c,
            };
            let kind = match c {
                ' ' | '\t' | '\r' | '\n' => continue,
                '#' => {
                    self.scanner.skip_to_eol();
                    continue;
                }
                '(' => Iscas89Token::LPar,
                ')' => Iscas89Token::RPar,
                '=' => Iscas89Token::Eq,
                ',' => Iscas89Token::Comma,
                c => return self.read_name(c),
            };
            return Token::new(kind, self.scanner.cur_span());
        }
    }

    fn read_name(&mut self, first: char) -> Token<Iscas89Token> {
        let mut text = String::new();
        text.push(first);
        while let Some(c) = self.scanner.peek() {
            if matches!(c, ' ' | '\t' | '\r' | '\n' | '#' | '=' | '(' | ')' | ',') {
                break;
            }
            self.scanner.get();
            text.push(c);
        }
        let span = self.scanner.cur_span();
        match Iscas89Token::keyword(&text) {
            Some(kw) => Token::new(kw, span),
            None => Token::with_text(Iscas89Token::Name, span, text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn kinds(text: &str) -> Vec<Iscas89Token> {
        let mut s = Iscas89Scanner::new(text);
        let mut v = Vec::new();
        loop {
            let t = s.read_token();
            v.push(t.kind);
            if t.kind == Iscas89Token::Eof {
                break;
            }
        }
        v
    }

    #[test]
    fn test_statement() {
        use Iscas89Token::*;
        assert_eq!(
            kinds("# header\nG10 = NAND(G1,G3)\n"),
            vec![Name, Eq, Gate(PrimType::Nand), LPar, Name, Comma, Name, RPar, Eof]
        );
        assert_eq!(kinds("INPUT(a) # trailing"), vec![Input, LPar, Name, RPar, Eof]);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Iscas89Token::keyword("INV"), Some(Iscas89Token::Gate(PrimType::Not)));
        assert_eq!(Iscas89Token::keyword("BUF"), Some(Iscas89Token::Gate(PrimType::Buff)));
        assert_eq!(Iscas89Token::keyword("and"), None);
    }

    #[test]
    fn test_name_text() {
        let mut s = Iscas89Scanner::new("  n[3].q=");
        let t = s.read_token();
        assert_eq!(t.text(), "n[3].q");
        assert_eq!(t.span.to_string(), "1:3-8");
        assert_eq!(s.read_token().kind, Iscas89Token::Eq);
    }
}
