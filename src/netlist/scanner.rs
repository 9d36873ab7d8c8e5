use std::fmt;

use crate::prim::PrimType;
use crate::scanner::{Scanner, Token};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NetlistToken {
    LPar,
    RPar,
    Comma,
    Semi,
    Module,
    EndModule,
    Input,
    Output,
    Wire,
    /// A gate primitive keyword (`buf`, `and`, ...).
    Gate(PrimType),
    /// `1'b0` or `1'b1`.
    Const(bool),
    Name,
    Eof,
    /// Unterminated block comment or a stray `/`.
    Error,
}

impl NetlistToken {
    pub fn keyword(word: &str) -> Option<NetlistToken> {
        let tok = match word {
            "module" => NetlistToken::Module,
            "endmodule" => NetlistToken::EndModule,
            "input" => NetlistToken::Input,
            "output" => NetlistToken::Output,
            "wire" => NetlistToken::Wire,
            "buf" => NetlistToken::Gate(PrimType::Buff),
            "not" => NetlistToken::Gate(PrimType::Not),
            "and" => NetlistToken::Gate(PrimType::And),
            "nand" => NetlistToken::Gate(PrimType::Nand),
            "or" => NetlistToken::Gate(PrimType::Or),
            "nor" => NetlistToken::Gate(PrimType::Nor),
            "xor" => NetlistToken::Gate(PrimType::Xor),
            "xnor" => NetlistToken::Gate(PrimType::Xnor),
            "1'b0" => NetlistToken::Const(false),
            "1'b1" => NetlistToken::Const(true),
            _ => return None,
        };
        Some(tok)
    }
}

impl fmt::Display for NetlistToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetlistToken::LPar => "(",
            NetlistToken::RPar => ")",
            NetlistToken::Comma => ",",
            NetlistToken::Semi => ";",
            NetlistToken::Module => "module",
            NetlistToken::EndModule => "endmodule",
            NetlistToken::Input => "input",
            NetlistToken::Output => "output",
            NetlistToken::Wire => "wire",
            NetlistToken::Gate(PrimType::Buff) => "buf",
            NetlistToken::Gate(prim) => return write!(f, "{}", prim.bench_name().to_lowercase()),
            NetlistToken::Const(false) => "1'b0",
            NetlistToken::Const(true) => "1'b1",
            NetlistToken::Name => "__name__",
            NetlistToken::Eof => "__eof__",
            NetlistToken::Error => "__error__",
        };
        write!(f, "{}", s)
    }
}

pub struct NetlistScanner {
    scanner: Scanner,
}

impl NetlistScanner {
    pub fn new(text: &str) -> Self {
        Self {
            scanner: Scanner::new(text),
        }
    }

    pub fn read_token(&mut self) -> Token<NetlistToken> {
        loop {
            self.scanner.set_first_loc();
            let c = match self.scanner.get() {
                None => return Token::new(NetlistToken::Eof, self.scanner.cur_span()),
                Some(c) => c,
            };
            let kind = match c {
                ' ' | '\t' | '\r' | '\n' => continue,
                '/' => {
                    if self.scanner.accept('/') {
                        self.scanner.skip_to_eol();
                        continue;
                    }
                    if self.scanner.accept('*') {
                        if self.scanner.skip_block_comment() {
                            continue;
                        }
                        return Token::new(NetlistToken::Error, self.scanner.cur_span());
                    }
                    NetlistToken::Error
                }
                '(' => NetlistToken::LPar,
                ')' => NetlistToken::RPar,
                ',' => NetlistToken::Comma,
                ';' => NetlistToken::Semi,
                c => return self.read_word(c),
            };
            return Token::new(kind, self.scanner.cur_span());
        }
    }

    fn read_word(&mut self, first: char) -> Token<NetlistToken> {
        let mut text = String::new();
        text.push(first);
        while let Some(c) = self.scanner.peek() {
            if matches!(c, ' ' | '\t' | '\r' | '\n' | '/' | '(' | ')' | ',' | ';') {
                break;
            }
            self.scanner.get();
            text.push(c);
        }
        let span = self.scanner.cur_span();
        match NetlistToken::keyword(&text) {
            Some(kw) => Token::new(kw, span),
            None => Token::with_text(NetlistToken::Name, span, text),
        }
    }
}
