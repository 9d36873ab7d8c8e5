use std::fs;
use std::path::Path;

use super::scanner::{Iscas89Scanner, Iscas89Token};
use super::Iscas89Handler;
use crate::error::{Diagnostic, DiagnosticKind, Error};
use crate::location::Span;
use crate::prim::PrimType;
use crate::scanner::Token;
use crate::symbol::SymbolTable;

/// Statement-level `.bench` reader with error recovery.
#[derive(Default)]
pub struct Iscas89Parser<'h> {
    handlers: Vec<&'h mut dyn Iscas89Handler>,
    diagnostics: Vec<Diagnostic>,
}

impl<'h> Iscas89Parser<'h> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: &'h mut dyn Iscas89Handler) {
        self.handlers.push(handler);
    }

    /// Diagnostics raised by the last `read`, warnings included.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn read(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        self.read_str(&text, &path.display().to_string())
    }

    pub fn read_str(&mut self, text: &str, source: &str) -> Result<(), Error> {
        log::debug!("reading ISCAS89 from '{}'", source);
        self.diagnostics.clear();

        let mut reader = Reader {
            handlers: &mut self.handlers,
            scanner: Iscas89Scanner::new(text),
            source,
            symbols: SymbolTable::new(),
            diags: Vec::new(),
            outputs: Vec::new(),
            ungot: None,
        };
        let result = reader.run();
        if result.is_err() {
            for h in reader.handlers.iter_mut() {
                h.error_exit();
            }
        }
        let symbol_num = reader.symbols.len();
        self.diagnostics = reader.diags;

        match result {
            Ok(()) => {
                log::debug!("read '{}': {} symbol(s)", source, symbol_num);
                Ok(())
            }
            Err(Abort::Parse) => {
                let errors = self.diagnostics.iter().filter(|d| d.is_error()).cloned().collect();
                Err(Error::Parse(errors))
            }
            Err(Abort::Handler(e)) => {
                log::error!("{}: {}", source, e);
                Err(e)
            }
        }
    }
}

enum Abort {
    /// A diagnostic has been recorded.
    Parse,
    Handler(Error),
}

struct Reader<'a, 'h> {
    handlers: &'a mut Vec<&'h mut dyn Iscas89Handler>,
    scanner: Iscas89Scanner,
    source: &'a str,
    symbols: SymbolTable,
    diags: Vec<Diagnostic>,
    outputs: Vec<(usize, Span)>,
    ungot: Option<Token<Iscas89Token>>,
}

impl Reader<'_, '_> {
    fn run(&mut self) -> Result<(), Abort> {
        self.call(|h| h.init())?;
        let mut has_error = false;
        loop {
            let tok = self.next();
            let result = match tok.kind {
                Iscas89Token::Eof => break,
                Iscas89Token::Input | Iscas89Token::Output => self.read_port(tok),
                Iscas89Token::Name => self.read_gate(tok),
                _ => {
                    self.unget(tok.clone());
                    Err(self.syntax_error(&tok, "SYN04", "Syntax error: 'INPUT', 'OUTPUT' or a signal name is expected."))
                }
            };
            match result {
                Ok(()) => {}
                Err(Abort::Parse) => has_error = true,
                Err(abort) => return Err(abort),
            }
        }

        for (_, sym) in self.symbols.iter() {
            if sym.def_span().is_none() {
                let d = Diagnostic::error(
                    DiagnosticKind::Semantic,
                    self.source,
                    Some(sym.ref_span()),
                    "UNDEF01",
                    format!("{}: Undefined.", sym.name()),
                );
                d.log();
                self.diags.push(d);
                has_error = true;
            }
        }
        if has_error {
            return Err(Abort::Parse);
        }

        let outputs = std::mem::take(&mut self.outputs);
        for (id, span) in outputs {
            let name = self.symbols.name(id).to_string();
            self.call(|h| h.read_output(span, id, &name))?;
        }
        self.call(|h| h.end())?;
        for h in self.handlers.iter_mut() {
            h.normal_exit();
        }
        Ok(())
    }

    /// Calls every handler, then fails if any of them did.
    fn call(&mut self, mut f: impl FnMut(&mut dyn Iscas89Handler) -> Result<(), Error>) -> Result<(), Abort> {
        let mut failure = None;
        for h in self.handlers.iter_mut() {
            if let Err(e) = f(&mut **h) {
                failure.get_or_insert(e);
            }
        }
        match failure {
            Some(e) => Err(Abort::Handler(e)),
            None => Ok(()),
        }
    }

    fn next(&mut self) -> Token<Iscas89Token> {
        match self.ungot.take() {
            Some(tok) => tok,
            None => self.scanner.read_token(),
        }
    }

    fn unget(&mut self, tok: Token<Iscas89Token>) {
        self.ungot = Some(tok);
    }

    fn error(&mut self, kind: DiagnosticKind, span: Span, label: &'static str, message: String) -> Abort {
        let d = Diagnostic::error(kind, self.source, Some(span), label, message);
        d.log();
        self.diags.push(d);
        Abort::Parse
    }

    /// Records a syntax error at `tok` and skips past the next `)`.
    ///
    /// `tok` must have been pushed back, so a `)` that caused the error is
    /// the one consumed.
    fn syntax_error(&mut self, tok: &Token<Iscas89Token>, label: &'static str, message: &str) -> Abort {
        let abort = self.error(DiagnosticKind::Syntax, tok.span, label, message.to_string());
        loop {
            let tok = self.next();
            match tok.kind {
                Iscas89Token::RPar => break,
                Iscas89Token::Eof => {
                    self.unget(tok);
                    break;
                }
                _ => {}
            }
        }
        abort
    }

    fn warning(&mut self, span: Span, label: &'static str, message: String) {
        let d = Diagnostic::warning(DiagnosticKind::Semantic, self.source, Some(span), label, message);
        d.log();
        self.diags.push(d);
    }

    fn expect(&mut self, kind: Iscas89Token) -> Result<Token<Iscas89Token>, Abort> {
        let tok = self.next();
        if tok.kind == kind {
            return Ok(tok);
        }
        self.unget(tok.clone());
        let message = format!("Syntax error: '{}' is expected.", kind.as_str());
        Err(self.syntax_error(&tok, "SYN01", &message))
    }

    /// Marks `id` defined at `span`, failing if it already was.
    fn define(&mut self, id: usize, span: Span) -> Result<(), Abort> {
        if let Some(previous) = self.symbols.symbol(id).def_span() {
            let message = format!(
                "{}: Defined more than once. Previous definition is at {}.",
                self.symbols.name(id),
                previous
            );
            return Err(self.error(DiagnosticKind::Semantic, span, "MLTDEF01", message));
        }
        self.symbols.set_defined(id, span);
        Ok(())
    }

    fn read_port(&mut self, kw: Token<Iscas89Token>) -> Result<(), Abort> {
        self.expect(Iscas89Token::LPar)?;
        let name_tok = self.expect(Iscas89Token::Name)?;
        let rpar = self.expect(Iscas89Token::RPar)?;
        let span = kw.span.to(rpar.span);
        let name = name_tok.text().to_string();
        let id = self.symbols.find_or_create(&name, name_tok.span);

        if kw.kind == Iscas89Token::Input {
            self.define(id, name_tok.span)?;
            self.symbols.set_input(id);
            if self.symbols.is_output(id) {
                self.warning(name_tok.span, "MLTDEF02", format!("{}: Defined as both input and output.", name));
            }
            self.call(|h| h.read_input(span, id, &name))
        } else {
            if self.symbols.is_output(id) {
                let message = format!("{}: Appears more than once as output.", name);
                return Err(self.error(DiagnosticKind::Semantic, name_tok.span, "MLTDEF03", message));
            }
            self.symbols.set_output(id);
            if self.symbols.is_input(id) {
                self.warning(name_tok.span, "MLTDEF02", format!("{}: Defined as both input and output.", name));
            }
            self.outputs.push((id, span));
            Ok(())
        }
    }

    /// `(` already consumed; reads names up to the closing `)`.
    fn read_fanin_list(&mut self) -> Result<(Vec<Token<Iscas89Token>>, Span), Abort> {
        let mut names = Vec::new();
        let first = self.next();
        if first.kind == Iscas89Token::RPar {
            return Ok((names, first.span));
        }
        if first.kind != Iscas89Token::Name {
            self.unget(first.clone());
            return Err(self.syntax_error(&first, "SYN01", "Syntax error: '__name__' is expected."));
        }
        names.push(first);
        loop {
            let tok = self.next();
            match tok.kind {
                Iscas89Token::RPar => return Ok((names, tok.span)),
                Iscas89Token::Comma => names.push(self.expect(Iscas89Token::Name)?),
                _ => {
                    self.unget(tok.clone());
                    return Err(self.syntax_error(&tok, "SYN03", "Syntax error: ')' or ',' are expected."));
                }
            }
        }
    }

    fn read_gate(&mut self, name_tok: Token<Iscas89Token>) -> Result<(), Abort> {
        self.expect(Iscas89Token::Eq)?;
        let type_tok = self.next();
        if !matches!(
            type_tok.kind,
            Iscas89Token::Gate(_) | Iscas89Token::Dff | Iscas89Token::Mux
        ) {
            self.unget(type_tok.clone());
            return Err(self.syntax_error(&type_tok, "SYN02", "Syntax error: gate-type is expected."));
        }
        self.expect(Iscas89Token::LPar)?;
        let (fanin_toks, end) = self.read_fanin_list()?;
        let span = name_tok.span.to(end);
        let name = name_tok.text().to_string();

        let id = self.symbols.find_or_create(&name, name_tok.span);
        self.define(id, name_tok.span)?;

        let arity_ok = match type_tok.kind {
            Iscas89Token::Gate(prim) => prim.accepts_arity(fanin_toks.len()),
            Iscas89Token::Dff => fanin_toks.len() == 1,
            _ => mux_select_num(fanin_toks.len()).is_some(),
        };
        if !arity_ok {
            let label = if type_tok.kind == Iscas89Token::Mux { "MUX01" } else { "ARITY01" };
            let message = format!("{}: Wrong # of inputs for {}-type.", name, type_tok.kind.as_str());
            return Err(self.error(DiagnosticKind::Semantic, span, label, message));
        }

        let fanins: Vec<usize> = fanin_toks
            .iter()
            .map(|t| self.symbols.find_or_create(t.text(), t.span))
            .collect();

        match type_tok.kind {
            Iscas89Token::Gate(prim) => self.call(|h| h.read_gate(span, id, &name, prim, &fanins)),
            Iscas89Token::Dff => self.call(|h| h.read_dff(span, id, &name, fanins[0])),
            _ => self.call(|h| h.read_mux(span, id, &name, &fanins)),
        }
    }
}

/// Number of select inputs `n` of a MUX with `n + 2^n` inputs.
pub(crate) fn mux_select_num(input_num: usize) -> Option<usize> {
    (0..usize::BITS as usize - 1)
        .map(|n| (n, n + (1 << n)))
        .take_while(|&(_, total)| total <= input_num)
        .find(|&(_, total)| total == input_num)
        .map(|(n, _)| n)
}
