use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::scanner::{NetlistScanner, NetlistToken};
use crate::builder::NetBuilder;
use crate::error::{Diagnostic, DiagnosticKind, Error};
use crate::location::Span;
use crate::network::BnNetwork;
use crate::prim::PrimType;
use crate::scanner::Token;
use crate::symbol::SymbolTable;

/// Reader for the structural netlist subset.
///
/// A syntax error skips to the next `;` and parsing goes on, so a single
/// `read` reports every error in the file. The network is returned only if
/// none was found.
#[derive(Debug, Default)]
pub struct NetlistParser {
    diagnostics: Vec<Diagnostic>,
}

impl NetlistParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics raised by the last `read`, warnings included.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn read(&mut self, path: impl AsRef<Path>) -> Result<BnNetwork, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        self.read_str(&text, &path.display().to_string())
    }

    pub fn read_str(&mut self, text: &str, source: &str) -> Result<BnNetwork, Error> {
        log::debug!("reading netlist from '{}'", source);
        let mut network = BnNetwork::new();
        let result = {
            let mut reader = Reader {
                builder: NetBuilder::new(&mut network),
                scanner: NetlistScanner::new(text),
                source,
                symbols: SymbolTable::new(),
                diags: Vec::new(),
                ungot: None,
                has_error: false,
                ports: Vec::new(),
                outputs: Vec::new(),
                needed: HashSet::new(),
                consts: [None, None],
            };
            let result = reader.run();
            self.diagnostics = reader.diags;
            result
        };
        match result {
            Ok(()) => {
                log::debug!("read '{}': {} node(s)", source, network.node_num());
                Ok(network)
            }
            Err(Abort::Parse) => {
                let errors = self.diagnostics.iter().filter(|d| d.is_error()).cloned().collect();
                Err(Error::Parse(errors))
            }
            Err(Abort::Build(e)) => {
                log::error!("{}: {}", source, e);
                Err(e)
            }
        }
    }
}

enum Abort {
    /// At least one error diagnostic has been recorded.
    Parse,
    Build(Error),
}

struct Reader<'a, 'n> {
    builder: NetBuilder<'n>,
    scanner: NetlistScanner,
    source: &'a str,
    symbols: SymbolTable,
    diags: Vec<Diagnostic>,
    ungot: Option<Token<NetlistToken>>,
    has_error: bool,
    /// Names listed in the module header.
    ports: Vec<(usize, Span)>,
    outputs: Vec<usize>,
    /// Symbols that must be driven: gate inputs and outputs.
    needed: HashSet<usize>,
    /// Shared `1'b0` / `1'b1` symbols, created on first use.
    consts: [Option<usize>; 2],
}

impl Reader<'_, '_> {
    fn run(&mut self) -> Result<(), Abort> {
        if self.read_header().is_err() {
            self.has_error = true;
        }
        loop {
            let tok = self.next();
            let result = match tok.kind {
                NetlistToken::EndModule => break,
                NetlistToken::Eof => {
                    self.error(DiagnosticKind::Syntax, tok.span, "SYN05", "Unexpected EOF. 'endmodule' is expected.".to_string());
                    return Err(Abort::Parse);
                }
                NetlistToken::Input => self.read_inputs(),
                NetlistToken::Output => self.read_outputs(),
                NetlistToken::Wire => self.read_name_list(NetlistToken::Semi).map(|names| {
                    for t in names {
                        self.symbols.find_or_create(t.text(), t.span);
                    }
                }),
                NetlistToken::Gate(prim) => self.read_gate(prim, tok.span),
                _ => {
                    self.unget(tok.clone());
                    Err(self.syntax_error(&tok, "SYN04", "Syntax error: statement keyword is expected."))
                }
            };
            if result.is_err() {
                self.has_error = true;
            }
        }
        let tok = self.next();
        if tok.kind != NetlistToken::Eof {
            self.warning(tok.span, "SYN06", "Statement after 'endmodule' is ignored.".to_string());
        }

        self.check_names();
        if self.has_error {
            return Err(Abort::Parse);
        }

        for id in std::mem::take(&mut self.outputs) {
            let name = self.symbols.name(id).to_string();
            let node = self.builder.network().new_output(&name);
            self.builder.add_fanins(node, vec![id]);
        }
        let symbols = &self.symbols;
        self.builder
            .finish(|id| symbols.name(id).to_string())
            .map_err(Abort::Build)
    }

    /// Reports header ports without a direction and undriven names.
    fn check_names(&mut self) {
        for (id, span) in std::mem::take(&mut self.ports) {
            if !self.symbols.is_input(id) && !self.symbols.is_output(id) {
                let message = format!("{}: Port direction is not declared.", self.symbols.name(id));
                self.error(DiagnosticKind::Semantic, span, "PORT01", message);
            }
        }
        let undefined: Vec<(Span, String)> = self
            .symbols
            .iter()
            .filter(|(id, sym)| sym.def_span().is_none() && self.needed.contains(id))
            .map(|(_, sym)| (sym.ref_span(), format!("{}: Undefined.", sym.name())))
            .collect();
        for (span, message) in undefined {
            self.error(DiagnosticKind::Semantic, span, "UNDEF01", message);
        }
    }

    fn next(&mut self) -> Token<NetlistToken> {
        let tok = match self.ungot.take() {
            Some(tok) => tok,
            None => self.scanner.read_token(),
        };
        if tok.kind == NetlistToken::Error {
            self.error(DiagnosticKind::Lexical, tok.span, "LEX01", "Illegal character or unterminated comment.".to_string());
        }
        tok
    }

    fn unget(&mut self, tok: Token<NetlistToken>) {
        self.ungot = Some(tok);
    }

    fn error(&mut self, kind: DiagnosticKind, span: Span, label: &'static str, message: String) -> Abort {
        let d = Diagnostic::error(kind, self.source, Some(span), label, message);
        d.log();
        self.diags.push(d);
        self.has_error = true;
        Abort::Parse
    }

    fn warning(&mut self, span: Span, label: &'static str, message: String) {
        let d = Diagnostic::warning(DiagnosticKind::Semantic, self.source, Some(span), label, message);
        d.log();
        self.diags.push(d);
    }

    /// Records a syntax error at `tok` and skips past the next `;`.
    ///
    /// `tok` must have been pushed back, so a `;` that caused the error is
    /// the one consumed. Skipping stops before `endmodule`.
    fn syntax_error(&mut self, tok: &Token<NetlistToken>, label: &'static str, message: &str) -> Abort {
        // lexical errors are reported by `next`
        if tok.kind != NetlistToken::Error {
            self.error(DiagnosticKind::Syntax, tok.span, label, message.to_string());
        }
        loop {
            let t = match self.ungot.take() {
                Some(t) => t,
                None => self.scanner.read_token(),
            };
            match t.kind {
                NetlistToken::Semi => break,
                NetlistToken::EndModule | NetlistToken::Eof => {
                    self.unget(t);
                    break;
                }
                _ => {}
            }
        }
        Abort::Parse
    }

    fn expect(&mut self, kind: NetlistToken) -> Result<Token<NetlistToken>, Abort> {
        let tok = self.next();
        if tok.kind == kind {
            return Ok(tok);
        }
        self.unget(tok.clone());
        let message = format!("Syntax error: '{}' is expected.", kind);
        Err(self.syntax_error(&tok, "SYN01", &message))
    }

    /// Reads `name {, name} end`. Constants are accepted as names.
    fn read_name_list(&mut self, end: NetlistToken) -> Result<Vec<Token<NetlistToken>>, Abort> {
        let mut names = Vec::new();
        loop {
            let tok = self.next();
            if !matches!(tok.kind, NetlistToken::Name | NetlistToken::Const(_)) {
                self.unget(tok.clone());
                return Err(self.syntax_error(&tok, "SYN01", "Syntax error: '__name__' is expected."));
            }
            names.push(tok);
            let tok = self.next();
            if tok.kind == end {
                return Ok(names);
            }
            if tok.kind != NetlistToken::Comma {
                self.unget(tok.clone());
                let message = format!("Syntax error: '{}' or ',' are expected.", end);
                return Err(self.syntax_error(&tok, "SYN03", &message));
            }
        }
    }

    fn reject_consts(&mut self, names: &[Token<NetlistToken>]) -> Result<(), Abort> {
        match names.iter().find(|t| t.kind != NetlistToken::Name) {
            Some(t) => {
                let message = format!("{}: Constant is not allowed here.", t.kind);
                Err(self.error(DiagnosticKind::Semantic, t.span, "CONST01", message))
            }
            None => Ok(()),
        }
    }

    fn read_header(&mut self) -> Result<(), Abort> {
        self.expect(NetlistToken::Module)?;
        let name = self.expect(NetlistToken::Name)?;
        self.builder.network().set_name(name.text());
        self.expect(NetlistToken::LPar)?;
        let tok = self.next();
        if tok.kind != NetlistToken::RPar {
            self.unget(tok);
            let names = self.read_name_list(NetlistToken::RPar)?;
            self.reject_consts(&names)?;
            for t in names {
                let id = self.symbols.find_or_create(t.text(), t.span);
                self.ports.push((id, t.span));
            }
        }
        self.expect(NetlistToken::Semi)?;
        Ok(())
    }

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

    fn read_inputs(&mut self) -> Result<(), Abort> {
        let names = self.read_name_list(NetlistToken::Semi)?;
        self.reject_consts(&names)?;
        let mut result = Ok(());
        for t in names {
            let id = self.symbols.find_or_create(t.text(), t.span);
            if let Err(e) = self.define(id, t.span) {
                result = Err(e);
                continue;
            }
            self.symbols.set_input(id);
            if self.symbols.is_output(id) {
                self.warning(t.span, "MLTDEF02", format!("{}: Defined as both input and output.", t.text()));
            }
            self.builder.new_input(id, t.text());
        }
        result
    }

    fn read_outputs(&mut self) -> Result<(), Abort> {
        let names = self.read_name_list(NetlistToken::Semi)?;
        self.reject_consts(&names)?;
        let mut result = Ok(());
        for t in names {
            let id = self.symbols.find_or_create(t.text(), t.span);
            if self.symbols.is_output(id) {
                let message = format!("{}: Appears more than once as output.", t.text());
                result = Err(self.error(DiagnosticKind::Semantic, t.span, "MLTDEF03", message));
                continue;
            }
            self.symbols.set_output(id);
            if self.symbols.is_input(id) {
                self.warning(t.span, "MLTDEF02", format!("{}: Defined as both input and output.", t.text()));
            }
            self.needed.insert(id);
            self.outputs.push(id);
        }
        result
    }

    /// `prim [instance] ( out, in {, in} ) ;`
    fn read_gate(&mut self, prim: PrimType, first: Span) -> Result<(), Abort> {
        let mut tok = self.next();
        if tok.kind == NetlistToken::Name {
            // instance name, not part of the network
            tok = self.next();
        }
        if tok.kind != NetlistToken::LPar {
            self.unget(tok.clone());
            return Err(self.syntax_error(&tok, "SYN01", "Syntax error: '(' is expected."));
        }
        let terms = self.read_name_list(NetlistToken::RPar)?;
        let semi = self.expect(NetlistToken::Semi)?;
        let span = first.to(semi.span);

        let (out, ins) = (&terms[0], &terms[1..]);
        if out.kind != NetlistToken::Name {
            let message = format!("{}: Constant is not allowed here.", out.kind);
            return Err(self.error(DiagnosticKind::Semantic, out.span, "CONST01", message));
        }
        let name = out.text().to_string();
        if !prim.accepts_arity(ins.len()) {
            let message = format!("{}: Wrong # of inputs for '{}'.", name, NetlistToken::Gate(prim));
            return Err(self.error(DiagnosticKind::Semantic, span, "ARITY01", message));
        }
        let id = self.symbols.find_or_create(&name, out.span);
        self.define(id, out.span)?;

        let fanins: Vec<usize> = ins.iter().map(|t| self.operand(t)).collect();
        let node = self.builder.network().new_primitive(&name, fanins.len(), prim);
        self.builder.define(id, node);
        self.builder.add_fanins(node, fanins);
        Ok(())
    }

    /// Symbol for a gate input, creating the constant node on first use.
    fn operand(&mut self, tok: &Token<NetlistToken>) -> usize {
        let value = match tok.kind {
            NetlistToken::Const(value) => value,
            _ => {
                let id = self.symbols.find_or_create(tok.text(), tok.span);
                self.needed.insert(id);
                return id;
            }
        };
        if let Some(id) = self.consts[value as usize] {
            return id;
        }
        let text = NetlistToken::Const(value).to_string();
        let id = self.symbols.find_or_create(&text, tok.span);
        self.symbols.set_defined(id, tok.span);
        let prim = if value { PrimType::C1 } else { PrimType::C0 };
        let node = self.builder.network().new_primitive("", 0, prim);
        self.builder.define(id, node);
        self.consts[value as usize] = Some(id);
        id
    }
}
