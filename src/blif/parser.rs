use std::fs;
use std::path::Path;

use super::scanner::{BlifScanner, BlifToken};
use super::BlifHandler;
use crate::cell::{CellLibrary, PinDirection};
use crate::cover::{CoverPool, SopPat};
use crate::error::{Diagnostic, DiagnosticKind, Error};
use crate::location::Span;
use crate::scanner::Token;
use crate::symbol::SymbolTable;

/// Statement-level BLIF reader.
///
/// Any syntax or semantic error aborts the whole `read`; warnings are logged
/// and kept in [`diagnostics`](Self::diagnostics).
#[derive(Default)]
pub struct BlifParser<'h> {
    handlers: Vec<&'h mut dyn BlifHandler>,
    diagnostics: Vec<Diagnostic>,
}

impl<'h> BlifParser<'h> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: &'h mut dyn BlifHandler) {
        self.handlers.push(handler);
    }

    /// Diagnostics raised by the last `read`, warnings included.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn read(&mut self, path: impl AsRef<Path>, library: Option<&CellLibrary>) -> Result<(), Error> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        self.read_str(&text, &path.display().to_string(), library)
    }

    pub fn read_str(&mut self, text: &str, source: &str, library: Option<&CellLibrary>) -> Result<(), Error> {
        log::debug!("reading BLIF from '{}'", source);
        self.diagnostics.clear();

        let mut reader = Reader {
            handlers: &mut self.handlers,
            scanner: BlifScanner::new(text),
            source,
            library,
            symbols: SymbolTable::new(),
            covers: CoverPool::new(),
            diags: Vec::new(),
            outputs: Vec::new(),
            ungot: None,
            end_span: Span::default(),
        };
        let result = reader.run();
        if result.is_err() {
            for h in reader.handlers.iter_mut() {
                h.error_exit();
            }
        }
        let (symbol_num, cover_num) = (reader.symbols.len(), reader.covers.len());
        self.diagnostics = reader.diags;

        match result {
            Ok(()) => {
                log::debug!("read '{}': {} symbol(s), {} cover(s)", source, symbol_num, cover_num);
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

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum State {
    Init,
    Neutral,
    AfterEnd,
    Exit,
}

struct Reader<'a, 'h> {
    handlers: &'a mut Vec<&'h mut dyn BlifHandler>,
    scanner: BlifScanner,
    source: &'a str,
    library: Option<&'a CellLibrary>,
    symbols: SymbolTable,
    covers: CoverPool,
    diags: Vec<Diagnostic>,
    /// `.outputs` symbols in declaration order.
    outputs: Vec<usize>,
    ungot: Option<Token<BlifToken>>,
    end_span: Span,
}

impl Reader<'_, '_> {
    fn run(&mut self) -> Result<(), Abort> {
        self.call(|h| h.init())?;
        let mut state = State::Init;
        loop {
            state = match state {
                State::Init => self.read_model()?,
                State::Neutral => self.read_statement()?,
                State::AfterEnd => self.skip_after_end()?,
                State::Exit => return self.finish(),
            };
        }
    }

    /// Calls every handler, then fails if any of them did.
    fn call(&mut self, mut f: impl FnMut(&mut dyn BlifHandler) -> Result<(), Error>) -> Result<(), Abort> {
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

    fn next(&mut self) -> Result<Token<BlifToken>, Abort> {
        let tok = match self.ungot.take() {
            Some(tok) => tok,
            None => self.scanner.read_token(),
        };
        if tok.kind == BlifToken::Error {
            return Err(self.error(DiagnosticKind::Lexical, tok.span, "LEX01", "Unterminated comment.".to_string()));
        }
        Ok(tok)
    }

    fn unget(&mut self, tok: Token<BlifToken>) {
        self.ungot = Some(tok);
    }

    fn error(&mut self, kind: DiagnosticKind, span: Span, label: &'static str, message: String) -> Abort {
        let d = Diagnostic::error(kind, self.source, Some(span), label, message);
        d.log();
        self.diags.push(d);
        Abort::Parse
    }

    fn syntax_error(&mut self, span: Span, label: &'static str, message: &str) -> Abort {
        self.error(DiagnosticKind::Syntax, span, label, message.to_string())
    }

    fn warning(&mut self, kind: DiagnosticKind, span: Span, label: &'static str, message: String) {
        let d = Diagnostic::warning(kind, self.source, Some(span), label, message);
        d.log();
        self.diags.push(d);
    }

    fn multiple_definition(&mut self, id: usize, span: Span) -> Abort {
        let sym = self.symbols.symbol(id);
        let previous = sym.def_span().unwrap_or_else(|| sym.ref_span());
        let message = format!("{}: Defined more than once. Previous definition is at {}.", sym.name(), previous);
        self.error(DiagnosticKind::Semantic, span, "MLTDEF01", message)
    }

    /// Consumes tokens up to and including the next newline.
    fn skip_line(&mut self) -> Result<(), Abort> {
        loop {
            let tok = self.next()?;
            match tok.kind {
                BlifToken::Nl => return Ok(()),
                BlifToken::Eof => {
                    self.unget(tok);
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    /// Requires the end of a statement line.
    fn expect_eol(&mut self, label: &'static str, message: &str) -> Result<(), Abort> {
        let tok = self.next()?;
        match tok.kind {
            BlifToken::Nl => Ok(()),
            BlifToken::Eof => {
                self.unget(tok);
                Ok(())
            }
            _ => Err(self.syntax_error(tok.span, label, message)),
        }
    }

    fn read_model(&mut self) -> Result<State, Abort> {
        let tok = loop {
            let tok = self.next()?;
            if tok.kind != BlifToken::Nl {
                break tok;
            }
        };
        if tok.kind != BlifToken::Model {
            return Err(self.syntax_error(tok.span, "SYN01", "No '.model' statement."));
        }
        let name_tok = self.next()?;
        if name_tok.kind != BlifToken::Str {
            return Err(self.syntax_error(name_tok.span, "SYN02", "String expected after '.model'."));
        }
        self.expect_eol("SYN03", "Newline expected.")?;
        let span = tok.span.to(name_tok.span);
        let name = name_tok.text().to_string();
        self.call(|h| h.model(span, &name))?;
        Ok(State::Neutral)
    }

    fn read_statement(&mut self) -> Result<State, Abort> {
        let tok = self.next()?;
        match tok.kind {
            BlifToken::Nl => Ok(State::Neutral),
            BlifToken::Eof => {
                self.warning(
                    DiagnosticKind::Syntax,
                    tok.span,
                    "SYN05",
                    "unexpected EOF. '.end' is assumed.".to_string(),
                );
                self.end_span = tok.span;
                Ok(State::Exit)
            }
            BlifToken::End => {
                self.end_span = tok.span;
                Ok(State::AfterEnd)
            }
            BlifToken::Model => Err(self.syntax_error(tok.span, "SYN04", "Multiple '.model' statements.")),
            BlifToken::Inputs => self.read_inputs(tok.span),
            BlifToken::Outputs => self.read_outputs(tok.span),
            BlifToken::Names => self.read_names(tok.span),
            BlifToken::Gate => self.read_gate(tok.span),
            BlifToken::Latch => self.read_latch(tok.span),
            BlifToken::Exdc => self.skip_exdc(),
            BlifToken::Subckt | BlifToken::Mlatch => {
                let message = format!("{}: Not supported. Ignored.", tok.kind);
                self.warning(DiagnosticKind::Semantic, tok.span, "UNSUP01", message);
                self.skip_line()?;
                Ok(State::Neutral)
            }
            kind if kind.is_annotation() => {
                self.skip_line()?;
                Ok(State::Neutral)
            }
            _ => Err(self.syntax_error(tok.span, "SYN00", "Syntax error.")),
        }
    }

    fn read_inputs(&mut self, span: Span) -> Result<State, Abort> {
        let mut n = 0;
        loop {
            let tok = self.next()?;
            match tok.kind {
                BlifToken::Str => {
                    let name = tok.text().to_string();
                    let id = self.symbols.find_or_create(&name, tok.span);
                    if self.symbols.is_defined(id) {
                        return Err(self.multiple_definition(id, tok.span));
                    }
                    self.symbols.set_defined(id, tok.span);
                    self.symbols.set_input(id);
                    if self.symbols.is_output(id) {
                        let message = format!("{}: Defined as both input and output.", name);
                        self.warning(DiagnosticKind::Semantic, tok.span, "MLTDEF02", message);
                    }
                    self.call(|h| h.inputs_elem(id, &name))?;
                    n += 1;
                }
                BlifToken::Nl => break,
                BlifToken::Eof => {
                    self.unget(tok);
                    break;
                }
                _ => return Err(self.syntax_error(tok.span, "SYN00", "Syntax error.")),
            }
        }
        if n == 0 {
            self.warning(
                DiagnosticKind::Syntax,
                span,
                "SYN07",
                "Empty '.inputs' statement. Ignored.".to_string(),
            );
        }
        Ok(State::Neutral)
    }

    fn read_outputs(&mut self, span: Span) -> Result<State, Abort> {
        let mut n = 0;
        loop {
            let tok = self.next()?;
            match tok.kind {
                BlifToken::Str => {
                    let name = tok.text().to_string();
                    let id = self.symbols.find_or_create(&name, tok.span);
                    if self.symbols.is_output(id) {
                        let message = format!("{}: Defined more than once as an output.", name);
                        return Err(self.error(DiagnosticKind::Semantic, tok.span, "MLTDEF03", message));
                    }
                    self.symbols.set_output(id);
                    if self.symbols.is_input(id) {
                        let message = format!("{}: Defined as both input and output.", name);
                        self.warning(DiagnosticKind::Semantic, tok.span, "MLTDEF02", message);
                    }
                    self.outputs.push(id);
                    n += 1;
                }
                BlifToken::Nl => break,
                BlifToken::Eof => {
                    self.unget(tok);
                    break;
                }
                _ => return Err(self.syntax_error(tok.span, "SYN00", "Syntax error.")),
            }
        }
        if n == 0 {
            self.warning(
                DiagnosticKind::Syntax,
                span,
                "SYN08",
                "Empty '.outputs' statement. Ignored.".to_string(),
            );
        }
        Ok(State::Neutral)
    }

    /// Checks one output cube and folds it into the statement's polarity.
    fn output_cube(&mut self, tok: &Token<BlifToken>, opat: &mut Option<char>) -> Result<(), Abort> {
        let text = tok.text();
        let c = match text.chars().next() {
            Some(c @ ('0' | '1')) if text.len() == 1 => c,
            _ => return Err(self.error(DiagnosticKind::Semantic, tok.span, "SYN15", "Illegal character in output cube.".to_string())),
        };
        match *opat {
            Some(prev) if prev != c => {
                let message = format!("Output pattern mismatch: expected '{}'.", prev);
                Err(self.error(DiagnosticKind::Semantic, tok.span, "SYN10", message))
            }
            _ => {
                *opat = Some(c);
                Ok(())
            }
        }
    }

    fn read_names(&mut self, span: Span) -> Result<State, Abort> {
        let mut names: Vec<(usize, Span)> = Vec::new();
        loop {
            let tok = self.next()?;
            match tok.kind {
                BlifToken::Str => {
                    let id = self.symbols.find_or_create(tok.text(), tok.span);
                    names.push((id, tok.span));
                }
                BlifToken::Nl => break,
                BlifToken::Eof => {
                    self.unget(tok);
                    break;
                }
                _ => return Err(self.syntax_error(tok.span, "SYN00", "Syntax error.")),
            }
        }
        let (oid, ospan) = match names.pop() {
            Some(last) => last,
            None => return Err(self.syntax_error(span, "SYN09", "Empty '.names' statement.")),
        };
        let fanins: Vec<usize> = names.into_iter().map(|(id, _)| id).collect();
        let ni = fanins.len();

        let mut ipat = String::new();
        let mut opat = None;
        let mut cube_num = 0;
        loop {
            let tok = self.next()?;
            match tok.kind {
                BlifToken::Nl => continue,
                BlifToken::Str => {}
                _ => {
                    self.unget(tok);
                    break;
                }
            }
            if ni == 0 {
                self.output_cube(&tok, &mut opat)?;
            } else {
                let text = tok.text();
                if text.chars().count() != ni {
                    return Err(self.error(
                        DiagnosticKind::Semantic,
                        tok.span,
                        "SYN12",
                        "Input pattern does not fit with the number of fanins.".to_string(),
                    ));
                }
                if text.chars().any(|c| SopPat::from_char(c).is_none()) {
                    return Err(self.error(
                        DiagnosticKind::Semantic,
                        tok.span,
                        "SYN11",
                        "Illegal character in input cube.".to_string(),
                    ));
                }
                ipat.push_str(text);
                let otok = self.next()?;
                if otok.kind != BlifToken::Str {
                    return Err(self.syntax_error(otok.span, "SYN13", "No output cube."));
                }
                self.output_cube(&otok, &mut opat)?;
            }
            cube_num += 1;
            self.expect_eol("SYN14", "Newline is expected.")?;
        }

        if self.symbols.is_defined(oid) {
            return Err(self.multiple_definition(oid, ospan));
        }
        self.symbols.set_defined(oid, ospan);

        let cover_id = self.covers.intern(ni, cube_num, &ipat, opat.unwrap_or('1'));
        let cover = self.covers.cover(cover_id).clone();
        let oname = self.symbols.name(oid).to_string();
        self.call(|h| h.names(oid, &oname, &fanins, &cover))?;
        Ok(State::Neutral)
    }

    fn gate_error(&mut self, span: Span) -> Abort {
        self.syntax_error(span, "SYN16", "Syntax error in '.gate' statement.")
    }

    fn read_gate(&mut self, span: Span) -> Result<State, Abort> {
        let library = match self.library {
            Some(lib) => lib,
            None => {
                return Err(self.error(
                    DiagnosticKind::Semantic,
                    span,
                    "NOCELL01",
                    "No cell-library is specified.".to_string(),
                ))
            }
        };
        let tok = self.next()?;
        if tok.kind != BlifToken::Str {
            return Err(self.gate_error(tok.span));
        }
        let cell_name = tok.text().to_string();
        let cell_id = match library.cell_id(&cell_name) {
            Some(id) => id,
            None => {
                let message = format!("{}: No such cell.", cell_name);
                return Err(self.error(DiagnosticKind::Semantic, tok.span, "NOCELL02", message));
            }
        };
        let cell = library.cell(cell_id);
        let unsuitable = if !cell.is_logic() || cell.function().is_none() {
            Some("Not a logic cell.")
        } else if cell.output_num() != 1 {
            Some("Not a single-output cell.")
        } else if cell.is_tristate() {
            Some("Is a tri-state cell.")
        } else if cell.inout_num() > 0 {
            Some("Has inout pins.")
        } else {
            None
        };
        if let Some(why) = unsuitable {
            let message = format!("{}: {}", cell_name, why);
            return Err(self.error(DiagnosticKind::Semantic, tok.span, "NOCELL03", message));
        }

        let mut nets: Vec<Option<usize>> = vec![None; cell.pins().len()];
        let mut n = 0;
        let end_span = loop {
            let tok = self.next()?;
            match tok.kind {
                BlifToken::Str => {}
                BlifToken::Nl => break tok.span,
                BlifToken::Eof => {
                    let span = tok.span;
                    self.unget(tok);
                    break span;
                }
                _ => return Err(self.gate_error(tok.span)),
            }
            let pin = match cell.pin_index(tok.text()) {
                Some(pin) => pin,
                None => {
                    let message = format!("{}: No such pin.", tok.text());
                    return Err(self.error(DiagnosticKind::Semantic, tok.span, "NOPIN01", message));
                }
            };
            let eq = self.next()?;
            if eq.kind != BlifToken::Eq {
                return Err(self.gate_error(eq.span));
            }
            let net = self.next()?;
            if net.kind != BlifToken::Str {
                return Err(self.gate_error(net.span));
            }
            let id = self.symbols.find_or_create(net.text(), net.span);
            if cell.pins()[pin].direction == PinDirection::Output {
                if self.symbols.is_defined(id) {
                    return Err(self.multiple_definition(id, net.span));
                }
                self.symbols.set_defined(id, net.span);
            }
            if nets[pin].is_some() {
                let message = format!("{}: Appears more than once.", net.text());
                return Err(self.error(DiagnosticKind::Semantic, net.span, "MLTDEF02", message));
            }
            nets[pin] = Some(id);
            n += 1;
        };
        if n == 0 {
            return Err(self.gate_error(end_span));
        }

        let mut unconnected = Vec::new();
        let mut fanins = Vec::with_capacity(cell.input_num());
        let mut output = None;
        for (pin, net) in cell.pins().iter().zip(nets.iter()) {
            match (net, pin.direction) {
                (None, _) => unconnected.push(pin.name.clone()),
                (Some(id), PinDirection::Output) => output = Some(*id),
                (Some(id), _) => fanins.push(*id),
            }
        }
        if let Some(pin) = unconnected.first() {
            let message = format!("{}: Not connected.", pin);
            return Err(self.error(DiagnosticKind::Semantic, end_span, "NOPIN02", message));
        }
        let oid = match output {
            Some(id) => id,
            None => return Err(self.gate_error(end_span)),
        };
        let oname = self.symbols.name(oid).to_string();
        self.call(|h| h.gate(oid, &oname, &fanins, cell_id))?;
        Ok(State::Neutral)
    }

    fn latch_error(&mut self, span: Span) -> Abort {
        self.syntax_error(span, "SYN17", "Syntax error in '.latch' statement.")
    }

    fn read_latch(&mut self, span: Span) -> Result<State, Abort> {
        let itok = self.next()?;
        if itok.kind != BlifToken::Str {
            return Err(self.latch_error(itok.span));
        }
        let otok = self.next()?;
        if otok.kind != BlifToken::Str {
            return Err(self.latch_error(otok.span));
        }
        let iid = self.symbols.find_or_create(itok.text(), itok.span);
        let oid = self.symbols.find_or_create(otok.text(), otok.span);

        let tok = self.next()?;
        let reset = match tok.kind {
            BlifToken::Str => {
                let reset = match tok.text() {
                    "0" => Some(false),
                    "1" => Some(true),
                    // don't care / unknown
                    "2" | "3" => None,
                    _ => {
                        return Err(self.error(
                            DiagnosticKind::Semantic,
                            tok.span,
                            "SYN18",
                            "Illegal character for reset value.".to_string(),
                        ))
                    }
                };
                let eol = self.next()?;
                match eol.kind {
                    BlifToken::Nl => {}
                    BlifToken::Eof => self.unget(eol),
                    _ => return Err(self.latch_error(eol.span)),
                }
                reset
            }
            BlifToken::Nl => None,
            BlifToken::Eof => {
                self.unget(tok);
                None
            }
            _ => return Err(self.latch_error(tok.span)),
        };

        if self.symbols.is_defined(oid) {
            return Err(self.multiple_definition(oid, otok.span));
        }
        self.symbols.set_defined(oid, otok.span);

        let oname = self.symbols.name(oid).to_string();
        let span = span.to(otok.span);
        self.call(|h| h.latch(oid, &oname, iid, span, reset))?;
        Ok(State::Neutral)
    }

    /// Skips an external don't-care network up to its own `.end`.
    fn skip_exdc(&mut self) -> Result<State, Abort> {
        loop {
            let tok = self.next()?;
            match tok.kind {
                BlifToken::End => return Ok(State::Neutral),
                BlifToken::Eof => {
                    self.unget(tok);
                    return Ok(State::Neutral);
                }
                _ => {}
            }
        }
    }

    fn skip_after_end(&mut self) -> Result<State, Abort> {
        let mut warned = false;
        loop {
            let tok = self.next()?;
            match tok.kind {
                BlifToken::Eof => return Ok(State::Exit),
                BlifToken::Nl => {}
                _ if !warned => {
                    self.warning(
                        DiagnosticKind::Syntax,
                        tok.span,
                        "SYN06",
                        "Statement after '.end' is ignored.".to_string(),
                    );
                    warned = true;
                }
                _ => {}
            }
        }
    }

    fn finish(&mut self) -> Result<(), Abort> {
        let undefined: Vec<(String, Span)> = self
            .symbols
            .iter()
            .filter(|(_, sym)| sym.def_span().is_none())
            .map(|(_, sym)| (sym.name().to_string(), sym.ref_span()))
            .collect();
        if !undefined.is_empty() {
            for (name, span) in undefined {
                self.error(DiagnosticKind::Semantic, span, "UNDEF01", format!("{}: Undefined.", name));
            }
            return Err(Abort::Parse);
        }

        for id in self.outputs.clone() {
            let name = self.symbols.name(id).to_string();
            self.call(|h| h.outputs_elem(id, &name))?;
        }
        let span = self.end_span;
        self.call(|h| h.end(span))?;
        for h in self.handlers.iter_mut() {
            h.normal_exit();
        }
        Ok(())
    }
}
