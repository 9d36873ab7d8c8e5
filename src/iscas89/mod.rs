//! ISCAS89 (`.bench`) front end.
//!
//! The format has four statement shapes:
//!
//! ```text
//! INPUT(name)
//! OUTPUT(name)
//! name = GATE(name, name, ...)
//! # comment
//! ```
//!
//! where `GATE` is one of the built-in gates, `DFF` or `MUX`. Unlike the
//! BLIF reader, [`Iscas89Parser`] recovers from errors: it skips to the next
//! `)` and keeps going, so one read reports every problem in the file.

mod handler;
mod parser;
mod scanner;

use std::path::Path;

pub use handler::{BnIscas89Handler, Iscas89ReadOptions};
pub use parser::Iscas89Parser;
pub use scanner::{Iscas89Scanner, Iscas89Token};

use crate::error::Error;
use crate::location::Span;
use crate::network::BnNetwork;
use crate::prim::PrimType;

/// Receives the statements recognized by [`Iscas89Parser`].
///
/// Handlers see only statements that parsed cleanly. `read_output` and `end`
/// are called after the whole file has been read and only if no error was
/// found.
#[allow(unused_variables)]
pub trait Iscas89Handler {
    fn init(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read_input(&mut self, span: Span, id: usize, name: &str) -> Result<(), Error> {
        Ok(())
    }

    fn read_output(&mut self, span: Span, id: usize, name: &str) -> Result<(), Error> {
        Ok(())
    }

    fn read_gate(&mut self, span: Span, id: usize, name: &str, prim: PrimType, fanins: &[usize]) -> Result<(), Error> {
        Ok(())
    }

    /// `fanins` holds the `n` select signals followed by the `2^n` data
    /// signals.
    fn read_mux(&mut self, span: Span, id: usize, name: &str, fanins: &[usize]) -> Result<(), Error> {
        Ok(())
    }

    fn read_dff(&mut self, span: Span, id: usize, name: &str, fanin: usize) -> Result<(), Error> {
        Ok(())
    }

    fn end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn normal_exit(&mut self) {}

    fn error_exit(&mut self) {}
}

/// Reads a `.bench` file into a new network.
pub fn read_iscas89(path: impl AsRef<Path>, options: &Iscas89ReadOptions) -> Result<BnNetwork, Error> {
    let mut network = BnNetwork::new();
    {
        let mut handler = BnIscas89Handler::new(&mut network, options);
        let mut parser = Iscas89Parser::new();
        parser.add_handler(&mut handler);
        parser.read(path)?;
    }
    Ok(network)
}

/// Reads `.bench` text into a new network. `source` names the text in
/// diagnostics.
pub fn read_iscas89_str(text: &str, source: &str, options: &Iscas89ReadOptions) -> Result<BnNetwork, Error> {
    let mut network = BnNetwork::new();
    {
        let mut handler = BnIscas89Handler::new(&mut network, options);
        let mut parser = Iscas89Parser::new();
        parser.add_handler(&mut handler);
        parser.read_str(text, source)?;
    }
    Ok(network)
}
