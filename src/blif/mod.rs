//! BLIF front end and back end.
//!
//! [`BlifParser`] reads a single `.model` and reports every recognized
//! statement to the registered [`BlifHandler`]s. [`BnBlifHandler`] is the
//! handler that builds a [`BnNetwork`]; [`read_blif`] and [`read_blif_str`]
//! wire the two together. [`write_blif`] emits a sane network back as BLIF.
//!
//! Symbols are passed to handlers as dense ids assigned in order of first
//! appearance; an id stays valid for the whole `read` call, so handlers may
//! refer to names that are only defined further down the file.

mod handler;
mod parser;
mod scanner;
mod writer;

use std::path::Path;

pub use handler::{BlifReadOptions, BnBlifHandler};
pub use parser::BlifParser;
pub use scanner::{BlifScanner, BlifToken};
pub use writer::{write_blif, write_blif_string, BlifWriteOptions};

use crate::cell::CellLibrary;
use crate::cover::Cover;
use crate::error::Error;
use crate::location::Span;
use crate::network::BnNetwork;

/// Receives the statements recognized by [`BlifParser`].
///
/// Every callback returns `Ok(())` by default. Returning an error makes the
/// parser stop after the current statement; the remaining handlers are still
/// called for that statement, then all of them get `error_exit`.
#[allow(unused_variables)]
pub trait BlifHandler {
    fn init(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn model(&mut self, span: Span, name: &str) -> Result<(), Error> {
        Ok(())
    }

    /// One name of an `.inputs` statement.
    fn inputs_elem(&mut self, id: usize, name: &str) -> Result<(), Error> {
        Ok(())
    }

    /// One name of an `.outputs` statement, reported after the whole file
    /// has been read.
    fn outputs_elem(&mut self, id: usize, name: &str) -> Result<(), Error> {
        Ok(())
    }

    /// A `.names` statement; `fanins[i]` is the symbol of cover input `i`.
    fn names(&mut self, id: usize, name: &str, fanins: &[usize], cover: &Cover) -> Result<(), Error> {
        Ok(())
    }

    /// A `.gate` statement; `fanins[i]` is the net on the cell's `i`-th
    /// input pin.
    fn gate(&mut self, id: usize, name: &str, fanins: &[usize], cell_id: usize) -> Result<(), Error> {
        Ok(())
    }

    /// A `.latch` statement. `reset` is the declared initial value, if any.
    fn latch(&mut self, id: usize, name: &str, fanin: usize, span: Span, reset: Option<bool>) -> Result<(), Error> {
        Ok(())
    }

    fn end(&mut self, span: Span) -> Result<(), Error> {
        Ok(())
    }

    fn normal_exit(&mut self) {}

    fn error_exit(&mut self) {}
}

/// Reads a BLIF file into a new network.
///
/// `library` is required only if the file uses `.gate`.
pub fn read_blif(
    path: impl AsRef<Path>,
    library: Option<&CellLibrary>,
    options: &BlifReadOptions,
) -> Result<BnNetwork, Error> {
    let mut network = BnNetwork::new();
    if let Some(lib) = library {
        network.set_library(lib.clone());
    }
    {
        let mut handler = BnBlifHandler::new(&mut network, options);
        let mut parser = BlifParser::new();
        parser.add_handler(&mut handler);
        parser.read(path, library)?;
    }
    Ok(network)
}

/// Reads BLIF text into a new network. `source` names the text in
/// diagnostics.
pub fn read_blif_str(
    text: &str,
    source: &str,
    library: Option<&CellLibrary>,
    options: &BlifReadOptions,
) -> Result<BnNetwork, Error> {
    let mut network = BnNetwork::new();
    if let Some(lib) = library {
        network.set_library(lib.clone());
    }
    {
        let mut handler = BnBlifHandler::new(&mut network, options);
        let mut parser = BlifParser::new();
        parser.add_handler(&mut handler);
        parser.read_str(text, source, library)?;
    }
    Ok(network)
}
