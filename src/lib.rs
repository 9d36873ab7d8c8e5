//! # bnet-rs: Boolean networks in Rust
//!
//! **`bnet-rs`** is an intermediate representation for logic-synthesis tools.
//! It reads gate-level circuits from text formats, keeps them as a single
//! owned graph of ports, primary inputs and outputs, flip-flops, latches and
//! combinational logic nodes, and writes them back out, including as an
//! And-Inverter Graph in the AIGER format.
//!
//! ## Key Features
//!
//! - **One owner**: A [`BnNetwork`][crate::network::BnNetwork] owns every node, port, DFF, latch and function table. Everything else is addressed through small typed ids ([`NodeId`][crate::types::NodeId] and friends).
//! - **Forward references**: Readers create nodes as soon as they are defined and bind fan-ins once the whole file is read, so statements may appear in any order.
//! - **Validation in one pass**: [`wrap_up`][crate::network::BnNetwork::wrap_up] reports *every* dangling terminal and combinational loop before computing the topological order back ends rely on.
//! - **Interned functions**: Covers, expressions and truth tables are stored once per network; expressions equal to a built-in gate become cheap primitive nodes.
//! - **Front ends**: BLIF ([`blif`]), ISCAS89 `.bench` ([`iscas89`]) and a structural gate-level netlist ([`netlist`]).
//! - **Back ends**: BLIF writer and AIGER (`aag`/`aig`) writer and reader ([`aig`]).
//!
//! ## Basic Usage
//!
//! ```rust
//! use bnet_rs::aig::{write_network_aag, AigWriteOptions};
//! use bnet_rs::iscas89::{read_iscas89_str, Iscas89ReadOptions};
//!
//! let text = "INPUT(a)\nINPUT(b)\nOUTPUT(c)\nc = AND(a, b)\n";
//! let net = read_iscas89_str(text, "and.bench", &Iscas89ReadOptions::default()).unwrap();
//! assert_eq!(net.primary_inputs().len(), 2);
//! assert_eq!(net.logic_list().len(), 1);
//!
//! let mut aag = Vec::new();
//! write_network_aag(&net, &mut aag, &AigWriteOptions::default()).unwrap();
//! assert!(aag.starts_with(b"aag 3 2 0 1 1\n"));
//! ```
//!
//! ## Core Components
//!
//! - **[`network`]**: The [`BnNetwork`][crate::network::BnNetwork] itself, `wrap_up` and simulation.
//! - **[`expr`]**, **[`tvfunc`]**, **[`cover`]**, **[`prim`]**: Function representations.
//! - **[`error`]**: [`Diagnostic`][crate::error::Diagnostic]s and the crate-wide [`Error`][crate::error::Error].
//! - **[`scanner`]**, **[`symbol`]**, **[`location`]**: Pieces shared by the format readers.

pub mod aig;
pub mod blif;
pub mod cell;
pub mod cover;
pub mod error;
pub mod expr;
pub mod iscas89;
pub mod location;
pub mod netlist;
pub mod network;
pub mod pool;
pub mod prim;
pub mod scanner;
pub mod symbol;
pub mod tvfunc;
pub mod types;

mod builder;
