use std::io::Write;

use super::Aig;
use crate::error::Error;
use crate::network::BnNetwork;

/// Settings for writing a network as AIGER.
#[derive(Debug, Clone)]
pub struct AigWriteOptions {
    /// Emit `i#`/`l#`/`o#` lines with node names.
    pub symbols: bool,
    /// Text written after the `c` line.
    pub comment: Option<String>,
}

impl Default for AigWriteOptions {
    fn default() -> Self {
        Self {
            symbols: true,
            comment: None,
        }
    }
}

fn write_header(aig: &Aig, tag: &str, out: &mut impl Write) -> Result<(), Error> {
    writeln!(
        out,
        "{} {} {} {} {} {}",
        tag,
        aig.max_var(),
        aig.input_num(),
        aig.latch_num(),
        aig.output_num(),
        aig.and_num()
    )?;
    Ok(())
}

fn write_symbols(aig: &Aig, out: &mut impl Write) -> Result<(), Error> {
    for i in 0..aig.input_num() {
        if let Some(name) = aig.input_symbol(i) {
            writeln!(out, "i{} {}", i, name)?;
        }
    }
    for i in 0..aig.latch_num() {
        if let Some(name) = aig.latch_symbol(i) {
            writeln!(out, "l{} {}", i, name)?;
        }
    }
    for i in 0..aig.output_num() {
        if let Some(name) = aig.output_symbol(i) {
            writeln!(out, "o{} {}", i, name)?;
        }
    }
    if let Some(comment) = aig.comment() {
        writeln!(out, "c")?;
        write!(out, "{}", comment)?;
        if !comment.ends_with('\n') {
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Writes `n` as an AIGER variable-length number: 7 bits per byte, low
/// bits first, high bit set on every byte but the last.
fn put_number(out: &mut impl Write, mut n: u32) -> Result<(), Error> {
    let mut buf = Vec::with_capacity(5);
    while n >= 0x80 {
        buf.push((n & 0x7f) as u8 | 0x80);
        n >>= 7;
    }
    buf.push(n as u8);
    out.write_all(&buf)?;
    Ok(())
}

/// Writes `aig` in the ASCII `aag` format.
pub fn write_aag(aig: &Aig, out: &mut impl Write) -> Result<(), Error> {
    write_header(aig, "aag", out)?;
    for i in 0..aig.input_num() {
        writeln!(out, "{}", aig.input(i))?;
    }
    for i in 0..aig.latch_num() {
        writeln!(out, "{} {}", aig.latch(i), aig.latch_next(i))?;
    }
    for i in 0..aig.output_num() {
        writeln!(out, "{}", aig.output(i))?;
    }
    for k in 0..aig.and_num() {
        let (src0, src1) = aig.and_srcs(k);
        writeln!(out, "{} {} {}", aig.and_lit(k), src0, src1)?;
    }
    write_symbols(aig, out)
}

/// Writes `aig` in the binary `aig` format.
///
/// Inputs are implicit; each AND gate is stored as the two deltas
/// `lhs - src0` and `src0 - src1`.
pub fn write_aig(aig: &Aig, out: &mut impl Write) -> Result<(), Error> {
    write_header(aig, "aig", out)?;
    for i in 0..aig.latch_num() {
        writeln!(out, "{}", aig.latch_next(i))?;
    }
    for i in 0..aig.output_num() {
        writeln!(out, "{}", aig.output(i))?;
    }
    for k in 0..aig.and_num() {
        let lhs = aig.and_lit(k).raw();
        let (src0, src1) = aig.and_srcs(k);
        put_number(out, lhs - src0.raw())?;
        put_number(out, src0.raw() - src1.raw())?;
    }
    write_symbols(aig, out)
}

fn network_aig(network: &BnNetwork, options: &AigWriteOptions) -> Result<Aig, Error> {
    let mut aig = network.to_aig()?;
    if !options.symbols {
        aig.clear_symbols();
    }
    aig.set_comment(options.comment.clone());
    Ok(aig)
}

/// Lowers `network` with [`BnNetwork::to_aig`] and writes it as `aag`.
pub fn write_network_aag(network: &BnNetwork, out: &mut impl Write, options: &AigWriteOptions) -> Result<(), Error> {
    write_aag(&network_aig(network, options)?, out)
}

/// Lowers `network` with [`BnNetwork::to_aig`] and writes it as binary `aig`.
pub fn write_network_aig(network: &BnNetwork, out: &mut impl Write, options: &AigWriteOptions) -> Result<(), Error> {
    write_aig(&network_aig(network, options)?, out)
}
