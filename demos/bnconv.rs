use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use bnet_rs::aig::{write_network_aag, write_network_aig, AigReadOptions, AigWriteOptions};
use bnet_rs::blif::{read_blif, write_blif, BlifReadOptions, BlifWriteOptions};
use bnet_rs::iscas89::{read_iscas89, Iscas89ReadOptions};
use bnet_rs::netlist::read_netlist;
use bnet_rs::network::BnNetwork;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Blif,
    Bench,
    Netlist,
    Aag,
    Aig,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "blif" => Some(Format::Blif),
            "bench" => Some(Format::Bench),
            "v" => Some(Format::Netlist),
            "aag" => Some(Format::Aag),
            "aig" => Some(Format::Aig),
            _ => None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Input file.
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (stdout if omitted).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Input format (guessed from the extension by default).
    #[clap(long, value_enum)]
    from: Option<Format>,

    /// Output format.
    #[clap(long, value_enum, default_value = "aag")]
    to: Format,

    /// Omit the AIGER symbol table.
    #[clap(long)]
    no_symbols: bool,

    /// Comment for the AIGER comment section.
    #[clap(long, value_name = "TEXT")]
    comment: Option<String>,
}

fn read_network(path: &Path, format: Format) -> color_eyre::Result<BnNetwork> {
    let network = match format {
        Format::Blif => read_blif(path, None, &BlifReadOptions::default())?,
        Format::Bench => read_iscas89(path, &Iscas89ReadOptions::default())?,
        Format::Netlist => read_netlist(path)?,
        Format::Aag | Format::Aig => {
            let aig = bnet_rs::aig::Aig::read(path)?;
            BnNetwork::from_aig(&aig, &AigReadOptions::default())?
        }
    };
    Ok(network)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    log::info!("args = {:?}", args);

    let from = match args.from.or_else(|| Format::from_path(&args.input)) {
        Some(format) => format,
        None => color_eyre::eyre::bail!("cannot guess the format of {}, use --from", args.input.display()),
    };
    let network = read_network(&args.input, from)?;
    log::info!(
        "network '{}': {} input(s), {} output(s), {} DFF(s), {} logic node(s)",
        network.name(),
        network.primary_inputs().len(),
        network.primary_outputs().len(),
        network.dff_num(),
        network.logic_list().len()
    );

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let aig_options = AigWriteOptions {
        symbols: !args.no_symbols,
        comment: args.comment.clone(),
    };
    match args.to {
        Format::Blif => write_blif(&network, &mut out, &BlifWriteOptions::default())?,
        Format::Aag => write_network_aag(&network, &mut out, &aig_options)?,
        Format::Aig => write_network_aig(&network, &mut out, &aig_options)?,
        Format::Bench | Format::Netlist => {
            color_eyre::eyre::bail!("{:?} is an input-only format", args.to)
        }
    }
    out.flush()?;

    log::info!("All done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
