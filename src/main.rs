// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kroute::emit::{self, PathRecord};
use kroute::{table, KDTree, Locator, Query, SearchStatus};

/// Finds the k shortest loopless paths between two positions on a road network,
/// and writes their nodes as CSV.
#[derive(Debug, Parser)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// The path to the nodes table (CSV, optionally gzip or bzip2 compressed)
    nodes_file: PathBuf,

    /// The path to the edges table (CSV, optionally gzip or bzip2 compressed)
    edges_file: PathBuf,

    /// Latitude of the start point
    start_lat: f64,

    /// Longitude of the start point
    start_lon: f64,

    /// Latitude of the end point
    end_lat: f64,

    /// Longitude of the end point
    end_lon: f64,

    /// Number of paths to find
    #[arg(short, default_value_t = kroute::DEFAULT_K)]
    k: usize,

    /// Where to write the path nodes; defaults to standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Find nearest nodes with a k-d tree instead of scanning all nodes
    #[arg(long)]
    kd_tree: bool,

    /// Prefix the output with a UTF-8 byte order mark
    #[arg(long)]
    bom: bool,

    /// Log path search details
    #[arg(short, long)]
    verbose: bool,
}

/// Exit status for a query whose start and end nodes are not connected.
/// Kept apart from 2, which clap uses for usage errors.
const EXIT_NO_PATH: u8 = 3;

pub fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(SearchStatus::NoPath) => ExitCode::from(EXIT_NO_PATH),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder = colog::default_builder();
    builder.filter_level(if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
    builder.parse_default_env();
    builder.init();
}

fn run(cli: &Cli) -> Result<SearchStatus, Box<dyn Error>> {
    let g = table::load_graph_from_files(&table::Options::default(), &cli.nodes_file, &cli.edges_file)?;

    let query = Query {
        start: (cli.start_lat, cli.start_lon),
        end: (cli.end_lat, cli.end_lon),
        k: cli.k,
    };

    let tree: Option<KDTree>;
    let locator: &dyn Locator = if cli.kd_tree {
        tree = KDTree::from_iter(g.iter().cloned());
        &tree
    } else {
        &g
    };

    let outcome = kroute::run_query(&g, locator, &query)?;
    let records = outcome.records(&g)?;
    if !records.is_empty() {
        write_output(cli, &records)?;
    }

    Ok(outcome.status())
}

fn write_output(cli: &Cli, records: &[PathRecord]) -> Result<(), Box<dyn Error>> {
    match &cli.output {
        Some(path) => {
            let f = io::BufWriter::new(File::create(path)?);
            emit::write_records(records, f, cli.bom)?;
            log::info!("{} records written to {}", records.len(), path.display());
        }
        None => emit::write_records(records, io::stdout().lock(), cli.bom)?,
    }
    Ok(())
}
