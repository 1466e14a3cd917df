// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading of road networks from node and edge CSV tables.
//!
//! The nodes table needs an id, longitude and latitude column, and the edges table
//! needs `u` and `v` columns. An edge `length` (or `weight`) column is optional.
//! Accepted column names are listed in [NODE_ID_COLUMNS], [LON_COLUMNS], [LAT_COLUMNS]
//! and [LENGTH_COLUMNS]; other columns are ignored.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::{build, EdgeRecord, Graph, NodeRecord};

mod reader;

pub use reader::{read_edges, read_nodes};

/// Accepted names for the node id column, in order of preference.
pub const NODE_ID_COLUMNS: &[&str] = &["node_id", "osmid", "id"];

/// Accepted names for the node longitude column, in order of preference.
pub const LON_COLUMNS: &[&str] = &["longitude", "lon", "x"];

/// Accepted names for the node latitude column, in order of preference.
pub const LAT_COLUMNS: &[&str] = &["latitude", "lat", "y"];

/// Accepted names for the optional edge length column (in meters), in order of preference.
pub const LENGTH_COLUMNS: &[&str] = &["length", "weight"];

/// Format of an input table
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    #[default]
    Unknown,

    /// Force uncompressed CSV
    Csv,

    /// Force CSV with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    CsvGz,

    /// Force CSV with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    CsvBz2,
}

impl FileFormat {
    /// Guesses the format of a table from its first bytes.
    fn sniff(head: &[u8]) -> Self {
        if head.starts_with(b"\x1F\x8B") {
            Self::CsvGz
        } else if head.starts_with(b"BZh") {
            Self::CsvBz2
        } else {
            Self::Csv
        }
    }
}

/// Additional controls for loading tables into a [Graph].
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Format of both input tables.
    pub file_format: FileFormat,
}

/// Which of the two input tables an [Error] relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Nodes,
    Edges,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nodes => write!(f, "nodes"),
            Self::Edges => write!(f, "edges"),
        }
    }
}

/// Error conditions which may occur while loading tables.
///
/// Any error aborts loading of the whole graph. Edges which merely reference
/// unknown nodes are not errors; they are skipped by [build](crate::build).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("{table} table has no {column} column (accepted names: {aliases:?})")]
    MissingColumn {
        table: Table,
        column: &'static str,
        aliases: &'static [&'static str],
    },

    #[error("{table} table, line {line}: invalid {column}: {value:?}")]
    InvalidValue {
        table: Table,
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("{0}: {1}")]
    File(PathBuf, #[source] Box<Error>),
}

/// Wraps a stream in a decompressor, as per the [FileFormat].
/// The stream is automatically wrapped in a buffered reader.
fn decompress<'r, R: io::Read + 'r>(
    file_format: FileFormat,
    reader: R,
) -> io::Result<Box<dyn io::Read + 'r>> {
    let mut b = io::BufReader::new(reader);
    let file_format = match file_format {
        FileFormat::Unknown => FileFormat::sniff(io::BufRead::fill_buf(&mut b)?),
        f => f,
    };

    Ok(match file_format {
        FileFormat::Unknown | FileFormat::Csv => Box::new(b),
        FileFormat::CsvGz => Box::new(flate2::read::MultiGzDecoder::new(b)),
        FileFormat::CsvBz2 => Box::new(bzip2::read::MultiBzDecoder::new(b)),
    })
}

/// Loads a [Graph] from node and edge tables read from the provided streams.
pub fn load_graph_from_io<N: io::Read, E: io::Read>(
    options: &Options,
    nodes: N,
    edges: E,
) -> Result<Graph, Error> {
    let nodes: Vec<NodeRecord> = read_nodes(decompress(options.file_format, nodes)?)?;
    let edges: Vec<EdgeRecord> = read_edges(decompress(options.file_format, edges)?)?;
    Ok(build(nodes, edges))
}

/// Loads a [Graph] from node and edge tables stored in files at the provided paths.
/// Errors are annotated with the path of the offending file.
pub fn load_graph_from_files<P: AsRef<Path>, Q: AsRef<Path>>(
    options: &Options,
    nodes_path: P,
    edges_path: Q,
) -> Result<Graph, Error> {
    let nodes = load_table(options, nodes_path.as_ref(), read_nodes)?;
    let edges = load_table(options, edges_path.as_ref(), read_edges)?;
    Ok(build(nodes, edges))
}

fn load_table<T>(
    options: &Options,
    path: &Path,
    read: fn(Box<dyn io::Read>) -> Result<Vec<T>, Error>,
) -> Result<Vec<T>, Error> {
    let annotate = |e: Error| Error::File(PathBuf::from(path), Box::new(e));
    let f = File::open(path).map_err(|e| annotate(e.into()))?;
    let r = decompress(options.file_format, f).map_err(|e| annotate(e.into()))?;
    read(r).map_err(annotate)
}

/// Loads a [Graph] from node and edge tables held in memory.
pub fn load_graph_from_buffers(options: &Options, nodes: &[u8], edges: &[u8]) -> Result<Graph, Error> {
    load_graph_from_io(options, nodes, edges)
}
