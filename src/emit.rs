// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Flattening of ranked [Paths](crate::Path) into per-node output rows.

use std::io;

use crate::{Graph, NodeId, Path};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One output row: a single node of a single ranked path.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PathRecord {
    /// 1-based rank of the path.
    pub path_id: usize,

    /// 0-based position of the node within the path.
    pub node_order: usize,

    pub node_id: NodeId,
    pub lon: f64,
    pub lat: f64,
}

/// Error conditions which may occur during [emit] or [write_records].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path references a node without a known position.
    #[error("path {path_id} references node {node_id}, which has no known position")]
    MissingNode { path_id: usize, node_id: NodeId },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// Flattens ranked paths into [PathRecords](PathRecord), ordered by path rank
/// and then by position within the path. Node positions are taken from the graph.
///
/// Nodes shared by multiple paths are repeated for every path.
/// Fails with [Error::MissingNode] instead of emitting a record without a valid position.
pub fn emit(g: &Graph, paths: &[Path]) -> Result<Vec<PathRecord>, Error> {
    let mut records = Vec::with_capacity(paths.iter().map(Path::len).sum());

    for (rank, path) in paths.iter().enumerate() {
        let path_id = rank + 1;
        for (node_order, &node_id) in path.nodes.iter().enumerate() {
            let node = g
                .get_node(node_id)
                .ok_or(Error::MissingNode { path_id, node_id })?;

            records.push(PathRecord {
                path_id,
                node_order,
                node_id,
                lon: node.lon,
                lat: node.lat,
            });
        }
    }

    Ok(records)
}

/// Writes [PathRecords](PathRecord) as CSV with a `path_id,node_order,node_id,lon,lat` header.
///
/// If `bom` is set, the output is prefixed with a UTF-8 byte order mark,
/// which some spreadsheet applications need to detect the encoding.
pub fn write_records<W: io::Write>(records: &[PathRecord], mut w: W, bom: bool) -> Result<(), Error> {
    if bom {
        w.write_all(UTF8_BOM)?;
    }

    let mut wr = csv::Writer::from_writer(w);
    if records.is_empty() {
        wr.write_record(["path_id", "node_order", "node_id", "lon", "lat"])?;
    }
    for r in records {
        wr.serialize(r)?;
    }
    wr.flush()?;
    Ok(())
}
