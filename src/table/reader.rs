// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

use super::{Error, Table, LAT_COLUMNS, LENGTH_COLUMNS, LON_COLUMNS, NODE_ID_COLUMNS};
use crate::{EdgeRecord, NodeId, NodeRecord};

/// Column layout of a table, resolved from its header row.
struct Columns<'h> {
    table: Table,
    headers: &'h csv::StringRecord,
}

impl<'h> Columns<'h> {
    fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|&alias| {
            self.headers
                .iter()
                .position(|h| h.trim_start_matches('\u{FEFF}') == alias)
        })
    }

    fn require(&self, column: &'static str, aliases: &'static [&'static str]) -> Result<usize, Error> {
        self.find(aliases).ok_or(Error::MissingColumn {
            table: self.table,
            column,
            aliases,
        })
    }
}

/// A single data row, with enough context to report invalid values.
struct Row<'r> {
    table: Table,
    record: &'r csv::StringRecord,
}

impl<'r> Row<'r> {
    fn line(&self) -> u64 {
        self.record.position().map(|p| p.line()).unwrap_or(0)
    }

    fn invalid(&self, column: &'static str, value: &str) -> Error {
        Error::InvalidValue {
            table: self.table,
            line: self.line(),
            column,
            value: value.to_string(),
        }
    }

    fn get(&self, idx: usize) -> &'r str {
        self.record.get(idx).unwrap_or("")
    }

    fn node_id(&self, idx: usize, column: &'static str) -> Result<NodeId, Error> {
        let value = self.get(idx);
        parse_node_id(value).ok_or_else(|| self.invalid(column, value))
    }

    fn float(&self, idx: usize, column: &'static str) -> Result<f64, Error> {
        let value = self.get(idx);
        value.parse().map_err(|_| self.invalid(column, value))
    }

    fn optional_float(&self, idx: Option<usize>, column: &'static str) -> Result<Option<f64>, Error> {
        match idx.map(|idx| self.get(idx)) {
            None | Some("") => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(column, value)),
        }
    }
}

/// Parses a node id. Integral floats (like `123.0`) are accepted,
/// as some tools write integer columns in that form.
fn parse_node_id(value: &str) -> Option<NodeId> {
    if let Ok(id) = value.parse::<NodeId>() {
        return Some(id);
    }

    let f = value.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as NodeId)
    } else {
        None
    }
}

fn csv_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Reads [NodeRecords](NodeRecord) from an uncompressed CSV stream.
pub fn read_nodes<R: io::Read>(reader: R) -> Result<Vec<NodeRecord>, Error> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = Columns {
        table: Table::Nodes,
        headers: &headers,
    };
    let id_idx = columns.require("node id", NODE_ID_COLUMNS)?;
    let lon_idx = columns.require("longitude", LON_COLUMNS)?;
    let lat_idx = columns.require("latitude", LAT_COLUMNS)?;

    let mut nodes = Vec::default();
    for record in rdr.records() {
        let record = record?;
        let row = Row {
            table: Table::Nodes,
            record: &record,
        };

        nodes.push(NodeRecord {
            id: row.node_id(id_idx, "node id")?,
            lon: row.float(lon_idx, "longitude")?,
            lat: row.float(lat_idx, "latitude")?,
        });
    }

    log::debug!("read {} node records", nodes.len());
    Ok(nodes)
}

/// Reads [EdgeRecords](EdgeRecord) from an uncompressed CSV stream.
///
/// Without a length column, or for rows with an empty length, the length is left unset.
pub fn read_edges<R: io::Read>(reader: R) -> Result<Vec<EdgeRecord>, Error> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let columns = Columns {
        table: Table::Edges,
        headers: &headers,
    };
    let u_idx = columns.require("u", &["u"])?;
    let v_idx = columns.require("v", &["v"])?;
    let length_idx = columns.find(LENGTH_COLUMNS);

    match length_idx {
        Some(idx) => log::info!("using the {:?} column as edge weights", &headers[idx]),
        None => log::warn!("edges table has no length column, using great-circle distances"),
    }

    let mut edges = Vec::default();
    for record in rdr.records() {
        let record = record?;
        let row = Row {
            table: Table::Edges,
            record: &record,
        };

        edges.push(EdgeRecord {
            u: row.node_id(u_idx, "u")?,
            v: row.node_id(v_idx, "v")?,
            length: row.optional_float(length_idx, "length")?,
        });
    }

    log::debug!("read {} edge records", edges.len());
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_with_reference_column_names() {
        let data = b"osmid,y,x,street_count\n1,35.9,120.1,3\n2,35.8,120.2,1\n";
        let nodes = read_nodes(&data[..]).unwrap();
        assert_eq!(
            nodes,
            vec![
                NodeRecord {
                    id: 1,
                    lon: 120.1,
                    lat: 35.9
                },
                NodeRecord {
                    id: 2,
                    lon: 120.2,
                    lat: 35.8
                },
            ]
        );
    }

    #[test]
    fn nodes_with_descriptive_column_names() {
        let data = "\u{FEFF}node_id, latitude, longitude\n7, 1.5, 2.5\n";
        let nodes = read_nodes(data.as_bytes()).unwrap();
        assert_eq!(
            nodes,
            vec![NodeRecord {
                id: 7,
                lon: 2.5,
                lat: 1.5
            }]
        );
    }

    #[test]
    fn preferred_alias_wins() {
        // "node_id" is preferred over "id"
        let data = b"id,node_id,lon,lat\n1,2,0.0,0.0\n";
        assert_eq!(read_nodes(&data[..]).unwrap()[0].id, 2);
    }

    #[test]
    fn integral_float_ids() {
        assert_eq!(parse_node_id("123"), Some(123));
        assert_eq!(parse_node_id("-5"), Some(-5));
        assert_eq!(parse_node_id("123.0"), Some(123));
        assert_eq!(parse_node_id("123.5"), None);
        assert_eq!(parse_node_id("abc"), None);
        assert_eq!(parse_node_id(""), None);
    }

    #[test]
    fn nodes_missing_column() {
        let err = read_nodes(&b"osmid,y\n1,2\n"[..]).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn {
                table: Table::Nodes,
                column: "longitude",
                ..
            }
        ));
    }

    #[test]
    fn nodes_invalid_value() {
        let err = read_nodes(&b"osmid,y,x\n1,2,3\n2,north,3\n"[..]).unwrap_err();
        match err {
            Error::InvalidValue {
                table,
                line,
                column,
                value,
            } => {
                assert_eq!(table, Table::Nodes);
                assert_eq!(line, 3);
                assert_eq!(column, "latitude");
                assert_eq!(value, "north");
            }
            e => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn edges_with_length() {
        let data = b"u,v,key,length\n1,2,0,15.5\n2,3,0,\n";
        let edges = read_edges(&data[..]).unwrap();
        assert_eq!(
            edges,
            vec![
                EdgeRecord {
                    u: 1,
                    v: 2,
                    length: Some(15.5)
                },
                EdgeRecord {
                    u: 2,
                    v: 3,
                    length: None
                },
            ]
        );
    }

    #[test]
    fn edges_without_length() {
        let edges = read_edges(&b"u,v\n1,2\n"[..]).unwrap();
        assert_eq!(
            edges,
            vec![EdgeRecord {
                u: 1,
                v: 2,
                length: None
            }]
        );
    }

    #[test]
    fn edges_missing_column() {
        let err = read_edges(&b"u,length\n1,2\n"[..]).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn {
                table: Table::Edges,
                column: "v",
                ..
            }
        ));
    }

    #[test]
    fn edges_invalid_length() {
        let err = read_edges(&b"u,v,length\n1,2,far\n"[..]).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { column: "length", line: 2, .. }));
    }
}
