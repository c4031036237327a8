//! Loading route maps from disk.
//!
//! Two layouts are understood. The route format is a sequence of records, each opened by a
//! `Node` or `Edge` line and followed by `key: value...` lines:
//!
//! ```text
//! Node
//! id: 1
//! gps: 51.8985 -8.4756
//! Edge
//! from: 1
//! to: 2
//! length: 120.5
//! time: 9.8
//! oneway: N
//! ```
//!
//! `gps`, `time` and `oneway` are optional; `oneway` is read past since the graph is undirected.
//! The CSV layout is an edge list with a header row and `node_id,neighbor_id,weight` columns.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use csv::ReaderBuilder;

use crate::error::{Error, Result};
use crate::route_map::RouteMap;

/// Which edge field of a route file becomes the edge weight.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Weighting {
    Length,
    Time,
}

impl Weighting {
    fn field(self) -> &'static str {
        match self {
            Weighting::Length => "length",
            Weighting::Time => "time",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RecordKind {
    Node,
    Edge,
}

#[derive(Debug)]
struct Record {
    kind: RecordKind,
    line: usize,
    fields: Vec<(String, Vec<String>)>,
}

impl Record {
    fn new(kind: RecordKind, line: usize) -> Self {
        Self {
            kind,
            line,
            fields: Vec::new(),
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn values(&self, key: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    fn parse<T: FromStr>(&self, key: &str, position: usize) -> Result<Option<T>> {
        let Some(values) = self.values(key) else {
            return Ok(None);
        };
        let raw = values
            .get(position)
            .ok_or_else(|| self.error(format!("`{key}` is missing a value")))?;
        raw.parse()
            .map(Some)
            .map_err(|_| self.error(format!("cannot parse `{raw}` in `{key}`")))
    }

    fn require<T: FromStr>(&self, key: &str) -> Result<T> {
        self.parse(key, 0)?
            .ok_or_else(|| self.error(format!("missing `{key}`")))
    }

    fn apply(&self, map: &mut RouteMap<i64>, weighting: Weighting) -> Result<()> {
        match self.kind {
            RecordKind::Node => {
                let id: i64 = self.require("id")?;
                map.add_vertex(id);
                if self.values("gps").is_some() {
                    let lat: Option<f64> = self.parse("gps", 0)?;
                    let lon: Option<f64> = self.parse("gps", 1)?;
                    if let (Some(lat), Some(lon)) = (lat, lon) {
                        map.add_coords(&id, lat, lon)?;
                    }
                }
            }
            RecordKind::Edge => {
                let from: i64 = self.require("from")?;
                let to: i64 = self.require("to")?;
                let weight: f64 = self.require(weighting.field())?;
                let lookup = |label: i64| {
                    map.vertex(&label)
                        .ok_or_else(|| self.error(format!("edge refers to unknown node {label}")))
                };
                let (v, w) = (lookup(from)?, lookup(to)?);
                map.add_edge(v, w, weight)
                    .map_err(|e| self.error(e.to_string()))?;
            }
        }
        Ok(())
    }
}

/// Reads a route-format map, weighting edges by `weighting`.
pub fn read_route_map<R: BufRead>(reader: R, weighting: Weighting) -> Result<RouteMap<i64>> {
    let mut map = RouteMap::new();
    let mut current: Option<Record> = None;

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let number = number + 1;
        let trimmed = line.trim();
        let kind = match trimmed {
            "" => continue,
            "Node" => Some(RecordKind::Node),
            "Edge" => Some(RecordKind::Edge),
            _ => None,
        };

        if let Some(kind) = kind {
            if let Some(record) = current.replace(Record::new(kind, number)) {
                record.apply(&mut map, weighting)?;
            }
            continue;
        }

        let record = current.as_mut().ok_or_else(|| Error::Parse {
            line: number,
            message: format!("`{trimmed}` is outside of a Node or Edge record"),
        })?;
        let mut tokens = trimmed.split_whitespace();
        let key = tokens.next().unwrap_or_default().trim_end_matches(':');
        record
            .fields
            .push((key.to_string(), tokens.map(String::from).collect()));
    }

    if let Some(record) = current {
        record.apply(&mut map, weighting)?;
    }
    Ok(map)
}

pub fn read_route_file(path: impl AsRef<Path>, weighting: Weighting) -> Result<RouteMap<i64>> {
    let file = File::open(path)?;
    read_route_map(BufReader::new(file), weighting)
}

/// Reads a `node_id,neighbor_id,weight` edge list. Nodes are created on first mention and
/// rows joining a node to itself are skipped.
pub fn read_csv_edges<R: io::Read>(reader: R) -> Result<RouteMap<i64>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut map = RouteMap::new();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let error = |message: String| Error::Parse { line, message };
        let column = |i: usize| {
            record
                .get(i)
                .ok_or_else(|| error(format!("expected 3 columns, found {}", record.len())))
        };

        let node_id: i64 = column(0)?
            .trim()
            .parse()
            .map_err(|_| error(format!("bad node_id `{}`", &record[0])))?;
        let neighbor_id: i64 = column(1)?
            .trim()
            .parse()
            .map_err(|_| error(format!("bad neighbor_id `{}`", &record[1])))?;
        let weight: f64 = column(2)?
            .trim()
            .parse()
            .map_err(|_| error(format!("bad weight `{}`", &record[2])))?;

        let v = map
            .vertex(&node_id)
            .unwrap_or_else(|| map.add_vertex(node_id));
        let w = map
            .vertex(&neighbor_id)
            .unwrap_or_else(|| map.add_vertex(neighbor_id));
        // Self-loops carry no route; keep the node, drop the row.
        if v == w {
            continue;
        }
        map.add_edge(v, w, weight).map_err(|e| error(e.to_string()))?;
    }
    Ok(map)
}

pub fn read_csv_file(path: impl AsRef<Path>) -> Result<RouteMap<i64>> {
    let file = File::open(path)?;
    read_csv_edges(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coord;

    const SIMPLE_ROUTE: &str = "\
Node
id: 1
gps: 51.0 -8.0
Node
id: 2
gps: 51.1 -8.1
Node
id: 3
Node
id: 4
Edge
from: 1
to: 2
length: 10.0
time: 1.0
oneway: N
Edge
from: 2
to: 3
length: 20.0
time: 2.0
oneway: N
Edge
from: 1
to: 3
length: 15.0
time: 4.0
oneway: N
Edge
from: 3
to: 4
length: 5.0
time: 1.0
oneway: N
";

    #[test]
    fn reads_nodes_edges_and_coordinates() {
        let map = read_route_map(SIMPLE_ROUTE.as_bytes(), Weighting::Time).unwrap();
        assert_eq!(map.graph().num_vertices(), 4);
        assert_eq!(map.graph().num_edges(), 4);

        let one = map.vertex(&1).unwrap();
        assert_eq!(map.coords(one), Some(Coord { lat: 51.0, lon: -8.0 }));
        assert_eq!(map.coords(map.vertex(&3).unwrap()), None);
    }

    #[test]
    fn weighting_selects_the_edge_field() {
        let by_time = read_route_map(SIMPLE_ROUTE.as_bytes(), Weighting::Time).unwrap();
        let by_length = read_route_map(SIMPLE_ROUTE.as_bytes(), Weighting::Length).unwrap();

        let route = |map: &RouteMap<i64>| {
            let path = map
                .shortest_path(map.vertex(&1).unwrap(), map.vertex(&4).unwrap())
                .unwrap();
            let labels: Vec<i64> = path.iter().map(|w| *map.label(w.vertex).unwrap()).collect();
            (labels, path.last().unwrap().cost)
        };
        assert_eq!(route(&by_time), (vec![1, 2, 3, 4], 4.0));
        assert_eq!(route(&by_length), (vec![1, 3, 4], 20.0));
    }

    #[test]
    fn missing_weight_field_is_reported_with_line() {
        let text = "Node\nid: 1\nNode\nid: 2\nEdge\nfrom: 1\nto: 2\nlength: 3.0\n";
        let err = read_route_map(text.as_bytes(), Weighting::Time).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 5, .. }), "{err}");
    }

    #[test]
    fn unknown_node_and_stray_lines() {
        let text = "Node\nid: 1\nEdge\nfrom: 1\nto: 9\ntime: 1.0\n";
        assert!(matches!(
            read_route_map(text.as_bytes(), Weighting::Time),
            Err(Error::Parse { line: 3, .. })
        ));
        assert!(matches!(
            read_route_map("id: 1\n".as_bytes(), Weighting::Time),
            Err(Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let text = "Node\nid: 1\nNode\nid: 2\nEdge\nfrom: 1\nto: 2\ntime: -1.0\n";
        assert!(matches!(
            read_route_map(text.as_bytes(), Weighting::Time),
            Err(Error::Parse { line: 5, .. })
        ));
    }

    #[test]
    fn reads_csv_edge_list() {
        let csv = "node_id,neighbor_id,weight\n0,1,1.5\n1,2,2.0\n0,2,5.0\n7,8,1.0\n";
        let map = read_csv_edges(csv.as_bytes()).unwrap();
        assert_eq!(map.graph().num_vertices(), 5);
        assert_eq!(map.graph().num_edges(), 4);

        let table = map.dijkstra(map.vertex(&0).unwrap()).unwrap();
        assert_eq!(table.distance(map.vertex(&2).unwrap()), Some(3.5));
        assert!(!table.contains(map.vertex(&7).unwrap()));
    }

    #[test]
    fn csv_self_loop_rows_are_skipped() {
        let csv = "node_id,neighbor_id,weight\n0,1,1.0\n1,1,2.0\n1,2,3.0\n";
        let map = read_csv_edges(csv.as_bytes()).unwrap();
        assert_eq!(map.graph().num_vertices(), 3);
        assert_eq!(map.graph().num_edges(), 2);
        let one = map.vertex(&1).unwrap();
        assert!(map.graph().get_edge(one, one).is_none());
    }

    #[test]
    fn bad_csv_value() {
        let csv = "node_id,neighbor_id,weight\n0,1,abc\n";
        assert!(matches!(
            read_csv_edges(csv.as_bytes()),
            Err(Error::Parse { line: 2, .. })
        ));
    }
}
