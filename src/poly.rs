//! Reader and writer for the tab separated `.poly` street-graph format:
//!
//! ```text
//! <vertexCount> <dim> <attrCount> <hasBoundaryMarker>
//! <id> <x> <y>                                     (vertexCount rows)
//! <edgeCount> <boundaryMarkerCount>
//! <edgeId> <fromId> <toId> <directionFlag>         (edgeCount rows)
//! 0
//! ```
//!
//! Tokens may be separated by any whitespace. A direction flag of 0 means the
//! edge is two-way; anything else means `from -> to` only. Vertex ids in the
//! file are external ids; internal indices are assigned in file order.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

use fnv::FnvHashMap;
use tracing::info;

use crate::error::{Error, Result};
use crate::geo::Point;
use crate::graph::{Graph, VertexId};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PolyVertex {
    pub id: i64,
    pub point: Point,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PolyEdge {
    pub id: i64,
    pub from: i64,
    pub to: i64,
    pub directed: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyDocument {
    pub vertices: Vec<PolyVertex>,
    pub edges: Vec<PolyEdge>,
}

/// A graph built from a `.poly` document, with the id translation in both
/// directions.
#[derive(Clone, Debug)]
pub struct LoadedGraph {
    pub graph: Graph,
    external_ids: Vec<i64>,
    index: FnvHashMap<i64, VertexId>,
}

impl LoadedGraph {
    pub fn internal(&self, external: i64) -> Option<VertexId> {
        self.index.get(&external).copied()
    }

    pub fn external(&self, v: VertexId) -> Option<i64> {
        self.external_ids.get(v).copied()
    }
}

struct Tokens<'a> {
    tokens: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let tokens = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |t| (i + 1, t)))
            .collect();
        Self { tokens, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    fn read<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let Some(&(line, token)) = self.tokens.get(self.pos) else {
            let line = self.tokens.last().map(|t| t.0).unwrap_or(0);
            return Err(Error::Parse {
                line,
                message: format!("expected {}, found end of input", what),
            });
        };
        self.pos += 1;
        token.parse().map_err(|_| Error::Parse {
            line,
            message: format!("invalid {}: {:?}", what, token),
        })
    }

    fn coordinate(&mut self, what: &str) -> Result<f64> {
        let line = self.tokens.get(self.pos).map(|t| t.0).unwrap_or(0);
        let value: f64 = self.read(what)?;
        if !value.is_finite() {
            return Err(Error::Parse {
                line,
                message: format!("{} is not finite", what),
            });
        }
        Ok(value)
    }
}

impl PolyDocument {
    pub fn parse<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse_str(&text)
    }

    pub fn parse_str(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);

        let vertex_count: usize = tokens.read("vertex count")?;
        let _dim: i64 = tokens.read("dimension")?;
        let _attrs: i64 = tokens.read("attribute count")?;
        let _marker: i64 = tokens.read("boundary marker flag")?;

        let mut vertices = Vec::with_capacity(vertex_count.min(tokens.remaining() / 3));
        for _ in 0..vertex_count {
            let id = tokens.read("vertex id")?;
            let x = tokens.coordinate("vertex x")?;
            let y = tokens.coordinate("vertex y")?;
            vertices.push(PolyVertex {
                id,
                point: Point::new(x, y),
            });
        }

        let edge_count: usize = tokens.read("edge count")?;
        let _markers: i64 = tokens.read("boundary marker count")?;

        let mut edges = Vec::with_capacity(edge_count.min(tokens.remaining() / 4));
        for _ in 0..edge_count {
            let id = tokens.read("edge id")?;
            let from = tokens.read("edge source")?;
            let to = tokens.read("edge target")?;
            let flag: i64 = tokens.read("direction flag")?;
            edges.push(PolyEdge {
                id,
                from,
                to,
                directed: flag != 0,
            });
        }

        // The trailing zero marker is optional, and anything after it is ignored.
        Ok(Self { vertices, edges })
    }

    pub fn write<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "{}\t{}\t{}\t{}", self.vertices.len(), 2, 0, 1)?;
        for v in &self.vertices {
            writeln!(out, "{}\t{:.6}\t{:.6}", v.id, v.point.x, v.point.y)?;
        }
        writeln!(out, "{}\t{}", self.edges.len(), 1)?;
        for e in &self.edges {
            writeln!(out, "{}\t{}\t{}\t{}", e.id, e.from, e.to, u8::from(e.directed))?;
        }
        writeln!(out, "0")?;
        out.flush()?;
        Ok(())
    }

    /// Validates ids and builds the graph. Duplicate vertex ids and edges that
    /// reference unknown vertices are rejected here.
    pub fn into_graph(self) -> Result<LoadedGraph> {
        let mut graph = Graph::with_capacity(self.vertices.len());
        let mut index: FnvHashMap<i64, VertexId> = FnvHashMap::default();
        let mut external_ids = Vec::with_capacity(self.vertices.len());

        for v in &self.vertices {
            let idx = external_ids.len();
            if index.insert(v.id, idx).is_some() {
                return Err(Error::DuplicateVertex(v.id));
            }
            external_ids.push(v.id);
            graph.add_vertex(idx, v.point.x, v.point.y)?;
        }

        for e in &self.edges {
            let from = *index.get(&e.from).ok_or(Error::UnknownVertex(e.from))?;
            let to = *index.get(&e.to).ok_or(Error::UnknownVertex(e.to))?;
            graph.add_edge(from, to, e.directed)?;
        }

        Ok(LoadedGraph {
            graph,
            external_ids,
            index,
        })
    }
}

/// Reads, validates and builds the graph stored at `path`.
pub fn load_poly<P: AsRef<Path>>(path: P) -> Result<LoadedGraph> {
    let path = path.as_ref();
    let doc = PolyDocument::parse(BufReader::new(File::open(path)?))?;
    let (vertices, edges) = (doc.vertices.len(), doc.edges.len());
    let loaded = doc.into_graph()?;
    info!(
        path = %path.display(),
        vertices,
        edges,
        arcs = loaded.graph.arc_count(),
        "loaded graph"
    );
    Ok(loaded)
}
