//! In-memory planar graph.
//!
//! Loading is a two-phase batch: the vertex capacity is fixed up front, every
//! vertex is registered, then edges are added. Edge weights are the Euclidean
//! distance between the endpoints and are computed once, on insertion.

use crate::error::{Error, Result};
use crate::geo::Point;

pub type VertexId = usize;
pub type Weight = f64;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub point: Point,
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    vertices: Vec<Option<Vertex>>,
    adjacency: Vec<Vec<(VertexId, Weight)>>,
    arcs: usize,
}

impl Graph {
    /// An empty graph that can hold vertices `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: vec![None; capacity],
            adjacency: vec![Vec::new(); capacity],
            arcs: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.vertices.len()
    }

    /// Number of registered vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_some()).count()
    }

    /// Number of adjacency entries. An undirected edge counts twice.
    pub fn arc_count(&self) -> usize {
        self.arcs
    }

    /// Registers vertex `id` at `(x, y)`. Coordinates must be finite so every
    /// edge weight is a finite, non-negative distance.
    pub fn add_vertex(&mut self, id: VertexId, x: f64, y: f64) -> Result<()> {
        let capacity = self.capacity();
        let slot = self
            .vertices
            .get_mut(id)
            .ok_or(Error::IndexOutOfRange { index: id, capacity })?;
        if slot.is_some() {
            return Err(Error::DuplicateVertex(id as i64));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::NonFiniteCoordinate(id));
        }
        *slot = Some(Vertex {
            id,
            point: Point::new(x, y),
        });
        Ok(())
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.vertex(id).is_some()
    }

    fn point(&self, id: VertexId) -> Result<Point> {
        self.vertex(id)
            .map(|v| v.point)
            .ok_or(Error::UnknownVertex(id as i64))
    }

    /// Adds `from -> to`, and `to -> from` as well unless `directed`.
    /// Returns the cached weight.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, directed: bool) -> Result<Weight> {
        let weight = self.point(from)?.distance(&self.point(to)?);
        self.adjacency[from].push((to, weight));
        self.arcs += 1;
        if !directed {
            self.adjacency[to].push((from, weight));
            self.arcs += 1;
        }
        Ok(weight)
    }

    /// Outgoing `(neighbor, weight)` pairs of `v`, in insertion order.
    /// Empty for ids outside the graph.
    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = (VertexId, Weight)> + Clone + '_ {
        self.adjacency
            .get(v)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .copied()
    }

    /// Weight of the cheapest `from -> to` arc, if one exists.
    pub fn edge_weight(&self, from: VertexId, to: VertexId) -> Option<Weight> {
        self.neighbors(from)
            .filter(|&(v, _)| v == to)
            .map(|(_, w)| w)
            .reduce(f64::min)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter().flatten()
    }
}
