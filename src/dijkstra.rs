use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{Graph, VertexId, Weight};
use crate::heap::IndexedMinHeap;
use crate::path;

/// Lifecycle of one query. A finished engine has to be `reset` (or is reset by
/// the next `search`) before it runs again.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Initialized,
    Running,
    Done,
}

/// Outcome of one query. An unreachable target is a normal outcome: its
/// distance stays `f64::INFINITY` and `cost()` is `None`.
#[derive(Clone, Debug)]
pub struct ShortestPath {
    pub source: VertexId,
    pub target: Option<VertexId>,
    pub distances: Vec<Weight>,
    pub predecessors: Vec<Option<VertexId>>,
    pub nodes_explored: usize,
    pub elapsed: Duration,
}

impl ShortestPath {
    pub fn distance(&self, v: VertexId) -> Weight {
        self.distances.get(v).copied().unwrap_or(f64::INFINITY)
    }

    /// Cost to the target, `None` when there is no path (or no target).
    pub fn cost(&self) -> Option<Weight> {
        self.target
            .map(|t| self.distance(t))
            .filter(|d| d.is_finite())
    }

    pub fn is_reachable(&self) -> bool {
        self.cost().is_some()
    }

    /// Vertices from source to target.
    pub fn path(&self) -> Result<Vec<VertexId>> {
        let target = self.target.ok_or(Error::NoPathReconstructable {
            start: self.source,
            target: self.source,
        })?;
        self.path_to(target)
    }

    /// Vertices from source to any finalised `v`.
    pub fn path_to(&self, v: VertexId) -> Result<Vec<VertexId>> {
        path::reconstruct(&self.predecessors, self.source, v)
    }
}

/// Dijkstra over a read-only graph. Owns the per-query traversal state and the
/// indexed heap, so one engine serves one query at a time; several engines may
/// share the same graph.
pub struct ShortestPathEngine<'g> {
    graph: &'g Graph,
    dist: Vec<Weight>,
    prev: Vec<Option<VertexId>>,
    visited: Vec<bool>,
    heap: IndexedMinHeap<Weight>,
    explored: usize,
    state: EngineState,
}

impl<'g> ShortestPathEngine<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let n = graph.capacity();
        Self {
            graph,
            dist: vec![f64::INFINITY; n],
            prev: vec![None; n],
            visited: vec![false; n],
            heap: IndexedMinHeap::new(n),
            explored: 0,
            state: EngineState::Initialized,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Vertices finalised so far in the current (or last) run.
    pub fn nodes_explored(&self) -> usize {
        self.explored
    }

    pub fn reset(&mut self) {
        self.dist.fill(f64::INFINITY);
        self.prev.fill(None);
        self.visited.fill(false);
        self.heap.clear();
        self.explored = 0;
        self.state = EngineState::Initialized;
    }

    /// Shortest path from `source` to `target`, stopping once `target` is final.
    pub fn search(&mut self, source: VertexId, target: VertexId) -> Result<ShortestPath> {
        self.check(target)?;
        self.run(source, Some(target))
    }

    /// Distances from `source` to every vertex.
    pub fn search_all(&mut self, source: VertexId) -> Result<ShortestPath> {
        self.run(source, None)
    }

    fn check(&self, v: VertexId) -> Result<()> {
        let capacity = self.graph.capacity();
        if v >= capacity {
            return Err(Error::IndexOutOfRange { index: v, capacity });
        }
        Ok(())
    }

    fn run(&mut self, source: VertexId, target: Option<VertexId>) -> Result<ShortestPath> {
        self.check(source)?;
        if self.state != EngineState::Initialized {
            self.reset();
        }
        let started = Instant::now();
        self.state = EngineState::Running;

        self.dist[source] = 0.0;
        self.heap.insert(source, 0.0)?;

        while !self.heap.is_empty() {
            let (u, _) = self.heap.extract_min()?;
            // The heap never holds a vertex twice, but a finalised vertex must
            // never be expanded again either way.
            if self.visited[u] {
                continue;
            }
            self.visited[u] = true;
            self.explored += 1;

            if Some(u) == target {
                break;
            }

            let graph = self.graph;
            let du = self.dist[u];
            for (v, w) in graph.neighbors(u) {
                if self.visited[v] {
                    continue;
                }
                let next = du + w;
                if next < self.dist[v] {
                    self.dist[v] = next;
                    self.prev[v] = Some(u);
                    self.heap.push_or_decrease(v, next)?;
                }
            }
        }

        self.state = EngineState::Done;
        let elapsed = started.elapsed();
        debug!(
            source,
            ?target,
            explored = self.explored,
            elapsed_us = elapsed.as_micros() as u64,
            "dijkstra finished"
        );

        Ok(ShortestPath {
            source,
            target,
            distances: self.dist.clone(),
            predecessors: self.prev.clone(),
            nodes_explored: self.explored,
            elapsed,
        })
    }
}

/// One-shot query on a fresh engine.
pub fn shortest_path(graph: &Graph, source: VertexId, target: VertexId) -> Result<ShortestPath> {
    ShortestPathEngine::new(graph).search(source, target)
}
