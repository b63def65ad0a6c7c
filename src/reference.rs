/*
Dense V x V weight matrix with a linear-scan Dijkstra. O(V^2) per source, so it
is only meant for cross-checking the heap-based engine on small graphs.
*/

use crate::graph::{Graph, VertexId, Weight};

pub struct DenseMatrix {
    n: usize,
    weights: Vec<Weight>,
}

/// Distances, predecessors and the number of finalised vertices.
pub struct MatrixSearch {
    pub distances: Vec<Weight>,
    pub predecessors: Vec<Option<VertexId>>,
    pub explored: usize,
}

impl DenseMatrix {
    pub fn from_graph(graph: &Graph) -> Self {
        let n = graph.capacity();
        let mut weights = vec![f64::INFINITY; n * n];
        for u in 0..n {
            for (v, w) in graph.neighbors(u) {
                // Parallel arcs collapse to the cheapest one.
                let cell = &mut weights[u * n + v];
                *cell = cell.min(w);
            }
        }
        Self { n, weights }
    }

    pub fn weight(&self, u: VertexId, v: VertexId) -> Weight {
        self.weights[u * self.n + v]
    }

    pub fn shortest_from(&self, source: VertexId) -> MatrixSearch {
        let n = self.n;
        let mut distances = vec![f64::INFINITY; n];
        let mut predecessors = vec![None; n];
        let mut visited = vec![false; n];
        let mut explored = 0;
        if source >= n {
            return MatrixSearch {
                distances,
                predecessors,
                explored,
            };
        }
        distances[source] = 0.0;

        for _ in 0..n {
            let next = (0..n)
                .filter(|&j| !visited[j] && distances[j].is_finite())
                .min_by(|&a, &b| distances[a].total_cmp(&distances[b]));
            let Some(u) = next else {
                break;
            };
            visited[u] = true;
            explored += 1;

            for v in 0..n {
                let w = self.weight(u, v);
                if w.is_finite() && distances[u] + w < distances[v] {
                    distances[v] = distances[u] + w;
                    predecessors[v] = Some(u);
                }
            }
        }

        MatrixSearch {
            distances,
            predecessors,
            explored,
        }
    }
}
