//! Shortest paths on planar street graphs.
//!
//! A [`Graph`] is loaded once (usually from a `.poly` file through
//! [`poly::load_poly`]) and then answers any number of source/target queries.
//! Each query runs Dijkstra with an [`IndexedMinHeap`] that supports
//! decrease-key, and reports the cost, the number of vertices finalised, and
//! the predecessor links the path is rebuilt from.

pub mod dijkstra;
pub mod error;
pub mod geo;
pub mod graph;
pub mod heap;
pub mod path;
pub mod poly;
pub mod reference;
pub mod report;

pub use dijkstra::{shortest_path, EngineState, ShortestPath, ShortestPathEngine};
pub use error::{Error, Result};
pub use geo::{Point, UtmProjection};
pub use graph::{Graph, Vertex, VertexId, Weight};
pub use heap::IndexedMinHeap;
pub use path::reconstruct;
pub use poly::{load_poly, LoadedGraph, PolyDocument, PolyEdge, PolyVertex};
