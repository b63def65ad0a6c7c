use crate::error::{Error, Result};
use crate::graph::VertexId;

/// Walks predecessor links back from `target` and returns the vertices in
/// source-to-target order. Only meaningful once a path is known to exist.
///
/// Fails if the walk stops anywhere but `source`, or runs for more steps than
/// there are vertices (a cycle in the predecessor links).
pub fn reconstruct(
    predecessors: &[Option<VertexId>],
    source: VertexId,
    target: VertexId,
) -> Result<Vec<VertexId>> {
    let broken = || Error::NoPathReconstructable {
        start: source,
        target,
    };
    if target >= predecessors.len() {
        return Err(broken());
    }

    let mut path = vec![target];
    let mut cur = target;
    while let Some(prev) = predecessors[cur] {
        if path.len() > predecessors.len() || prev >= predecessors.len() {
            return Err(broken());
        }
        path.push(prev);
        cur = prev;
    }
    if cur != source {
        return Err(broken());
    }
    path.reverse();
    Ok(path)
}
