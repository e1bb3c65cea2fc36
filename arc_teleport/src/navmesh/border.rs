use cgmath::{InnerSpace, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::WalkableMesh;

/// Undirected mesh edge, normalised so `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub min: u32,
    pub max: u32,
}

impl Edge {
    pub fn new(a: u32, b: u32) -> Self {
        Edge {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn touches(&self, vertex: u32) -> bool {
        self.min == vertex || self.max == vertex
    }

    /// The endpoint that isn't `vertex`.
    pub fn other(&self, vertex: u32) -> u32 {
        if self.min == vertex { self.max } else { self.min }
    }
}

/// One connected boundary polyline of a walkable mesh.
///
/// Closed loops repeat their first point at the end. Winding is whatever
/// order the walk found; callers must not rely on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderPointSet {
    pub points: Vec<Vector3<f32>>,
}

impl BorderPointSet {
    pub fn new(points: Vec<Vector3<f32>>) -> Self {
        Self { points }
    }

    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }

    pub fn edge_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).magnitude())
            .sum()
    }
}

/// Edges used by anything other than exactly two triangles, in first-seen
/// order.
///
/// Edges shared by three or more triangles are non-manifold; they are kept
/// as border edges rather than rejected.
pub fn border_edges(indices: &[u32]) -> Vec<Edge> {
    let mut counts: HashMap<Edge, u32> = HashMap::new();
    let mut seen_order = Vec::new();

    for triangle in indices.chunks_exact(3) {
        let (p1, p2, p3) = (triangle[0], triangle[1], triangle[2]);
        for edge in [Edge::new(p1, p2), Edge::new(p2, p3), Edge::new(p3, p1)] {
            let count = counts.entry(edge).or_insert(0);
            if *count == 0 {
                seen_order.push(edge);
            }
            *count += 1;
        }
    }

    seen_order
        .into_iter()
        .filter(|edge| counts[edge] != 2)
        .collect()
}

/// Walk border edges into vertex-index polylines.
///
/// Every edge is consumed by exactly one polyline. A walk stops when it
/// returns to its starting vertex or when no unvisited edge continues it.
pub fn border_loops(edges: &[Edge]) -> Vec<Vec<u32>> {
    let mut adjacency: HashMap<u32, Vec<usize>> = HashMap::new();
    for (slot, edge) in edges.iter().enumerate() {
        adjacency.entry(edge.min).or_default().push(slot);
        if edge.max != edge.min {
            adjacency.entry(edge.max).or_default().push(slot);
        }
    }

    let mut visited = vec![false; edges.len()];
    let mut loops = Vec::new();

    for start in 0..edges.len() {
        if visited[start] {
            continue;
        }

        let v_start = edges[start].min;
        let mut polyline = Vec::with_capacity(edges.len() - start + 1);
        polyline.push(v_start);
        polyline.push(edges[start].max);
        visited[start] = true;

        loop {
            let current = polyline[polyline.len() - 1];
            if current == v_start {
                break;
            }

            let next_edge = adjacency
                .get(&current)
                .and_then(|slots| slots.iter().copied().find(|&slot| !visited[slot]));

            match next_edge {
                Some(slot) => {
                    visited[slot] = true;
                    polyline.push(edges[slot].other(current));
                }
                None => {
                    crate::navmesh_log!(
                        warn,
                        "Border walk from vertex {} ended open after {} points",
                        v_start,
                        polyline.len()
                    );
                    break;
                }
            }
        }

        loops.push(polyline);
    }

    loops
}

/// Trace the boundary polylines of `mesh`: one per outer rim, hole or
/// disjoint island.
pub fn extract_borders(mesh: &WalkableMesh) -> Vec<BorderPointSet> {
    let edges = border_edges(&mesh.indices);
    let loops = border_loops(&edges);

    crate::navmesh_log!(
        debug,
        "Found {} border edges forming {} polylines",
        edges.len(),
        loops.len()
    );

    loops
        .into_iter()
        .map(|polyline| {
            BorderPointSet::new(
                polyline
                    .into_iter()
                    .map(|vertex| mesh.vertices[vertex as usize])
                    .collect(),
            )
        })
        .collect()
}
