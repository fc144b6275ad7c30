use std::collections::VecDeque;
use std::hash::Hash;

use crate::scc::sccs_by_index;
use crate::{Graph, HashSet};

/// Topological order with dependency leaves first.
///
/// Kahn's algorithm seeded from the vertices without outgoing edges, walking edges
/// backwards: when a vertex is emitted, the out-degree of each of its predecessors is
/// decremented. If an edge `a -> b` means "`a` references `b`", then `b` is emitted
/// before `a`.
///
/// Vertices that lie on a cycle (or can reach one) are never emitted; comparing the
/// length of the result with the number of vertices detects cycles.
pub fn topo_order<V: Clone + Eq + Hash>(graph: &Graph<V>) -> Vec<V> {
    topo_order_by_index(graph).into_iter().map(|idx| graph.vertex(idx).clone()).collect()
}

fn topo_order_by_index<V: Clone + Eq + Hash>(graph: &Graph<V>) -> Vec<usize> {
    let mut out_degree: Vec<usize> = (0..graph.len()).map(|idx| graph.out_edges(idx).len()).collect();
    let mut queue: VecDeque<usize> = (0..graph.len()).filter(|idx| out_degree[*idx] == 0).collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(v) = queue.pop_front() {
        order.push(v);
        for edge in graph.in_edges(v) {
            let (u, _) = graph.ends(*edge);
            out_degree[u] -= 1;
            if out_degree[u] == 0 {
                queue.push_back(u);
            }
        }
    }

    order
}

/// The DAG of strongly connected components of a graph.
#[derive(Debug, Clone)]
pub struct Condensation<V> {
    /// The components, indexed by their position
    pub components: Vec<Vec<V>>,
    /// Edges between distinct components, at most one per pair
    pub graph: Graph<usize>,
}

impl<V: Clone + Eq + Hash> Condensation<V> {
    /// The components in dependency order: a component comes after every component it
    /// has an edge to.
    pub fn leaves_first(&self) -> Vec<&[V]> {
        topo_order(&self.graph).into_iter().map(|idx| self.components[idx].as_slice()).collect()
    }
}

/// Collapse every strongly connected component of `graph` into a single vertex.
pub fn condensation<V: Clone + Eq + Hash>(graph: &Graph<V>) -> Condensation<V> {
    let index_sccs = sccs_by_index(graph);
    let mut component_of = vec![0; graph.len()];
    for (component, members) in index_sccs.iter().enumerate() {
        for member in members {
            component_of[*member] = component;
        }
    }

    let mut seen = HashSet::default();
    let mut edges = Vec::new();
    for idx in 0..graph.len() {
        for edge in graph.out_edges(idx) {
            let (src, dst) = graph.ends(*edge);
            let (src, dst) = (component_of[src], component_of[dst]);
            if src != dst && seen.insert((src, dst)) {
                edges.push((src, dst));
            }
        }
    }

    let components: Vec<Vec<V>> = index_sccs
        .into_iter()
        .map(|scc| scc.into_iter().map(|idx| graph.vertex(idx).clone()).collect())
        .collect();
    let graph = Graph::with_vertices(0..components.len(), edges);
    Condensation { components, graph }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_come_first() {
        let graph = Graph::new([("main", "f"), ("f", "g"), ("main", "g")]);
        assert_eq!(topo_order(&graph), vec!["g", "f", "main"]);
    }

    #[test]
    fn cycles_are_not_emitted() {
        let graph = Graph::new([("a", "b"), ("b", "a"), ("c", "a"), ("d", "e")]);
        let order = topo_order(&graph);
        assert_eq!(order, vec!["e", "d"]);
        assert!(order.len() < graph.vertices().len());
    }

    #[test]
    fn condensation_orders_components() {
        let graph = Graph::new([("main", "f"), ("f", "g"), ("g", "f"), ("g", "h"), ("h", "h")]);
        let condensed = condensation(&graph);
        assert_eq!(condensed.components.len(), 3);

        let order: Vec<Vec<&str>> = condensed
            .leaves_first()
            .into_iter()
            .map(|scc| {
                let mut scc = scc.to_vec();
                scc.sort();
                scc
            })
            .collect();
        assert_eq!(order, vec![vec!["h"], vec!["f", "g"], vec!["main"]]);
    }
}
