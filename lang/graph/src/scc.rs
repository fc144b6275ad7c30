use std::hash::Hash;

use crate::Graph;

/// Compute the strongly connected components of `graph` with Tarjan's algorithm.
///
/// Every vertex ends up in exactly one component. Components are returned in the
/// order in which Tarjan's algorithm completes them, i.e. a component is emitted only
/// after every component reachable from it.
pub fn sccs<V: Clone + Eq + Hash>(graph: &Graph<V>) -> Vec<Vec<V>> {
    sccs_by_index(graph)
        .into_iter()
        .map(|scc| scc.into_iter().map(|idx| graph.vertex(idx).clone()).collect())
        .collect()
}

/// Tarjan's algorithm with an explicit call stack, so that deep reference chains
/// cannot exhaust the native stack.
pub(crate) fn sccs_by_index<V: Clone + Eq + Hash>(graph: &Graph<V>) -> Vec<Vec<usize>> {
    let n = graph.len();
    let mut disc: Vec<Option<usize>> = vec![None; n];
    let mut low = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut time = 0;
    let mut result = Vec::new();

    for root in 0..n {
        if disc[root].is_some() {
            continue;
        }
        // Each frame holds a vertex and the position of the next outgoing edge to explore
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
        disc[root] = Some(time);
        low[root] = time;
        time += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(frame) = frames.last_mut() {
            let u = frame.0;
            if let Some(edge) = graph.out_edges(u).get(frame.1) {
                frame.1 += 1;
                let (_, v) = graph.ends(*edge);
                match disc[v] {
                    None => {
                        disc[v] = Some(time);
                        low[v] = time;
                        time += 1;
                        stack.push(v);
                        on_stack[v] = true;
                        frames.push((v, 0));
                    }
                    Some(d) if on_stack[v] => low[u] = low[u].min(d),
                    Some(_) => {}
                }
                continue;
            }

            frames.pop();
            if let Some((parent, _)) = frames.last() {
                low[*parent] = low[*parent].min(low[u]);
            }
            if disc[u] == Some(low[u]) {
                let mut scc = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    scc.push(w);
                    if w == u {
                        break;
                    }
                }
                log::trace!("Completed component of size {}", scc.len());
                result.push(scc);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut sccs: Vec<Vec<&'static str>>) -> Vec<Vec<&'static str>> {
        for scc in sccs.iter_mut() {
            scc.sort();
        }
        sccs.sort();
        sccs
    }

    #[test]
    fn finds_cycles() {
        let graph = Graph::new([("a", "b"), ("b", "a"), ("b", "c"), ("c", "d"), ("d", "c")]);
        assert_eq!(sorted(sccs(&graph)), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn isolated_and_acyclic_vertices_are_singletons() {
        let graph = Graph::with_vertices(["x"], [("a", "b"), ("b", "c")]);
        assert_eq!(sorted(sccs(&graph)), vec![vec!["a"], vec!["b"], vec!["c"], vec!["x"]]);
    }

    #[test]
    fn self_loop_is_its_own_component() {
        let graph = Graph::new([("a", "a"), ("a", "b")]);
        assert_eq!(sorted(sccs(&graph)), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn sinks_complete_first() {
        let graph = Graph::new([("main", "f"), ("f", "g"), ("g", "f"), ("g", "h")]);
        let result = sccs(&graph);
        let position = |name: &str| result.iter().position(|scc| scc.contains(&name));
        assert!(position("h") < position("f"));
        assert!(position("f") < position("main"));
        assert_eq!(position("f"), position("g"));
    }

    #[test]
    fn long_chains_do_not_recurse() {
        let edges: Vec<(usize, usize)> = (0..100_000).map(|i| (i, i + 1)).collect();
        let graph = Graph::new(edges);
        assert_eq!(sccs(&graph).len(), 100_001);
    }
}
