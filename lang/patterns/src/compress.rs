use std::collections::BTreeMap;

use k_lang_ast::{PatternId, Ports, Rel, Relations, VisitorMut};

use crate::HashMap;
use crate::forest::PatternNode;
use crate::graph::{Edges, PatternGraph};
use crate::kind::PatternKind;

/// The minimized presentation of a [PatternGraph].
///
/// Bisimilar roots share one node. Nodes and edges refer to positions in
/// [CompressedGraph::nodes].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressedGraph {
    pub nodes: Vec<PatternNode>,
    pub edges: Vec<Edges>,
    /// The compressed node of every pattern id of the source graph
    index: HashMap<PatternId, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Seed<'a> {
    Bound(&'a str),
    Single(PatternId),
    Shared,
}

type Signature<'a> = (usize, &'a PatternKind, Vec<(&'a str, usize)>);

impl PatternGraph {
    /// Merge all roots that no observation along edges can tell apart.
    ///
    /// Refinement starts with one class per code, one class per open root and one class
    /// for all other roots, and splits classes by kind and by the classes of their edge
    /// destinations until nothing changes.
    pub fn compressed(&self) -> CompressedGraph {
        let roots: Vec<PatternId> = self.roots().collect();

        let mut seeds: HashMap<Seed, usize> = HashMap::default();
        let mut class: HashMap<PatternId, usize> = HashMap::default();
        for root in &roots {
            let seed = match self.kind(*root) {
                PatternKind::Bound(name) => Seed::Bound(name),
                kind if kind.is_open() => Seed::Single(*root),
                _ => Seed::Shared,
            };
            let next = seeds.len();
            class.insert(*root, *seeds.entry(seed).or_insert(next));
        }
        let mut count = seeds.len();

        loop {
            let mut signatures: HashMap<Signature, usize> = HashMap::default();
            let mut refined: HashMap<PatternId, usize> = HashMap::default();
            for root in &roots {
                let signature = (class[root], self.kind(*root), self.edge_classes(*root, &class));
                let next = signatures.len();
                refined.insert(*root, *signatures.entry(signature).or_insert(next));
            }
            class = refined;
            // Classes only ever split, so an equal count means a stable partition
            if signatures.len() == count {
                break;
            }
            log::trace!("Refined {} pattern classes into {}", count, signatures.len());
            count = signatures.len();
        }

        let mut nodes: Vec<Option<PatternNode>> = vec![None; count];
        let mut edges: Vec<Edges> = vec![Edges::new(); count];
        for root in &roots {
            let idx = class[root];
            if nodes[idx].is_none() {
                nodes[idx] = Some(self.node(*root).clone());
                edges[idx] = self
                    .edge_classes(*root, &class)
                    .into_iter()
                    .map(|(label, dst)| (label.to_owned(), dst))
                    .collect();
            }
        }
        let index = (0..self.len()).map(|id| (id, class[&self.find(id)])).collect();
        log::debug!("Compressed {} patterns into {}", self.len(), count);
        CompressedGraph { nodes: nodes.into_iter().flatten().collect(), edges, index }
    }

    fn edge_classes<'a>(&'a self, root: PatternId, class: &HashMap<PatternId, usize>) -> Vec<(&'a str, usize)> {
        self.edges(root).iter().map(|(label, dst)| (label.as_str(), class[&self.find(*dst)])).collect()
    }
}

impl CompressedGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The compressed node of a pattern id of the source graph
    pub fn get(&self, id: PatternId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn kind(&self, idx: usize) -> &PatternKind {
        &self.nodes[idx].kind
    }

    pub fn target(&self, idx: usize, label: &str) -> Option<usize> {
        self.edges[idx].get(label).copied()
    }

    /// Rewrite the ports of every expression node to compressed ids.
    pub fn annotate(&self, rels: &mut Relations) {
        for rel in rels.values_mut() {
            rel.walk_mut(&mut Reannotate { index: &self.index });
        }
    }
}

/// The ports of every expression node in pre-order, per definition
pub fn annotations(rels: &Relations) -> BTreeMap<&str, Vec<Ports>> {
    rels.iter()
        .map(|(name, rel)| {
            let mut ports = Vec::new();
            rel.for_each(|node| ports.extend(node.ports));
            (name.as_str(), ports)
        })
        .collect()
}

struct Reannotate<'i> {
    index: &'i HashMap<PatternId, usize>,
}

impl VisitorMut for Reannotate<'_> {
    fn enter_mut(&mut self, rel: &mut Rel) {
        if let Some(ports) = rel.ports.as_mut() {
            if let (Some(input), Some(output)) = (self.index.get(&ports.input), self.index.get(&ports.output)) {
                *ports = Ports { input: *input, output: *output };
            }
        }
    }
}
