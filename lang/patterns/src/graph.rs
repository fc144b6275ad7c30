use std::collections::BTreeMap;

use k_lang_ast::PatternId;
use k_lang_codes::{Code, CodeError, CodeLookup, Repository};

use crate::HashMap;
use crate::forest::{PatternForest, PatternNode};
use crate::kind::{PatternKind, Shape, VECTOR_MEMBER, is_member_label, join};
use crate::result::{PatResult, PatternError};

/// Outgoing edges of a pattern node: label to destination
pub type Edges = BTreeMap<String, PatternId>;

/// Patterns connected by labelled edges, merged through a [PatternForest].
///
/// Only the edges stored at a root are meaningful. Edge destinations may point to
/// non-root nodes; they are resolved with [PatternGraph::find] on every access.
#[derive(Debug, Clone, Default)]
pub struct PatternGraph {
    forest: PatternForest,
    edges: Vec<Edges>,
    /// The node created for each canonical code
    bound: HashMap<String, PatternId>,
}

impl PatternGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.forest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    pub fn find(&self, id: PatternId) -> PatternId {
        self.forest.find(id)
    }

    pub fn node(&self, id: PatternId) -> &PatternNode {
        self.forest.node(id)
    }

    /// The kind of the class of `id`
    pub fn kind(&self, id: PatternId) -> &PatternKind {
        &self.forest.node(self.find(id)).kind
    }

    /// The edges of the class of `id`
    pub fn edges(&self, id: PatternId) -> &Edges {
        &self.edges[self.find(id)]
    }

    /// The root reached from the class of `id` along `label`
    pub fn target(&self, id: PatternId, label: &str) -> Option<PatternId> {
        self.edges(id).get(label).map(|dst| self.find(*dst))
    }

    pub fn shape(&self, id: PatternId) -> Shape {
        let root = self.find(id);
        Shape { kind: self.forest.node(root).kind.clone(), labels: self.edges[root].keys().cloned().collect() }
    }

    /// All roots in ascending order
    pub fn roots(&self) -> impl Iterator<Item = PatternId> + '_ {
        (0..self.len()).filter(|id| self.forest.is_root(*id))
    }

    pub fn add_node<I: IntoIterator<Item = (String, PatternId)>>(
        &mut self,
        kind: PatternKind,
        edges: I,
    ) -> PatternId {
        let id = self.forest.add(kind, None);
        self.edges.push(edges.into_iter().collect());
        id
    }

    /// The node standing for the code `name`, whose edges lead to the nodes of the
    /// codes it references. There is one such node per code.
    pub fn bound_node(&mut self, repo: &Repository, name: &str) -> PatResult<PatternId> {
        let name = repo.canonical(name).ok_or_else(|| CodeError::unknown(name, None))?.to_owned();
        if let Some(id) = self.bound.get(&name) {
            return Ok(*id);
        }
        let id = self.add_node(PatternKind::Bound(name.clone()), []);
        self.bound.insert(name.clone(), id);

        let seeds: Vec<(String, String)> = match repo.find(&name) {
            CodeLookup::Code(Code::Product(fields) | Code::Union(fields)) => fields.into_iter().collect(),
            CodeLookup::Code(Code::Vector(elem)) => vec![(VECTOR_MEMBER.to_owned(), elem)],
            CodeLookup::Builtin(_) => vec![],
            CodeLookup::Undefined => return Err(CodeError::unknown(&name, None).into()),
        };
        for (label, code) in seeds {
            let dst = self.bound_node(repo, &code)?;
            self.edges[id].insert(label, dst);
        }
        Ok(id)
    }

    /// Merge the classes of `ids` into a new node holding the join of their shapes.
    ///
    /// The edges of the merged classes are combined per label; destinations that meet
    /// under the same label are unified in turn. If the join is a code, the classes
    /// are merged with the node of that code as well. Returns `false` if the ids
    /// belong to less than two classes.
    pub fn unify(&mut self, repo: &Repository, rule: &str, ids: &[PatternId]) -> PatResult<bool> {
        let mut roots: Vec<PatternId> = ids.iter().map(|id| self.find(*id)).collect();
        roots.sort_unstable();
        roots.dedup();
        if roots.len() < 2 {
            return Ok(false);
        }

        let mut joined = self.shape(roots[0]);
        for root in &roots[1..] {
            let other = self.shape(*root);
            let kind = join(&joined, &other, repo)
                .ok_or_else(|| PatternError::mismatch(rule, &joined, &other))?;
            let labels = joined.labels.into_iter().chain(other.labels);
            joined.labels = labels.map(|label| member_label(&kind, &label, repo)).collect();
            joined.kind = kind;
        }
        log::trace!("Unify {roots:?} as {joined} ({rule})");

        if let PatternKind::Bound(name) = &joined.kind {
            let bound = self.bound_node(repo, &name.clone())?;
            let bound = self.find(bound);
            if !roots.contains(&bound) {
                roots.push(bound);
            }
        }

        let mut targets: BTreeMap<String, Vec<PatternId>> = BTreeMap::new();
        for root in &roots {
            for (label, dst) in &self.edges[*root] {
                targets.entry(member_label(&joined.kind, label, repo)).or_default().push(*dst);
            }
        }

        let id = self.forest.link(joined.kind, rule, &roots)?;
        debug_assert_eq!(id, self.edges.len());
        self.edges.push(targets.iter().map(|(label, dsts)| (label.clone(), dsts[0])).collect());
        for dsts in targets.values().filter(|dsts| dsts.len() > 1) {
            self.unify(repo, rule, dsts)?;
        }
        Ok(true)
    }

    /// Add the edge `label -> dst` to the class of `src`.
    ///
    /// If the class already has an edge with this label, its destination is unified
    /// with `dst`. Otherwise only open patterns and vectors without element may gain
    /// an edge.
    pub fn add_edge(
        &mut self,
        repo: &Repository,
        rule: &str,
        src: PatternId,
        label: &str,
        dst: PatternId,
    ) -> PatResult<bool> {
        let root = self.find(src);
        let shape = self.shape(root);
        let label = member_label(&shape.kind, label, repo);
        if let Some(existing) = self.edges[root].get(&label).copied() {
            return self.unify(repo, rule, &[existing, dst]);
        }
        let allowed = shape.kind.is_open() || (shape.kind == PatternKind::Vector && label == VECTOR_MEMBER);
        if !allowed {
            return Err(PatternError::mismatch(rule, &shape, Shape::new(PatternKind::Unconstrained, [label])));
        }
        log::trace!("Edge {root} -{label}-> {dst} ({rule})");
        self.edges[root].insert(label, dst);
        Ok(true)
    }
}

/// Element labels of vectors are all represented by [VECTOR_MEMBER].
fn member_label(kind: &PatternKind, label: &str, repo: &Repository) -> String {
    let is_vector = match kind {
        PatternKind::Vector => true,
        PatternKind::Bound(name) => matches!(repo.find(name), CodeLookup::Code(Code::Vector(_))),
        _ => false,
    };
    if is_vector && is_member_label(label) { VECTOR_MEMBER.to_owned() } else { label.to_owned() }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k_lang_codes::{CodeDecl, Codes};

    use super::*;
    use PatternKind::*;

    fn nat_repo() -> (Repository, String) {
        let mut repo = Repository::new();
        let decls: BTreeMap<String, CodeDecl> = [(
            "nat".to_owned(),
            CodeDecl::from(&Code::Union(
                [("zero".to_owned(), "{}".to_owned()), ("succ".to_owned(), "nat".to_owned())]
                    .into_iter()
                    .collect(),
            )),
        )]
        .into_iter()
        .collect();
        let nat = repo.register(&decls).unwrap()["nat"].clone();
        (repo, nat)
    }

    #[test]
    fn unify_is_idempotent() {
        let repo = Repository::new();
        let mut graph = PatternGraph::new();
        let a = graph.add_node(Unconstrained, []);
        let b = graph.add_node(OpenProduct, []);
        assert!(!graph.unify(&repo, "test", &[a, a]).unwrap());
        assert!(graph.unify(&repo, "test", &[a, b]).unwrap());
        assert_eq!(graph.find(a), graph.len() - 1);
        let after_first = (graph.find(a), graph.edges(a).clone());
        assert!(!graph.unify(&repo, "test", &[b, a]).unwrap());
        assert_eq!((graph.find(b), graph.edges(b).clone()), after_first);
        assert_eq!(graph.kind(a), &OpenProduct);
    }

    #[test]
    fn closed_union_and_product_conflict() {
        let repo = Repository::new();
        let mut graph = PatternGraph::new();
        let x = graph.add_node(Unconstrained, []);
        let y = graph.add_node(Unconstrained, []);
        let union = graph.add_node(ClosedUnion, [("x".to_owned(), x), ("y".to_owned(), y)]);
        let product = graph.add_node(ClosedProduct, [("x".to_owned(), x), ("y".to_owned(), y)]);
        let err = graph.unify(&repo, "conflict", &[union, product]).unwrap_err();
        match *err {
            PatternError::StructuralMismatch { rule, lhs, rhs, .. } => {
                assert_eq!(rule, "conflict");
                assert_eq!(lhs, "<x, y>");
                assert_eq!(rhs, "{x, y}");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn shared_labels_are_unified() {
        let repo = Repository::new();
        let mut graph = PatternGraph::new();
        let p = graph.add_node(Unconstrained, []);
        let q = graph.add_node(Bound("@int".to_owned()), []);
        let a = graph.add_node(Unconstrained, [("x".to_owned(), p)]);
        let b = graph.add_node(OpenProduct, [("x".to_owned(), q)]);
        graph.unify(&repo, "test", &[a, b]).unwrap();
        let x = graph.target(a, "x").unwrap();
        assert_eq!(x, graph.find(p));
        assert_eq!(graph.kind(x), &Bound("@int".to_owned()));
        assert!(graph.find(a) > a.max(b));
    }

    #[test]
    fn binding_seeds_edges() {
        let (repo, nat) = nat_repo();
        let mut graph = PatternGraph::new();
        let pred = graph.add_node(Unconstrained, []);
        let value = graph.add_node(Unconstrained, [("succ".to_owned(), pred)]);
        let bound = graph.bound_node(&repo, &nat).unwrap();
        graph.unify(&repo, "test", &[value, bound]).unwrap();

        assert_eq!(graph.kind(pred), &Bound(nat.clone()));
        assert_eq!(graph.kind(graph.target(value, "zero").unwrap()), &Bound(repo.unit().to_owned()));
        assert_eq!(graph.find(pred), graph.find(value));
    }

    #[test]
    fn two_codes_never_merge() {
        let (repo, nat) = nat_repo();
        let mut graph = PatternGraph::new();
        let a = graph.bound_node(&repo, &nat).unwrap();
        let b = graph.bound_node(&repo, "{}").unwrap();
        let err = graph.unify(&repo, "test", &[a, b]).unwrap_err();
        assert!(matches!(*err, PatternError::StructuralMismatch { .. }));
    }

    #[test]
    fn numeric_labels_select_vector_elements() {
        let mut repo = Repository::new();
        let codes: Codes = [("ints".to_owned(), Code::Vector("@int".to_owned()))].into_iter().collect();
        let ints = repo.register_codes(codes).unwrap()["ints"].clone();

        let mut graph = PatternGraph::new();
        let input = graph.bound_node(&repo, &ints).unwrap();
        let output = graph.add_node(Unconstrained, []);
        graph.add_edge(&repo, "dot", input, "0", output).unwrap();
        assert_eq!(graph.kind(output), &Bound("@int".to_owned()));

        let closed = graph.add_node(ClosedProduct, []);
        let err = graph.add_edge(&repo, "dot", closed, "x", output).unwrap_err();
        assert!(matches!(*err, PatternError::StructuralMismatch { .. }));
    }

    #[test]
    fn unknown_codes_are_reported() {
        let repo = Repository::new();
        let mut graph = PatternGraph::new();
        let err = graph.bound_node(&repo, "missing").unwrap_err();
        assert!(matches!(*err, PatternError::Code(CodeError::UnknownCode { .. })));
    }
}
