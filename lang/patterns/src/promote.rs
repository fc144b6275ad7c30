use std::collections::BTreeSet;

use k_lang_ast::PatternId;
use k_lang_codes::{Code, CodeError, Codes, Fields, Repository};

use crate::HashMap;
use crate::graph::PatternGraph;
use crate::kind::{PatternKind, VECTOR_MEMBER};
use crate::result::PatResult;

/// A pattern that was turned into a code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    pub pattern: PatternId,
    /// Canonical name of the new code
    pub code: String,
}

/// Promote closed patterns that no open pattern can still change into codes.
pub fn promote_singletons(graph: &mut PatternGraph, repo: &mut Repository) -> PatResult<Vec<Promotion>> {
    let candidates = find_singleton_patterns(graph);
    turn_singleton_patterns_into_codes(graph, repo, &candidates)
}

/// The closed, unbound roots from which no ambiguous pattern is reachable.
pub fn find_singleton_patterns(graph: &PatternGraph) -> Vec<PatternId> {
    let roots: Vec<PatternId> = graph.roots().collect();

    let mut incoming: HashMap<PatternId, Vec<PatternId>> = HashMap::default();
    for root in &roots {
        for dst in graph.edges(*root).values() {
            incoming.entry(graph.find(*dst)).or_default().push(*root);
        }
    }

    let mut stack: Vec<PatternId> = roots.iter().copied().filter(|root| is_ambiguous(graph, *root)).collect();
    let mut tainted: BTreeSet<PatternId> = stack.iter().copied().collect();
    while let Some(id) = stack.pop() {
        for src in incoming.get(&id).into_iter().flatten() {
            if tainted.insert(*src) {
                stack.push(*src);
            }
        }
    }

    roots
        .into_iter()
        .filter(|root| !tainted.contains(root))
        .filter(|root| {
            matches!(graph.kind(*root), PatternKind::ClosedProduct | PatternKind::ClosedUnion | PatternKind::Vector)
        })
        .collect()
}

fn is_ambiguous(graph: &PatternGraph, root: PatternId) -> bool {
    match graph.kind(root) {
        PatternKind::Unconstrained
        | PatternKind::OpenProduct
        | PatternKind::OpenUnion
        | PatternKind::ClosedUntyped => true,
        PatternKind::Vector => graph.target(root, VECTOR_MEMBER).is_none(),
        PatternKind::ClosedProduct | PatternKind::ClosedUnion | PatternKind::Bound(_) => false,
    }
}

/// Register `candidates` as codes in one batch and bind each of them to its new name.
pub fn turn_singleton_patterns_into_codes(
    graph: &mut PatternGraph,
    repo: &mut Repository,
    candidates: &[PatternId],
) -> PatResult<Vec<Promotion>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    let local = |id: PatternId| format!(":P{id}");
    let reference = |dst: PatternId| match graph.kind(dst) {
        PatternKind::Bound(name) => name.clone(),
        _ => local(graph.find(dst)),
    };

    let mut codes = Codes::new();
    for id in candidates {
        let fields = || -> Fields {
            graph.edges(*id).iter().map(|(label, dst)| (label.clone(), reference(*dst))).collect()
        };
        let code = match graph.kind(*id) {
            PatternKind::ClosedProduct => Code::Product(fields()),
            PatternKind::ClosedUnion => Code::Union(fields()),
            PatternKind::Vector => {
                let member = graph
                    .target(*id, VECTOR_MEMBER)
                    .ok_or_else(|| CodeError::impossible(format!("vector pattern {id} without element")))?;
                Code::Vector(reference(member))
            }
            other => {
                return Err(CodeError::impossible(format!("pattern {id} of kind {other:?} is not promotable")).into());
            }
        };
        codes.insert(local(*id), code);
    }

    let representatives = repo.register_codes(codes)?;
    let mut promoted = Vec::with_capacity(candidates.len());
    for id in candidates {
        let name = local(*id);
        let code = representatives
            .get(&name)
            .ok_or_else(|| CodeError::impossible(format!("{name} lost its representative")))?
            .clone();
        let bound = graph.bound_node(repo, &code)?;
        graph.unify(repo, "promote", &[*id, bound])?;
        promoted.push(Promotion { pattern: *id, code });
    }
    log::debug!("Promoted {} patterns to codes", promoted.len());
    Ok(promoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use PatternKind::*;

    #[test]
    fn open_fields_block_promotion() {
        let repo = Repository::new();
        let mut graph = PatternGraph::new();
        let int = graph.bound_node(&repo, "@int").unwrap();
        let open = graph.add_node(Unconstrained, []);
        let closed = graph.add_node(ClosedProduct, [("x".to_owned(), int)]);
        let blocked = graph.add_node(ClosedProduct, [("x".to_owned(), int), ("y".to_owned(), open)]);
        let outer = graph.add_node(ClosedUnion, [("b".to_owned(), blocked)]);
        assert_eq!(find_singleton_patterns(&graph), vec![closed]);
        assert!(!find_singleton_patterns(&graph).contains(&outer));
    }

    #[test]
    fn vectors_need_an_element() {
        let repo = Repository::new();
        let mut graph = PatternGraph::new();
        let int = graph.bound_node(&repo, "@int").unwrap();
        let empty = graph.add_node(Vector, []);
        let ints = graph.add_node(Vector, [(VECTOR_MEMBER.to_owned(), int)]);
        let candidates = find_singleton_patterns(&graph);
        assert_eq!(candidates, vec![ints]);
        assert!(!candidates.contains(&empty));
    }

    #[test]
    fn promoted_products_keep_their_labels() {
        let mut repo = Repository::new();
        let mut graph = PatternGraph::new();
        let int = graph.bound_node(&repo, "@int").unwrap();
        let ints = graph.add_node(Vector, [(VECTOR_MEMBER.to_owned(), int)]);
        let pair = graph.add_node(ClosedProduct, [("x".to_owned(), int), ("xs".to_owned(), ints)]);

        let promoted = promote_singletons(&mut graph, &mut repo).unwrap();
        assert_eq!(promoted.len(), 2);

        let pair_code = &promoted.iter().find(|p| p.pattern == pair).unwrap().code;
        let ints_code = &promoted.iter().find(|p| p.pattern == ints).unwrap().code;
        let Some(Code::Product(fields)) = repo.find(pair_code).code() else {
            panic!("expected a product");
        };
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["x", "xs"]);
        assert_eq!(fields["x"], "@int");
        assert_eq!(&fields["xs"], ints_code);
        assert_eq!(repo.find(ints_code).code(), Some(Code::Vector("@int".to_owned())));
        assert_eq!(graph.kind(pair), &Bound(pair_code.clone()));
    }

    #[test]
    fn nothing_to_promote() {
        let mut repo = Repository::new();
        let mut graph = PatternGraph::new();
        graph.add_node(Unconstrained, []);
        assert!(promote_singletons(&mut graph, &mut repo).unwrap().is_empty());
        assert_eq!(repo.len(), 1);
    }
}
