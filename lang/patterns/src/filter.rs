use std::collections::BTreeMap;

use k_lang_ast::{FieldsFilter, FieldsKind, Filter, PatternId};
use k_lang_codes::{Code, CodeError, CodeLookup, Repository};

use crate::graph::PatternGraph;
use crate::kind::{PatternKind, VECTOR_MEMBER};
use crate::result::PatResult;

/// Variable bindings of a successful filter match: variable to canonical code
pub type Bindings = BTreeMap<String, String>;

/// Match the code `code` against `filter`.
///
/// Returns the code bound to each variable of the filter, or `None` if the code does
/// not have the required shape. A variable occurring more than once must match the
/// same code everywhere.
pub fn match_code(repo: &Repository, code: &str, filter: &Filter) -> Option<Bindings> {
    let mut bindings = Bindings::new();
    matches(repo, code, filter, &mut bindings).then_some(bindings)
}

fn matches(repo: &Repository, code: &str, filter: &Filter, bindings: &mut Bindings) -> bool {
    let Some(code) = repo.canonical(code) else {
        return false;
    };
    match filter {
        Filter::Var(name) => match bindings.get(name) {
            Some(bound) => bound == code,
            None => {
                bindings.insert(name.clone(), code.to_owned());
                true
            }
        },
        Filter::Code(name) => repo.canonical(name) == Some(code),
        Filter::Fields(FieldsFilter { kind, fields, open }) => {
            let code_fields = match (kind, repo.find(code)) {
                (FieldsKind::Any | FieldsKind::Product, CodeLookup::Code(Code::Product(f))) => f,
                (FieldsKind::Any | FieldsKind::Union, CodeLookup::Code(Code::Union(f))) => f,
                _ => return false,
            };
            if !open && code_fields.len() != fields.len() {
                return false;
            }
            fields.iter().all(|(label, filter)| {
                code_fields.get(label).is_some_and(|field| matches(repo, field, filter, bindings))
            })
        }
        Filter::Vector(elem) => match repo.find(code) {
            CodeLookup::Code(Code::Vector(elem_code)) => matches(repo, &elem_code, elem, bindings),
            _ => false,
        },
    }
}

/// Build the pattern described by `filter`. Occurrences of one variable share a node.
pub fn filter_node(graph: &mut PatternGraph, repo: &Repository, filter: &Filter) -> PatResult<PatternId> {
    let mut vars = BTreeMap::new();
    build(graph, repo, filter, &mut vars)
}

fn build<'f>(
    graph: &mut PatternGraph,
    repo: &Repository,
    filter: &'f Filter,
    vars: &mut BTreeMap<&'f str, PatternId>,
) -> PatResult<PatternId> {
    match filter {
        Filter::Var(name) => {
            if let Some(id) = vars.get(name.as_str()) {
                return Ok(*id);
            }
            let id = graph.add_node(PatternKind::Unconstrained, []);
            vars.insert(name, id);
            Ok(id)
        }
        Filter::Code(name) => {
            let name = repo.canonical(name).ok_or_else(|| CodeError::unknown(name, None))?;
            graph.bound_node(repo, name)
        }
        Filter::Fields(FieldsFilter { kind, fields, open }) => {
            let kind = match (kind, open) {
                (FieldsKind::Any, true) => PatternKind::Unconstrained,
                (FieldsKind::Any, false) => PatternKind::ClosedUntyped,
                (FieldsKind::Product, true) => PatternKind::OpenProduct,
                (FieldsKind::Product, false) => PatternKind::ClosedProduct,
                (FieldsKind::Union, true) => PatternKind::OpenUnion,
                (FieldsKind::Union, false) => PatternKind::ClosedUnion,
            };
            let mut edges = Vec::with_capacity(fields.len());
            for (label, filter) in fields {
                edges.push((label.clone(), build(graph, repo, filter, vars)?));
            }
            Ok(graph.add_node(kind, edges))
        }
        Filter::Vector(elem) => {
            let member = build(graph, repo, elem, vars)?;
            Ok(graph.add_node(PatternKind::Vector, [(VECTOR_MEMBER.to_owned(), member)]))
        }
    }
}

#[cfg(test)]
mod tests {
    use k_lang_codes::{CodeDecl, Representatives};

    use super::*;

    fn repo() -> (Repository, Representatives) {
        let mut repo = Repository::new();
        let decls: BTreeMap<String, CodeDecl> = [
            ("int".to_owned(), CodeDecl::Builtin("@int".to_owned())),
            (
                "pair".to_owned(),
                CodeDecl::from(&Code::Product(
                    [("x".to_owned(), "int".to_owned()), ("y".to_owned(), "int".to_owned())]
                        .into_iter()
                        .collect(),
                )),
            ),
            (
                "mixed".to_owned(),
                CodeDecl::from(&Code::Product(
                    [("x".to_owned(), "int".to_owned()), ("y".to_owned(), "ints".to_owned())]
                        .into_iter()
                        .collect(),
                )),
            ),
            ("ints".to_owned(), CodeDecl::from(&Code::Vector("int".to_owned()))),
        ]
        .into_iter()
        .collect();
        let reps = repo.register(&decls).unwrap();
        (repo, reps)
    }

    fn fields(kind: FieldsKind, fields: Vec<(&str, Filter)>, open: bool) -> Filter {
        Filter::Fields(FieldsFilter {
            kind,
            fields: fields.into_iter().map(|(l, f)| (l.to_owned(), f)).collect(),
            open,
        })
    }

    fn var(name: &str) -> Filter {
        Filter::Var(name.to_owned())
    }

    #[test]
    fn binds_variables() {
        let (repo, reps) = repo();
        let filter = fields(FieldsKind::Product, vec![("x", var("X")), ("y", var("X"))], false);
        let bindings = match_code(&repo, &reps["pair"], &filter).unwrap();
        assert_eq!(bindings["X"], "@int");
        assert_eq!(match_code(&repo, &reps["mixed"], &filter), None);
    }

    #[test]
    fn closed_filters_need_all_fields() {
        let (repo, reps) = repo();
        let closed = fields(FieldsKind::Any, vec![("x", var("X"))], false);
        let open = fields(FieldsKind::Any, vec![("x", var("X"))], true);
        assert_eq!(match_code(&repo, &reps["pair"], &closed), None);
        assert!(match_code(&repo, &reps["pair"], &open).is_some());
        let union = fields(FieldsKind::Union, vec![("x", var("X"))], true);
        assert_eq!(match_code(&repo, &reps["pair"], &union), None);
    }

    #[test]
    fn matches_vectors_and_codes() {
        let (repo, reps) = repo();
        let filter = fields(
            FieldsKind::Product,
            vec![("y", Filter::Vector(Box::new(Filter::Code("int".to_owned()))))],
            true,
        );
        assert!(match_code(&repo, &reps["mixed"], &filter).is_some());
        assert_eq!(match_code(&repo, &reps["pair"], &filter), None);
        assert!(match_code(&repo, "ints", &Filter::Code("ints".to_owned())).is_some());
    }

    #[test]
    fn builds_shared_variable_nodes() {
        let (repo, _) = repo();
        let mut graph = PatternGraph::new();
        let filter = fields(FieldsKind::Product, vec![("x", var("X")), ("y", var("X"))], true);
        let id = filter_node(&mut graph, &repo, &filter).unwrap();
        assert_eq!(graph.kind(id), &PatternKind::OpenProduct);
        assert_eq!(graph.target(id, "x"), graph.target(id, "y"));
    }
}
