use std::collections::{BTreeMap, BTreeSet};

use k_lang_ast::{Rel, RelKind, Relations};
use k_lang_codes::hash;
use k_lang_graph::{Graph, condensation};
use k_lang_printer::print_flat;

use crate::simplify::simplify;

/// Relation name to canonical name
pub type Names = BTreeMap<String, String>;

/// The graph of references between the defined relations.
///
/// Every definition is a vertex, in name order. References to undefined names are
/// left out.
pub fn reference_graph(rels: &Relations) -> Graph<&str> {
    let edges = rels.iter().flat_map(move |(name, rel)| {
        rel.references()
            .into_iter()
            .filter(move |target| rels.contains_key(*target))
            .map(move |target| (name.as_str(), target))
    });
    Graph::with_vertices(rels.keys().map(String::as_str), edges)
}

/// Assign a canonical name to every relation.
pub fn assign_canonical_names(rels: &Relations) -> Names {
    let simplified: Relations = rels.iter().map(|(name, rel)| (name.clone(), simplify(rel.clone()))).collect();
    let condensed = condensation(&reference_graph(&simplified));

    let mut names = Names::new();
    for group in condensed.leaves_first() {
        let mut group: Vec<&str> = group.to_vec();
        group.sort_unstable();
        let assigned = assign_group_names(&group, &simplified, &names);
        log::debug!("Named group {{{}}}", group.join(", "));
        for (name, canonical) in assigned {
            log::trace!("{name} -> {canonical}");
            names.insert(name.to_owned(), canonical);
        }
    }
    names
}

/// Name the members of one group of mutually recursive relations, given the names of
/// every relation outside of it.
pub fn assign_group_names<'a>(group: &[&'a str], rels: &Relations, names: &Names) -> Vec<(&'a str, String)> {
    let members: BTreeSet<&str> = group.iter().copied().collect();
    let own: Vec<(&str, String)> = group
        .iter()
        .filter_map(|name| rels.get(*name).map(|rel| (*name, member_hash(name, rel, &members, names))))
        .collect();

    let group_hash: BTreeSet<&str> = own.iter().map(|(_, h)| h.as_str()).collect();
    let group_hash = group_hash.into_iter().collect::<Vec<_>>().join(":");
    own.iter().map(|(name, h)| (*name, hash(&format!("{h}:{group_hash}")))).collect()
}

/// The hash of `rel` with its references renamed from the point of view of `name`.
fn member_hash(name: &str, rel: &Rel, members: &BTreeSet<&str>, names: &Names) -> String {
    let mut placeholders: BTreeMap<String, String> = BTreeMap::from([(name.to_owned(), "X0".to_owned())]);
    let renamed = rel.clone().fold(&mut |rel| match &rel.kind {
        RelKind::Ref(target) => {
            let target = if let Some(canonical) = names.get(target) {
                canonical.clone()
            } else if let Some(placeholder) = placeholders.get(target) {
                placeholder.clone()
            } else if members.contains(target.as_str()) {
                let placeholder = format!("X{}", placeholders.len());
                placeholders.insert(target.clone(), placeholder.clone());
                placeholder
            } else {
                target.clone()
            };
            Rel { kind: RelKind::Ref(target), ..rel }
        }
        _ => rel,
    });
    hash(&print_flat(&renamed))
}

#[cfg(test)]
mod tests {
    use k_lang_ast::Literal;

    use super::*;

    fn rels(defs: Vec<(&str, Rel)>) -> Relations {
        defs.into_iter().map(|(name, rel)| (name.to_owned(), rel)).collect()
    }

    #[test]
    fn names_are_invariant_under_renaming() {
        let _ = env_logger::builder().is_test(true).try_init();
        let even_odd = rels(vec![
            ("even", Rel::union([Rel::dot("zero"), Rel::comp([Rel::dot("succ"), Rel::reference("odd")])])),
            ("odd", Rel::comp([Rel::dot("succ"), Rel::reference("even")])),
        ]);
        let renamed = rels(vec![
            ("e", Rel::union([Rel::dot("zero"), Rel::comp([Rel::dot("succ"), Rel::reference("o")])])),
            ("o", Rel::comp([Rel::dot("succ"), Rel::reference("e")])),
        ]);
        let a = assign_canonical_names(&even_odd);
        let b = assign_canonical_names(&renamed);
        assert_eq!(a["even"], b["e"]);
        assert_eq!(a["odd"], b["o"]);
        assert_ne!(a["even"], a["odd"]);
    }

    #[test]
    fn names_follow_the_shape() {
        let base = rels(vec![("f", Rel::comp([Rel::dot("x"), Rel::reference("f")]))]);
        let changed = rels(vec![("f", Rel::comp([Rel::dot("y"), Rel::reference("f")]))]);
        assert_ne!(assign_canonical_names(&base)["f"], assign_canonical_names(&changed)["f"]);
    }

    #[test]
    fn assertions_do_not_change_names() {
        let plain = rels(vec![("f", Rel::dot("x"))]);
        let asserted = rels(vec![("f", Rel::comp([Rel::code("t"), Rel::dot("x")]))]);
        assert_eq!(assign_canonical_names(&plain), assign_canonical_names(&asserted));
    }

    #[test]
    fn dependencies_contribute_their_names() {
        let one = rels(vec![
            ("one", Rel::literal(Literal::Int(1))),
            ("main", Rel::reference("one")),
        ]);
        let two = rels(vec![
            ("one", Rel::literal(Literal::Int(2))),
            ("main", Rel::reference("one")),
        ]);
        let one = assign_canonical_names(&one);
        let two = assign_canonical_names(&two);
        assert_ne!(one["main"], two["main"]);

        let expected = hash(&format!("{}:{}", hash(&one["one"]), hash(&one["one"])));
        assert_eq!(one["main"], expected);
    }

    #[test]
    fn quoted_labels_do_not_collide() {
        let quoted = rels(vec![(
            "f",
            Rel::product([(Rel::identity(), "a-', () 'b-"), (Rel::identity(), "c")]),
        )]);
        let split = rels(vec![(
            "f",
            Rel::product([(Rel::identity(), "a-"), (Rel::identity(), "b-"), (Rel::identity(), "c")]),
        )]);
        assert_ne!(assign_canonical_names(&quoted)["f"], assign_canonical_names(&split)["f"]);
    }

    #[test]
    fn reference_graph_skips_undefined_names() {
        let defs = rels(vec![("f", Rel::comp([Rel::reference("g"), Rel::reference("true")])), ("g", Rel::identity())]);
        let graph = reference_graph(&defs);
        assert_eq!(graph.vertices(), &["f", "g"]);
        assert_eq!(graph.successors(&"f").copied().collect::<Vec<_>>(), vec!["g"]);
    }
}
