use k_lang_ast::{Rel, RelKind};

/// Remove the nodes that do not change what a relation computes.
///
/// Code assertions and filters only restrict the patterns flowing through an
/// expression. Inside a composition they are dropped, anywhere else they are replaced
/// by the identity.
pub fn simplify(rel: Rel) -> Rel {
    rel.fold(&mut |rel| match rel.kind {
        RelKind::Code(_) | RelKind::Filter(_) => Rel { kind: RelKind::Identity, ..rel },
        RelKind::Comp(rels) => {
            let mut rels: Vec<Rel> = rels.into_iter().filter(|rel| rel.kind != RelKind::Identity).collect();
            let kind = match rels.len() {
                0 => RelKind::Identity,
                1 => rels.pop().map(|rel| rel.kind).unwrap_or(RelKind::Identity),
                _ => RelKind::Comp(rels),
            };
            Rel { kind, ..rel }
        }
        _ => rel,
    })
}
