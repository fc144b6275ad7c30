use crate::rel::Rel;

/// Read-only traversal of an expression tree.
///
/// [Rel::walk] calls `enter` on a node before its children and `leave` after them.
pub trait Visitor<'a> {
    fn enter(&mut self, _rel: &'a Rel) {}
    fn leave(&mut self, _rel: &'a Rel) {}
}

/// Mutating traversal of an expression tree, see [Visitor].
pub trait VisitorMut {
    fn enter_mut(&mut self, _rel: &mut Rel) {}
    fn leave_mut(&mut self, _rel: &mut Rel) {}
}

struct PreOrder<F>(F);

impl<'a, F: FnMut(&'a Rel)> Visitor<'a> for PreOrder<F> {
    fn enter(&mut self, rel: &'a Rel) {
        (self.0)(rel)
    }
}

impl Rel {
    pub fn walk<'a, V: Visitor<'a>>(&'a self, visitor: &mut V) {
        visitor.enter(self);
        for child in self.children() {
            child.walk(visitor);
        }
        visitor.leave(self);
    }

    pub fn walk_mut<V: VisitorMut>(&mut self, visitor: &mut V) {
        visitor.enter_mut(self);
        for child in self.children_mut() {
            child.walk_mut(visitor);
        }
        visitor.leave_mut(self);
    }

    /// Call `f` on every node, parents before children.
    pub fn for_each<'a, F: FnMut(&'a Rel)>(&'a self, f: F) {
        self.walk(&mut PreOrder(f));
    }

    /// Rebuild the tree bottom-up: children are folded first, then `f` is applied to
    /// the node holding the folded children.
    pub fn fold<F: FnMut(Rel) -> Rel>(self, f: &mut F) -> Rel {
        let Rel { span, kind, ports } = self;
        let kind = match kind {
            crate::RelKind::Product(fields) => crate::RelKind::Product(
                fields
                    .into_iter()
                    .map(|crate::Field { label, exp }| crate::Field { label, exp: exp.fold(f) })
                    .collect(),
            ),
            crate::RelKind::Union(rels) => {
                crate::RelKind::Union(rels.into_iter().map(|rel| rel.fold(f)).collect())
            }
            crate::RelKind::Vector(rels) => {
                crate::RelKind::Vector(rels.into_iter().map(|rel| rel.fold(f)).collect())
            }
            crate::RelKind::Comp(rels) => {
                crate::RelKind::Comp(rels.into_iter().map(|rel| rel.fold(f)).collect())
            }
            leaf => leaf,
        };
        f(Rel { span, kind, ports })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Rel, RelKind};

    use super::*;

    struct Depth {
        current: usize,
        max: usize,
    }

    impl<'a> Visitor<'a> for Depth {
        fn enter(&mut self, _rel: &'a Rel) {
            self.current += 1;
            self.max = self.max.max(self.current);
        }

        fn leave(&mut self, _rel: &'a Rel) {
            self.current -= 1;
        }
    }

    fn sample() -> Rel {
        Rel::comp([Rel::reference("f"), Rel::vector([Rel::comp([Rel::reference("g")])])])
    }

    #[test]
    fn walk_enters_and_leaves() {
        let mut depth = Depth { current: 0, max: 0 };
        sample().walk(&mut depth);
        assert_eq!(depth.max, 4);
        assert_eq!(depth.current, 0);
    }

    #[test]
    fn walk_mut_visits_in_pre_and_post_order() {
        struct Order(Vec<String>);
        impl VisitorMut for Order {
            fn enter_mut(&mut self, rel: &mut Rel) {
                if let RelKind::Ref(name) = &rel.kind {
                    self.0.push(format!("enter {name}"));
                }
            }
            fn leave_mut(&mut self, rel: &mut Rel) {
                if let RelKind::Vector(_) = rel.kind {
                    self.0.push("leave vector".to_owned());
                }
            }
        }
        let mut order = Order(vec![]);
        sample().walk_mut(&mut order);
        assert_eq!(order.0, vec!["enter f", "enter g", "leave vector"]);
    }

    #[test]
    fn fold_rewrites_bottom_up() {
        let renamed = sample().fold(&mut |rel| match rel.kind {
            RelKind::Ref(name) => Rel::reference(name.to_uppercase()),
            RelKind::Comp(rels) if rels.len() == 1 => rels.into_iter().next().unwrap(),
            kind => Rel::from(kind),
        });
        assert_eq!(
            renamed,
            Rel::comp([Rel::reference("F"), Rel::vector([Rel::reference("G")])])
        );
    }
}
