use k_lang_ast::PatternId;

use crate::kind::PatternKind;
use crate::result::{PatResult, PatternError};

/// A node of the pattern forest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternNode {
    pub kind: PatternKind,
    /// The rule which created the node
    pub rule: Option<String>,
}

/// Union-find over pattern nodes.
///
/// Merging classes never changes an existing node: it creates a new node which becomes
/// the parent of the roots being merged. Parents therefore always have larger ids than
/// their children and the forest is acyclic.
#[derive(Debug, Clone, Default)]
pub struct PatternForest {
    nodes: Vec<PatternNode>,
    parent: Vec<Option<PatternId>>,
}

impl PatternForest {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: PatternId) -> &PatternNode {
        &self.nodes[id]
    }

    pub fn add(&mut self, kind: PatternKind, rule: Option<&str>) -> PatternId {
        let id = self.nodes.len();
        self.nodes.push(PatternNode { kind, rule: rule.map(ToOwned::to_owned) });
        self.parent.push(None);
        id
    }

    /// The root of the class of `id`
    pub fn find(&self, mut id: PatternId) -> PatternId {
        while let Some(parent) = self.parent[id] {
            id = parent;
        }
        id
    }

    pub fn is_root(&self, id: PatternId) -> bool {
        self.parent[id].is_none()
    }

    /// Make a new node of `kind` the parent of the distinct roots `roots`.
    ///
    /// A root bound to a code can only be absorbed by a node bound to the same code.
    pub fn link(&mut self, kind: PatternKind, rule: &str, roots: &[PatternId]) -> PatResult<PatternId> {
        for root in roots {
            if let PatternKind::Bound(name) = &self.nodes[*root].kind {
                if kind.bound() != Some(name.as_str()) {
                    return Err(Box::new(PatternError::ForestInvariantViolation {
                        lhs: name.clone(),
                        rhs: kind.bound().unwrap_or("an unbound pattern").to_owned(),
                    }));
                }
            }
        }
        let id = self.add(kind, Some(rule));
        for root in roots {
            self.parent[*root] = Some(id);
        }
        Ok(id)
    }
}
