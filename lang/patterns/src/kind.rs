use std::collections::BTreeSet;
use std::fmt;

use k_lang_codes::{Code, CodeLookup, Repository};

/// The label of the element edge of vector patterns
pub const VECTOR_MEMBER: &str = "vector-member";

/// What is known about the shape at one point of an expression.
///
/// Ordered by specificity: [PatternKind::Unconstrained] is below the open kinds and
/// [PatternKind::Vector], which are below the closed kinds and [PatternKind::Bound].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternKind {
    /// `(...)`: a value, possibly with known fields
    Unconstrained,
    /// `{...}`: a product with at least the known fields
    OpenProduct,
    /// `<...>`: a union with at least the known alternatives
    OpenUnion,
    /// `()`: exactly the known fields, product or union
    ClosedUntyped,
    /// `[]`
    Vector,
    /// `{}`: a product with exactly the known fields
    ClosedProduct,
    /// `<>`: a union with the known alternatives
    ClosedUnion,
    /// A canonical code
    Bound(String),
}

impl PatternKind {
    fn rank(&self) -> usize {
        match self {
            PatternKind::Unconstrained => 0,
            PatternKind::OpenProduct => 1,
            PatternKind::OpenUnion => 2,
            PatternKind::ClosedUntyped => 3,
            PatternKind::Vector => 4,
            PatternKind::ClosedProduct => 5,
            PatternKind::ClosedUnion => 6,
            PatternKind::Bound(_) => 7,
        }
    }

    /// Whether the shape may still gain structure
    pub fn is_open(&self) -> bool {
        matches!(self, PatternKind::Unconstrained | PatternKind::OpenProduct | PatternKind::OpenUnion)
    }

    pub fn bound(&self) -> Option<&str> {
        match self {
            PatternKind::Bound(name) => Some(name),
            _ => None,
        }
    }
}

/// Whether a label can address a vector element
pub fn is_member_label(label: &str) -> bool {
    label == VECTOR_MEMBER || (!label.is_empty() && label.bytes().all(|b| b.is_ascii_digit()))
}

/// A pattern kind together with the labels of its outgoing edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub kind: PatternKind,
    pub labels: BTreeSet<String>,
}

impl Shape {
    pub fn new<I: IntoIterator<Item = S>, S: Into<String>>(kind: PatternKind, labels: I) -> Self {
        Shape { kind, labels: labels.into_iter().map(Into::into).collect() }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        let labels = labels.join(", ");
        let sep = if labels.is_empty() { "" } else { ", " };
        match &self.kind {
            PatternKind::Unconstrained => write!(f, "({labels}{sep}...)"),
            PatternKind::OpenProduct => write!(f, "{{{labels}{sep}...}}"),
            PatternKind::OpenUnion => write!(f, "<{labels}{sep}...>"),
            PatternKind::ClosedUntyped => write!(f, "({labels})"),
            PatternKind::Vector => write!(f, "[]"),
            PatternKind::ClosedProduct => write!(f, "{{{labels}}}"),
            PatternKind::ClosedUnion => write!(f, "<{labels}>"),
            PatternKind::Bound(name) => write!(f, "${name}"),
        }
    }
}

/// A cell of the join table. The left operand never has a higher rank than the right.
type Cell = fn(&Shape, &Shape, &Repository) -> Option<PatternKind>;

/// Indexed by the ranks of the two operands, lower rank first
static JOIN: [[Cell; 8]; 8] = {
    use PatternKind::*;
    [
        // unconstrained
        [
            |_, _, _| Some(Unconstrained),
            |_, r, _| Some(r.kind.clone()),
            |_, r, _| Some(r.kind.clone()),
            |l, r, _| subset(l, r).then_some(ClosedUntyped),
            |l, _, _| all_members(l).then_some(Vector),
            |l, r, _| subset(l, r).then_some(ClosedProduct),
            |l, r, _| subset(l, r).then_some(ClosedUnion),
            |l, r, repo| fits_bound(l, r, repo, Fit::Any),
        ],
        // open product
        [
            mirrored::<1, 0>,
            |_, _, _| Some(OpenProduct),
            |_, _, _| None,
            |l, r, _| (l.labels == r.labels).then_some(ClosedProduct),
            |_, _, _| None,
            |l, r, _| subset(l, r).then_some(ClosedProduct),
            |_, _, _| None,
            |l, r, repo| fits_bound(l, r, repo, Fit::Product),
        ],
        // open union
        [
            mirrored::<2, 0>,
            mirrored::<2, 1>,
            |_, _, _| Some(OpenUnion),
            |l, r, _| (l.labels == r.labels).then_some(ClosedUnion),
            |_, _, _| None,
            |_, _, _| None,
            |l, r, _| subset(l, r).then_some(ClosedUnion),
            |l, r, repo| fits_bound(l, r, repo, Fit::Union),
        ],
        // closed untyped
        [
            mirrored::<3, 0>,
            mirrored::<3, 1>,
            mirrored::<3, 2>,
            |l, r, _| (l.labels == r.labels).then_some(ClosedUntyped),
            |l, _, _| all_members(l).then_some(Vector),
            |l, r, _| (l.labels == r.labels).then_some(ClosedProduct),
            |l, r, _| (l.labels == r.labels).then_some(ClosedUnion),
            |l, r, repo| fits_bound(l, r, repo, Fit::Exact),
        ],
        // vector
        [
            mirrored::<4, 0>,
            mirrored::<4, 1>,
            mirrored::<4, 2>,
            mirrored::<4, 3>,
            |_, _, _| Some(Vector),
            |_, _, _| None,
            |_, _, _| None,
            |l, r, repo| fits_bound(l, r, repo, Fit::Vector),
        ],
        // closed product
        [
            mirrored::<5, 0>,
            mirrored::<5, 1>,
            mirrored::<5, 2>,
            mirrored::<5, 3>,
            mirrored::<5, 4>,
            |l, r, _| (l.labels == r.labels).then_some(ClosedProduct),
            |_, _, _| None,
            |l, r, repo| fits_bound(l, r, repo, Fit::ExactProduct),
        ],
        // closed union
        [
            mirrored::<6, 0>,
            mirrored::<6, 1>,
            mirrored::<6, 2>,
            mirrored::<6, 3>,
            mirrored::<6, 4>,
            mirrored::<6, 5>,
            |l, r, _| (l.labels == r.labels).then_some(ClosedUnion),
            |l, r, repo| fits_bound(l, r, repo, Fit::Union),
        ],
        // bound
        [
            mirrored::<7, 0>,
            mirrored::<7, 1>,
            mirrored::<7, 2>,
            mirrored::<7, 3>,
            mirrored::<7, 4>,
            mirrored::<7, 5>,
            mirrored::<7, 6>,
            |l, r, _| (l.kind == r.kind).then(|| r.kind.clone()),
        ],
    ]
};

/// The cell below the diagonal delegates to its mirror image.
fn mirrored<const I: usize, const J: usize>(
    lhs: &Shape,
    rhs: &Shape,
    repo: &Repository,
) -> Option<PatternKind> {
    JOIN[J][I](rhs, lhs, repo)
}

/// The most specific kind describing both shapes, or `None` if they are incompatible.
///
/// The labels of the result are the union of both label sets.
pub fn join(lhs: &Shape, rhs: &Shape, repo: &Repository) -> Option<PatternKind> {
    JOIN[lhs.kind.rank()][rhs.kind.rank()](lhs, rhs, repo)
}

fn subset(lhs: &Shape, rhs: &Shape) -> bool {
    lhs.labels.is_subset(&rhs.labels)
}

fn all_members(shape: &Shape) -> bool {
    shape.labels.iter().all(|label| is_member_label(label))
}

/// How the labels of a shape must relate to a bound code
#[derive(Clone, Copy)]
enum Fit {
    /// Any product or union containing the labels, or a vector
    Any,
    /// A product containing the labels
    Product,
    /// A union containing the labels
    Union,
    /// A product or union with exactly the labels
    Exact,
    /// A product with exactly the labels
    ExactProduct,
    /// A vector
    Vector,
}

fn fits_bound(shape: &Shape, bound: &Shape, repo: &Repository, fit: Fit) -> Option<PatternKind> {
    let name = bound.kind.bound()?;
    let fits = match repo.find(name) {
        CodeLookup::Code(Code::Product(fields)) => match fit {
            Fit::Any | Fit::Product => shape.labels.iter().all(|l| fields.contains_key(l)),
            Fit::Exact | Fit::ExactProduct => shape.labels.iter().eq(fields.keys()),
            Fit::Union | Fit::Vector => false,
        },
        CodeLookup::Code(Code::Union(fields)) => match fit {
            Fit::Any | Fit::Union => shape.labels.iter().all(|l| fields.contains_key(l)),
            Fit::Exact => shape.labels.iter().eq(fields.keys()),
            Fit::Product | Fit::ExactProduct | Fit::Vector => false,
        },
        CodeLookup::Code(Code::Vector(_)) => match fit {
            Fit::Any | Fit::Vector => all_members(shape),
            Fit::Exact => all_members(shape),
            Fit::Product | Fit::Union | Fit::ExactProduct => false,
        },
        CodeLookup::Builtin(_) => matches!(fit, Fit::Any | Fit::Exact) && shape.labels.is_empty(),
        CodeLookup::Undefined => false,
    };
    fits.then(|| bound.kind.clone())
}
