//! Pattern inference by unification.
//!
//! Every expression node of a relation gets an input and an output pattern. Patterns
//! live in a [PatternGraph]: a union-find forest of shapes connected by labelled edges.
//! Inference applies one set of constraints per node until nothing changes, joining
//! shapes along the lattice defined in [kind]. Closed patterns that are not entangled
//! with open ones are promoted into codes of the repository, and the final graph can be
//! [compressed](PatternGraph::compressed) for presentation.

mod compress;
mod filter;
mod forest;
mod graph;
mod infer;
pub mod kind;
mod print;
mod promote;
pub mod result;

pub use compress::*;
pub use filter::*;
pub use forest::*;
pub use graph::*;
pub use infer::*;
pub use kind::{PatternKind, Shape, VECTOR_MEMBER};
pub use promote::*;
pub use result::*;

pub type HashMap<K, V> = std::collections::HashMap<K, V, fxhash::FxBuildHasher>;
