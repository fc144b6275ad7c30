//! Generic graph algorithms over directed multigraphs.
//!
//! A [Graph] is built from an edge list over arbitrary vertex ids and indexes every
//! edge both by its source and by its destination. On top of it this crate provides
//! Tarjan's algorithm for strongly connected components ([sccs]), Kahn's algorithm
//! for a dependency-first topological order ([topo_order]) and the condensation of a
//! graph into its DAG of components ([condensation]).

mod graph;
mod scc;
mod topo;

pub use graph::*;
pub use scc::*;
pub use topo::*;

pub type HashMap<K, V> = std::collections::HashMap<K, V, fxhash::FxBuildHasher>;
pub type HashSet<V> = fxhash::FxHashSet<V>;
