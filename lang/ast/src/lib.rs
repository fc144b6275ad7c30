//! The syntax tree of relation expressions.
//!
//! Expressions are produced by an external parser (or deserialized with serde) and
//! consumed by pattern inference and relation naming. Every pass over the tree goes
//! through [Rel::walk], [Rel::walk_mut] or [Rel::fold].

mod filter;
mod rel;
pub mod traits;

pub use filter::*;
pub use rel::*;
pub use traits::*;

use std::collections::BTreeMap;

/// Named relation definitions of a compilation unit
pub type Relations = BTreeMap<String, Rel>;
