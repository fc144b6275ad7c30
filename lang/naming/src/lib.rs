//! Canonical names for relations.
//!
//! A relation is named by hashing its printed form after references have been
//! replaced: references to already named relations by their canonical names, and
//! references within a group of mutually recursive relations by positional
//! placeholders. Groups are processed so that every group they reference is named
//! before them.

mod names;
mod simplify;

pub use names::*;
pub use simplify::*;
