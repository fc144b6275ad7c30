//! Canonical identity for structural codes.
//!
//! A code is a product, union or vector over named references. Codes that describe the
//! same (possibly infinite) tree are identified: [minimize] computes the coarsest
//! partition of a code map into structurally equivalent classes, [encode_code_to_string]
//! writes the graph reachable from a code in a form that depends only on its structure,
//! and [finalize] names every class by the [hash] of that encoding. The [Repository]
//! keeps the resulting canonical codes across registrations.

mod code;
mod encode;
mod finalize;
mod minimize;
mod print;
mod repository;
pub mod result;

pub use code::*;
pub use encode::*;
pub use finalize::*;
pub use minimize::*;
pub use repository::*;
pub use result::*;
