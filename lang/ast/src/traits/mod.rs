mod has_span;
mod visit;

pub use has_span::*;
pub use visit::*;
