//! Compilation units from code declarations to named, pattern-annotated relations.
//!
//! A [Session] owns the code [Repository](k_lang_codes::Repository). Compiling a
//! [Unit] registers its codes, infers the patterns of its relations, optionally
//! compresses the pattern graph and assigns canonical names to the relations.

mod config;
mod render_reports;
mod result;
mod session;

pub use config::*;
pub use render_reports::*;
pub use result::*;
pub use session::*;
