use k_lang_miette_util::Span;

/// Trait for syntactic entities which have a source-code span.
///
/// Expressions produced by a parser should return `Some(span)`, while expressions
/// built programmatically or by a transformation may return `None`.
pub trait HasSpan {
    /// Return the source code span of the entity.
    fn span(&self) -> Option<Span>;
}

impl HasSpan for Option<Span> {
    fn span(&self) -> Option<Span> {
        *self
    }
}
