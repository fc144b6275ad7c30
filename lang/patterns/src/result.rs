use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use k_lang_codes::CodeError;
use k_lang_miette_util::{Span, ToMiette};

/// The result type specialized to pattern inference errors.
pub type PatResult<T = ()> = Result<T, Box<PatternError>>;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Cannot unify {lhs} with {rhs}")]
    #[diagnostic(code("P-001"), help("The conflict arose while applying the rule `{rule}`."))]
    StructuralMismatch {
        rule: String,
        lhs: String,
        rhs: String,
        #[label]
        span: Option<SourceSpan>,
    },
    #[error("The distinct codes {lhs} and {rhs} cannot share a pattern")]
    #[diagnostic(code("P-002"))]
    ForestInvariantViolation { lhs: String, rhs: String },
    #[error("Reference to undefined relation {name}")]
    #[diagnostic(code("P-003"))]
    UnknownRelation {
        name: String,
        #[label]
        span: Option<SourceSpan>,
    },
    #[error("The pattern {pattern} of {relation} is still open")]
    #[diagnostic(code("P-004"), help("Add a code assertion to fix the shape."))]
    UnresolvedPattern {
        relation: String,
        pattern: String,
        #[label]
        span: Option<SourceSpan>,
    },
    #[error("The product pattern {pattern} contains itself")]
    #[diagnostic(code("P-005"), help("A recursive structure has to be a union with a base case."))]
    LoopInProduct { pattern: String },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Code(#[from] CodeError),
}

impl From<Box<CodeError>> for Box<PatternError> {
    fn from(err: Box<CodeError>) -> Self {
        Box::new(PatternError::Code(*err))
    }
}

impl PatternError {
    pub fn mismatch(rule: &str, lhs: impl ToString, rhs: impl ToString) -> Box<Self> {
        Box::new(PatternError::StructuralMismatch {
            rule: rule.to_owned(),
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
            span: None,
        })
    }

    /// Attach `span` to an error that does not carry a location yet.
    pub fn at(mut self: Box<Self>, span: Option<Span>) -> Box<Self> {
        if let PatternError::StructuralMismatch { span: slot @ None, .. } = self.as_mut() {
            *slot = span.to_miette();
        }
        self
    }
}
