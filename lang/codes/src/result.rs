use miette::Diagnostic;
use thiserror::Error;

/// The result type specialized to errors of the code repository.
pub type CodeResult<T = ()> = Result<T, Box<CodeError>>;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("Reference to unknown code {name}")]
    #[diagnostic(
        code("C-001"),
        help("A code reference must name a declared code, a builtin or a registered code.")
    )]
    UnknownCode { name: String, referenced_by: Option<String> },
    #[error("Malformed code {name}: {reason}")]
    #[diagnostic(code("C-002"))]
    MalformedCode { name: String, reason: String },
    #[error("An unexpected internal error occurred: {message}")]
    #[diagnostic(code("C-003"))]
    /// This error should not occur.
    /// Some internal invariant has been violated.
    Impossible { message: String },
}

impl CodeError {
    pub fn unknown(name: &str, referenced_by: Option<&str>) -> Box<Self> {
        Box::new(CodeError::UnknownCode {
            name: name.to_owned(),
            referenced_by: referenced_by.map(ToOwned::to_owned),
        })
    }

    pub fn malformed(name: &str, reason: impl Into<String>) -> Box<Self> {
        Box::new(CodeError::MalformedCode { name: name.to_owned(), reason: reason.into() })
    }

    pub fn impossible(message: impl Into<String>) -> Box<Self> {
        Box::new(CodeError::Impossible { message: message.into() })
    }
}
