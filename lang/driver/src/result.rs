use miette::Diagnostic;
use thiserror::Error;

use k_lang_codes::CodeError;
use k_lang_patterns::PatternError;

pub type DriverResult<T = ()> = Result<T, DriverError>;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error(transparent)]
#[diagnostic(transparent)]
pub enum DriverError {
    Code(#[from] CodeError),
    Pattern(#[from] PatternError),
}

impl From<Box<CodeError>> for DriverError {
    fn from(err: Box<CodeError>) -> Self {
        DriverError::Code(*err)
    }
}

impl From<Box<PatternError>> for DriverError {
    fn from(err: Box<PatternError>) -> Self {
        match *err {
            PatternError::Code(err) => DriverError::Code(err),
            err => DriverError::Pattern(err),
        }
    }
}
