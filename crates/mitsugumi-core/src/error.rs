use thiserror::Error;

use crate::types::Span;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Empty input: no units to build a chart from")]
    EmptyInput,

    #[error("Cell {span} not found")]
    CellNotFound { span: Span },

    #[error("Tree id '{0}' not found")]
    TreeIdNotFound(String),

    #[error("Malformed pattern: {0}")]
    MalformedPattern(String),

    #[error("Resource error: {0}")]
    Resource(String),
}

pub type Result<T> = std::result::Result<T, Error>;
