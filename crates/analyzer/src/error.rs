use thiserror::Error;

use crate::correlate::CorrelateError;
use crate::parser::ParseError;

/// Top-level error for the boundary operations in [`crate::api`].
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Correlate(#[from] CorrelateError),
}
