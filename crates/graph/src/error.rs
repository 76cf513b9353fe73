use crate::graph::CellId;

/// Errors from reading, writing, or building cells.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("unknown cell: {0}")]
    UnknownCell(CellId),
    #[error("value type does not match the handle for {0}")]
    TypeMismatch(CellId),
    #[error("{0} is derived and cannot be written")]
    NotMutable(CellId),
    #[error("{0} was read while it was being evaluated (dependency cycle)")]
    Cycle(CellId),
    #[error("{0} was read by a compute function that did not declare it as an input")]
    UndeclaredInput(CellId),
    #[error("{0} has no value yet")]
    Unevaluated(CellId),
    #[error("compute failed: {0}")]
    Compute(String),
}

impl GraphError {
    /// Error to return from a compute function.
    pub fn compute(message: impl Into<String>) -> Self {
        GraphError::Compute(message.into())
    }
}
