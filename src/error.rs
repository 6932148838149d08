use thiserror::Error;

/// Errors raised while assembling a dataset or constructing a splitter node.
///
/// The splitting itself never fails: every variant here describes input that
/// is rejected before any node is built.
#[derive(Debug, Error)]
pub enum SplitterError {
    #[error("the dataset contains no rows")]
    EmptyDataset,

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("shape mismatch: expected {expected} columns, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("non-finite value at row {row}, column `{column}`")]
    NonFinite { row: usize, column: String },

    #[error("invalid node id `{id}` for depth {depth}: expected a binary string of length depth + 1")]
    InvalidNodeId { id: String, depth: u16 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("line {line}, column `{column}`: cannot parse `{value}` as a number")]
    Parse {
        line: u64,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
