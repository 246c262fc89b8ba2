use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Column '{column}' has {actual} values but the table has {expected} timestamps")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}
