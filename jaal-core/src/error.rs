use thiserror::Error;

#[derive(Error, Debug)]
pub enum JaalError {
    #[error("Query parse error at offset {position}: {message}")]
    QueryParse { position: usize, message: String },

    #[error("Query evaluation error: {0}")]
    QueryEval(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Invalid value '{value}' for control {control}")]
    InvalidControlValue { control: &'static str, value: String },

    #[error("Missing column '{column}' in {table} table")]
    MissingColumn { table: &'static str, column: &'static str },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, JaalError>;
