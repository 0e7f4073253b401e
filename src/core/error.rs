use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Execution error: {0}")]
    Execution(String),
    #[error("Conversion error: {0}")]
    Conversion(String),
    #[error("Cleanup error: {0}")]
    Cleanup(String),
    #[error("Field '{0}' not found")]
    FieldNotFound(String),
}

pub type SearchResult<T> = Result<T, SearchError>;
