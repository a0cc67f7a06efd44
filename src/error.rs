use crate::query::ParseErr;
use crate::storage::StoreErr;
use crate::value::DataType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

/// Every way a statement can fail. Propagation is fail-fast: the first
/// error aborts the statement and reaches the caller unchanged.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open store: {0}")]
    Open(String),
    #[error("failed to create table `{0}`")]
    FailedToCreateTable(String),
    #[error("table `{0}` does not exist")]
    TableNotFound(String),
    #[error("type mismatch for column `{column}`: expected {expected}, got {found}")]
    BadType {
        column: String,
        expected: DataType,
        found: DataType,
    },
    #[error("wrong number of columns: table has {expected}, statement supplies {found}")]
    WrongNumberOfColumns { expected: usize, found: usize },
    #[error("column `{0}` does not exist")]
    ColumnNotFound(String),
    #[error("corrupted record: {0}")]
    Deserialize(String),
    #[error("storage failure: {0}")]
    Internal(String),
    #[error(transparent)]
    Parser(#[from] ParseErr),
}

impl From<StoreErr> for DbError {
    fn from(e: StoreErr) -> Self {
        match e {
            StoreErr::Open(msg) => DbError::Open(msg),
            other => DbError::Internal(other.to_string()),
        }
    }
}
