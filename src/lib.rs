pub mod catalog;
pub mod codec;
pub mod error;
pub mod executor;
pub mod query;
pub mod storage;
pub mod value;

pub use error::{DbError, Result};
pub use executor::{Executor, QueryResult, Row};
pub use storage::{MemStore, SledStore, Store};
pub use value::{DataType, Value};
