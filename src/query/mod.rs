pub mod cursor;
pub mod error;
pub mod parser;

pub use cursor::Cursor;
pub use error::ParseErr;
pub use parser::{Atom, Cmp, Op, Parser, Stmt};
