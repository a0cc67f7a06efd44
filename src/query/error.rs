use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseErr>;

/// Parse failures. Every variant carries the byte offset into the
/// source text at which the parse gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErr {
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),
    #[error("expected `{expected}` at byte {at}")]
    Expected { expected: &'static str, at: usize },
    #[error("invalid identifier at byte {0}")]
    InvalidIdent(usize),
    #[error("invalid number `{1}` at byte {0}")]
    InvalidNum(usize, String),
    #[error("unterminated string literal at byte {0}")]
    UnterminatedText(usize),
    #[error("trailing input at byte {0}")]
    TrailingInput(usize),
}
