pub mod ast;
pub mod error;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod utils;

pub use error::{ErrorLocation, ParseResult, ParserError, ParserErrorKind};
pub use parser::{parse_tokens, Parser, MAX_NESTING_DEPTH};
