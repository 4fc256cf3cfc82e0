pub mod error;
#[allow(clippy::module_inception)]
pub mod lexer;
pub mod token_kind;
pub mod types;

pub use error::{LexerError, LexerErrorKind};
pub use lexer::{number_value, tokenize, Token};
pub use token_kind::TokenKind;
