//! Gauge Core - lexer, parser, lowering compiler and interpreter
//!
//! Pure logic, no IO:
//! - `compiler::lexer` / `compiler::parser`: source text to AST
//! - `compiler::lower`: AST to `Expression` with stack slots and captures solved
//! - `runtime`: values, stack, frame stack and the tree-walking interpreter
//! - `runtime::stdlib`: native function registry

pub mod compiler;
pub mod runtime;

pub use compiler::lexer::types::{Coordinate, Span};
pub use compiler::parser::ast;
pub use compiler::{compile, parse, CompileError};
pub use runtime::error::{ErrorMessage, RuntimeError, StackTrace};
pub use runtime::expression::{Expression, ExpressionKind};
pub use runtime::interpreter::{Interpreter, ProgramOutput};
pub use runtime::profile::RunProfile;
pub use runtime::value::{Bindings, Lambda, Value};
pub use runtime::SampleSet;

pub use gauge_config::{Environment, LimitConfig, Phase};
