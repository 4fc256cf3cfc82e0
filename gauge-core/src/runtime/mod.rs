//! 运行时：值、栈、调用帧与解释器

pub mod dist;
pub mod domain;
pub mod error;
pub mod expression;
pub mod frame_stack;
pub mod interpreter;
pub mod profile;
pub mod stack;
pub mod stdlib;
pub mod value;

pub use dist::SampleSet;
pub use domain::Domain;
pub use error::{CallError, ErrorMessage, RuntimeError, StackTrace};
pub use frame_stack::FrameStack;
pub use stack::Stack;
