//! 终端相关的输出

mod cli;

pub use cli::{print_error_with_source, print_notice, print_output, print_source_context, OutputMode};
