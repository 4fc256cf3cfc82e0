//! 调用帧栈，只用于生成栈追踪

use super::error::{StackTrace, StackTraceFrame};
use crate::compiler::lexer::types::Span;

/// 顶层帧在栈追踪中的名字
pub const TOP_LEVEL_FRAME: &str = "<top>";

#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    /// 调用发生的位置（在调用者内部）
    pub call_location: Option<Span>,
}

#[derive(Debug, Default)]
pub struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: String, call_location: Option<Span>) {
        self.frames.push(Frame {
            name,
            call_location,
        });
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// 快照：最内层帧使用触发位置，其余每帧使用其被调用的位置
    pub fn make_stack_trace(&self, location: Option<Span>) -> StackTrace {
        let mut frames = Vec::with_capacity(self.frames.len() + 1);
        let mut location = location;
        for frame in self.frames.iter().rev() {
            frames.push(StackTraceFrame {
                name: frame.name.clone(),
                location,
            });
            location = frame.call_location;
        }
        frames.push(StackTraceFrame {
            name: TOP_LEVEL_FRAME.to_string(),
            location,
        });
        StackTrace { frames }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::types::Coordinate;

    fn span(line: usize) -> Span {
        Span::at(Coordinate {
            line,
            column: 1,
            offset: 0,
        })
    }

    #[test]
    fn test_stack_trace_order() {
        let mut frames = FrameStack::new();
        frames.push("outer".into(), Some(span(10)));
        frames.push("inner".into(), Some(span(3)));

        let trace = frames.make_stack_trace(Some(span(1)));
        let names: Vec<_> = trace.frames.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["inner", "outer", "<top>"]);
        assert_eq!(trace.frames[0].location, Some(span(1)));
        assert_eq!(trace.frames[1].location, Some(span(3)));
        assert_eq!(trace.frames[2].location, Some(span(10)));
    }

    #[test]
    fn test_empty_stack_trace_has_top() {
        let trace = FrameStack::new().make_stack_trace(Some(span(4)));
        assert_eq!(trace.frames.len(), 1);
        assert_eq!(trace.location(), Some(span(4)));
    }
}
