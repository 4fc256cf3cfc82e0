//! 作用域与捕获解析
//!
//! 每个函数（顶层程序也算一个）有自己的局部变量表，按栈槽顺序排列：
//! 先是参数，再是按出现顺序定义的名字。块退出时截断到进入时的长度。
//! 引用外层函数的名字时，沿途每一层函数都登记一个捕获。

use crate::runtime::expression::CaptureSource;

/// 名字解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    /// 当前函数的栈槽
    Slot(usize),
    /// 当前函数的捕获索引
    Capture(usize),
}

#[derive(Debug, Default)]
struct FunctionScope {
    locals: Vec<String>,
    captures: Vec<CaptureSource>,
}

#[derive(Debug)]
pub struct ScopeStack {
    functions: Vec<FunctionScope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            functions: vec![FunctionScope::default()],
        }
    }

    fn current_mut(&mut self) -> &mut FunctionScope {
        let last = self.functions.len() - 1;
        &mut self.functions[last]
    }

    /// 定义一个名字，返回其栈槽
    pub fn add_local(&mut self, name: &str) -> usize {
        let scope = self.current_mut();
        scope.locals.push(name.to_string());
        scope.locals.len() - 1
    }

    /// 当前函数已定义的局部变量数（块进入时记录）
    pub fn local_count(&self) -> usize {
        self.functions.last().map_or(0, |scope| scope.locals.len())
    }

    /// 退出块：丢弃块内定义的名字
    pub fn truncate_locals(&mut self, count: usize) {
        self.current_mut().locals.truncate(count);
    }

    pub fn begin_function<'a>(&mut self, parameters: impl IntoIterator<Item = &'a str>) {
        self.functions.push(FunctionScope {
            locals: parameters.into_iter().map(str::to_string).collect(),
            captures: Vec::new(),
        });
    }

    /// 退出函数，返回其捕获列表
    pub fn end_function(&mut self) -> Vec<CaptureSource> {
        match self.functions.pop() {
            Some(scope) => scope.captures,
            None => Vec::new(),
        }
    }

    /// 解析名字。找不到时返回 `None`（交给外部绑定与标准库）
    pub fn resolve(&mut self, name: &str) -> Option<Variable> {
        let depth = self.functions.len() - 1;
        self.resolve_in(depth, name)
    }

    fn resolve_in(&mut self, depth: usize, name: &str) -> Option<Variable> {
        if let Some(slot) = self.functions[depth].locals.iter().rposition(|n| n == name) {
            return Some(Variable::Slot(slot));
        }
        if depth == 0 {
            return None;
        }
        let source = match self.resolve_in(depth - 1, name)? {
            Variable::Slot(slot) => CaptureSource::Slot(slot),
            Variable::Capture(index) => CaptureSource::Capture(index),
        };
        Some(Variable::Capture(self.add_capture(depth, source)))
    }

    /// 同一来源只捕获一次
    fn add_capture(&mut self, depth: usize, source: CaptureSource) -> usize {
        let captures = &mut self.functions[depth].captures;
        if let Some(index) = captures.iter().position(|c| *c == source) {
            return index;
        }
        captures.push(source);
        captures.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_shadowing_uses_latest_slot() {
        let mut scopes = ScopeStack::new();
        scopes.add_local("x");
        scopes.add_local("y");
        scopes.add_local("x");
        assert_eq!(scopes.resolve("x"), Some(Variable::Slot(2)));
        assert_eq!(scopes.resolve("y"), Some(Variable::Slot(1)));
        assert_eq!(scopes.resolve("z"), None);
    }

    #[test]
    fn test_block_truncation() {
        let mut scopes = ScopeStack::new();
        scopes.add_local("a");
        let saved = scopes.local_count();
        scopes.add_local("b");
        scopes.truncate_locals(saved);
        assert_eq!(scopes.resolve("b"), None);
        assert_eq!(scopes.resolve("a"), Some(Variable::Slot(0)));
    }

    #[test]
    fn test_nested_capture_chain() {
        let mut scopes = ScopeStack::new();
        scopes.add_local("outer");
        scopes.begin_function(["p"]);
        scopes.begin_function(["q"]);

        assert_eq!(scopes.resolve("q"), Some(Variable::Slot(0)));
        assert_eq!(scopes.resolve("outer"), Some(Variable::Capture(0)));
        assert_eq!(scopes.resolve("p"), Some(Variable::Capture(1)));
        // 第二次解析复用同一个捕获
        assert_eq!(scopes.resolve("outer"), Some(Variable::Capture(0)));

        let inner = scopes.end_function();
        assert_eq!(inner, vec![CaptureSource::Capture(0), CaptureSource::Slot(0)]);
        let middle = scopes.end_function();
        assert_eq!(middle, vec![CaptureSource::Slot(0)]);
    }
}
