//! 值路径
//!
//! 把输出中的一个值（`bindings.model.costs[2]`）和源码位置互相映射，
//! 供编辑器的 "find in editor" 之类功能使用。只读，不影响求值。

use gauge_core::ast::{Expr, ExprKind, Program};
use gauge_core::{Span, Value};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathRoot {
    Result,
    Bindings,
    Imports,
    Exports,
}

impl PathRoot {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathRoot::Result => "result",
            PathRoot::Bindings => "bindings",
            PathRoot::Imports => "imports",
            PathRoot::Exports => "exports",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PathEdge {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuePath {
    pub root: PathRoot,
    pub edges: Vec<PathEdge>,
}

impl ValuePath {
    pub fn new(root: PathRoot) -> Self {
        Self {
            root,
            edges: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.edges.push(PathEdge::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.edges.push(PathEdge::Index(index));
        self
    }

    /// 沿路径从根值往下取
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.edges.iter().try_fold(root, |value, edge| match edge {
            PathEdge::Key(key) => value.as_dict()?.get(key),
            PathEdge::Index(index) => value.as_array()?.get(*index),
        })
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.as_str())?;
        for edge in &self.edges {
            match edge {
                PathEdge::Key(key) => write!(f, ".{key}")?,
                PathEdge::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

// ===== 路径 -> 位置 =====

/// 路径对应的源码范围；路径走出字面量之后，返回能确定的最深的位置
pub fn locate(program: &Program, path: &ValuePath) -> Option<Span> {
    let (mut edges, expr) = match path.root {
        PathRoot::Result => (path.edges.as_slice(), program.result.as_ref()?),
        PathRoot::Bindings | PathRoot::Exports => {
            let Some((PathEdge::Key(name), rest)) = path.edges.split_first() else {
                return Some(program.span);
            };
            let statement = program
                .statements
                .iter()
                .rev()
                .find(|s| &s.name == name && (s.exported || path.root == PathRoot::Bindings))?;
            if rest.is_empty() {
                return Some(statement.span);
            }
            (rest, &statement.value)
        }
        PathRoot::Imports => {
            let Some(PathEdge::Key(variable)) = path.edges.first() else {
                return Some(program.span);
            };
            return program
                .imports
                .iter()
                .find(|i| &i.variable == variable)
                .map(|i| i.span);
        }
    };

    let mut current = unwrap_blocks(expr);
    while let Some((edge, rest)) = edges.split_first() {
        let next = match (edge, &current.kind) {
            (PathEdge::Key(key), ExprKind::Dict(entries)) => entries
                .iter()
                .rev()
                .find(|entry| matches!(&entry.key.kind, ExprKind::String(k) if k == key))
                .map(|entry| &entry.value),
            (PathEdge::Index(index), ExprKind::Array(items)) => items.get(*index),
            _ => None,
        };
        match next {
            Some(next) => current = unwrap_blocks(next),
            None => break,
        }
        edges = rest;
    }
    Some(current.span)
}

/// 块的值就是它的结果表达式
fn unwrap_blocks(mut expr: &Expr) -> &Expr {
    while let ExprKind::Block { result, .. } = &expr.kind {
        expr = result;
    }
    expr
}

// ===== 位置 -> 路径 =====

/// 源码偏移量处的值路径
pub fn find_by_offset(program: &Program, offset: usize) -> Option<ValuePath> {
    if let Some(import) = program.imports.iter().find(|i| i.span.contains_offset(offset)) {
        return Some(ValuePath::new(PathRoot::Imports).key(import.variable.clone()));
    }
    if let Some(statement) = program
        .statements
        .iter()
        .find(|s| s.span.contains_offset(offset))
    {
        let path = ValuePath::new(PathRoot::Bindings).key(statement.name.clone());
        return Some(descend_by_offset(&statement.value, offset, path));
    }
    match &program.result {
        Some(result) if result.span.contains_offset(offset) => {
            Some(descend_by_offset(result, offset, ValuePath::new(PathRoot::Result)))
        }
        _ => None,
    }
}

fn descend_by_offset(expr: &Expr, offset: usize, mut path: ValuePath) -> ValuePath {
    let mut current = unwrap_blocks(expr);
    loop {
        let next = match &current.kind {
            ExprKind::Dict(entries) => entries.iter().find_map(|entry| {
                let ExprKind::String(key) = &entry.key.kind else {
                    return None;
                };
                entry
                    .key
                    .span
                    .merge(&entry.value.span)
                    .contains_offset(offset)
                    .then(|| (PathEdge::Key(key.clone()), &entry.value))
            }),
            ExprKind::Array(items) => items
                .iter()
                .enumerate()
                .find(|(_, item)| item.span.contains_offset(offset))
                .map(|(i, item)| (PathEdge::Index(i), item)),
            _ => None,
        };
        match next {
            Some((edge, next)) => {
                path.edges.push(edge);
                current = unwrap_blocks(next);
            }
            None => return path,
        }
    }
}
