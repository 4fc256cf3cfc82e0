//! 模块图拓扑
//!
//! 依赖边由调用方以闭包给出（导入解析需要 Linker），这里只做图算法。

use crate::error::GraphError;
use std::collections::{BTreeSet, HashSet};

/// 从 `entries` 出发的拓扑序，依赖在前；遇到环返回 `GraphError::Cycle`
pub fn run_order<F>(entries: &[String], dependencies: F) -> Result<Vec<String>, GraphError>
where
    F: Fn(&str) -> Vec<String>,
{
    let mut result = Vec::new();
    let mut visited = HashSet::new();
    let mut temp_mark: Vec<String> = Vec::new();

    fn visit<F: Fn(&str) -> Vec<String>>(
        name: &str,
        dependencies: &F,
        visited: &mut HashSet<String>,
        temp_mark: &mut Vec<String>,
        result: &mut Vec<String>,
    ) -> Result<(), GraphError> {
        if let Some(start) = temp_mark.iter().position(|n| n == name) {
            // 发现循环依赖
            let mut chain = temp_mark[start..].to_vec();
            chain.push(name.to_string());
            return Err(GraphError::Cycle { chain });
        }

        if visited.contains(name) {
            return Ok(());
        }

        temp_mark.push(name.to_string());
        for dep in dependencies(name) {
            visit(&dep, dependencies, visited, temp_mark, result)?;
        }
        temp_mark.pop();

        visited.insert(name.to_string());
        result.push(name.to_string());
        Ok(())
    }

    for entry in entries {
        visit(entry, &dependencies, &mut visited, &mut temp_mark, &mut result)?;
    }
    Ok(result)
}

/// 直接依赖 `name` 的模块，按名字排序
pub fn dependents<F>(all: &[String], name: &str, dependencies: F) -> Vec<String>
where
    F: Fn(&str) -> Vec<String>,
{
    all.iter()
        .filter(|candidate| candidate.as_str() != name)
        .filter(|candidate| dependencies(candidate).iter().any(|d| d == name))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 传递地依赖 `name` 的模块（不含 `name` 本身）
pub fn transitive_dependents<F>(all: &[String], name: &str, dependencies: F) -> Vec<String>
where
    F: Fn(&str) -> Vec<String>,
{
    let mut found: BTreeSet<String> = BTreeSet::new();
    let mut queue = vec![name.to_string()];
    while let Some(current) = queue.pop() {
        for dependent in dependents(all, &current, &dependencies) {
            if dependent != name && found.insert(dependent.clone()) {
                queue.push(dependent);
            }
        }
    }
    found.into_iter().collect()
}
