//! 测试辅助工具
//!
//! 在临时目录中写出 `.gauge` 文件，并建立使用文件链接器的项目

#![allow(dead_code)]

use gauge_workspace::{FileLinker, Project, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 一个带文件的临时目录
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("gauge_it_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    /// 写出文件并返回它的模块名
    pub fn write(&self, relative: &str, code: &str) -> String {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, code).unwrap();
        FileLinker::module_name(&path)
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

/// 使用文件链接器的项目，入口源码从磁盘读取
pub fn file_project(entry: &Path) -> (Project, String) {
    let project = Project::default().with_linker(Arc::new(FileLinker::new()));
    let name = FileLinker::module_name(entry);
    let code = std::fs::read_to_string(entry).unwrap();
    project.set_source(&name, code);
    (project, name)
}

pub fn number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        other => panic!("expected number, got {other:?}"),
    }
}
