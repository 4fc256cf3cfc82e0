//! 模块
//!
//! 模块是不可变的：只有源码和由源码派生的东西（哈希、AST、命名导入）。
//! 模块名、continues 与 pins 属于项目状态，按名字记录，所以修改被导入
//! 的模块不会改变导入者的哈希。

use super::hash::{hash_code, ModuleHash};
use gauge_core::ast::Program;
use gauge_core::{parse, CompileError, Span};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

pub struct Module {
    hash: ModuleHash,
    code: Arc<str>,
    /// 惰性解析，只解析一次
    ast: OnceCell<Result<Arc<Program>, CompileError>>,
}

impl Module {
    pub fn new(code: impl Into<String>) -> Self {
        let code: String = code.into();
        Self {
            hash: hash_code(&code),
            code: Arc::from(code),
            ast: OnceCell::new(),
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn ast(&self) -> Result<Arc<Program>, CompileError> {
        self.ast
            .get_or_init(|| parse(&self.code).map(Arc::new))
            .clone()
    }

    /// 是否已经解析过
    pub fn is_parsed(&self) -> bool {
        self.ast.get().is_some()
    }

    /// 源码中声明的 `import "x" as y`
    pub fn named_imports(&self) -> Result<Vec<ImportBinding>, CompileError> {
        let ast = self.ast()?;
        Ok(ast
            .imports
            .iter()
            .map(|import| ImportBinding {
                specifier: import.path.clone(),
                kind: ImportKind::Named {
                    variable: import.variable.clone(),
                },
                pin: None,
                location: Some(import.span),
            })
            .collect())
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("hash", &self.hash)
            .field("code_len", &self.code.len())
            .field("parsed", &self.is_parsed())
            .finish()
    }
}

/// 导入的两种形式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    /// `import "name" as variable`：变量绑定为被导入模块 exports 组成的 dict
    Named { variable: String },
    /// 平铺导入：被导入模块的全部绑定成为外部绑定，但不会出现在自身的 bindings 中
    Continue,
}

/// 一条导入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// 源码中写的名字，交给 Linker 解析
    pub specifier: String,
    pub kind: ImportKind,
    /// 导入必须解析到的模块哈希
    pub pin: Option<ModuleHash>,
    pub location: Option<Span>,
}

impl ImportBinding {
    pub fn continues(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            kind: ImportKind::Continue,
            pin: None,
            location: None,
        }
    }

    pub fn variable(&self) -> Option<&str> {
        match &self.kind {
            ImportKind::Named { variable } => Some(variable),
            ImportKind::Continue => None,
        }
    }
}

impl fmt::Display for ImportBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ImportKind::Named { variable } => write!(f, "import \"{}\" as {}", self.specifier, variable),
            ImportKind::Continue => write!(f, "continues \"{}\"", self.specifier),
        }
    }
}

/// Linker 加载到的源码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    pub name: String,
    pub code: String,
}
