//! 导入解析
//!
//! 一条导入先由 Linker 把说明符解析为模块名（同步），再把模块名解析为
//! 具体的模块哈希：未固定的导入跟随该名字的 head，固定的导入必须解析到
//! pin 指定的哈希。找不到模块时向 Linker 发起一次异步加载。

use super::hash::ModuleHash;
use crate::error::LinkError;

/// 解析记录的键：(导入者的模块名, 说明符)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolutionKey {
    pub importer: String,
    pub specifier: String,
}

impl ResolutionKey {
    pub fn new(importer: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            importer: importer.into(),
            specifier: specifier.into(),
        }
    }
}

/// 一条导入当前的解析状态
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Loading { target: String },
    Loaded { target: String, hash: ModuleHash },
    Failed { target: Option<String>, error: LinkError },
}

impl Resolution {
    pub fn target(&self) -> Option<&str> {
        match self {
            Resolution::Loading { target } | Resolution::Loaded { target, .. } => Some(target),
            Resolution::Failed { target, .. } => target.as_deref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resolution::Loading { .. })
    }
}

/// 一次 Linker 加载的键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub name: String,
    pub pin: Option<ModuleHash>,
}

impl LoadKey {
    pub fn new(name: impl Into<String>, pin: Option<ModuleHash>) -> Self {
        Self {
            name: name.into(),
            pin,
        }
    }
}

/// 进行中或失败的加载；成功的加载直接落为模块
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Failed(LinkError),
}
