//! 内容哈希
//!
//! 模块按源码的 SHA-256 寻址；输出按 (模块名, 模块哈希, 环境哈希,
//! 各导入输出的 id) 寻址。

use gauge_config::Environment;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// 模块源码的哈希（十六进制 SHA-256）
pub type ModuleHash = String;

pub fn hash_code(code: &str) -> ModuleHash {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// 环境哈希：对其 JSON 形式取摘要
pub fn hash_environment(environment: &Environment) -> String {
    let json = serde_json::to_string(environment).unwrap_or_else(|_| format!("{environment:?}"));
    hex::encode(Sha256::digest(json.as_bytes()))
}

/// 一个模块输出的缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OutputId(String);

impl OutputId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 短形式，用于日志
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 按顺序喂入各部分；每部分带长度前缀，避免拼接歧义
pub struct OutputIdBuilder {
    hasher: Sha256,
}

impl OutputIdBuilder {
    pub fn new(module_name: &str, module_hash: &str, environment_hash: &str) -> Self {
        let mut builder = Self {
            hasher: Sha256::new(),
        };
        builder.part(module_name);
        builder.part(module_hash);
        builder.part(environment_hash);
        builder
    }

    fn part(&mut self, part: &str) {
        self.hasher.update((part.len() as u64).to_le_bytes());
        self.hasher.update(part.as_bytes());
    }

    /// 一个已解析导入的输出
    pub fn import_output(mut self, id: &OutputId) -> Self {
        self.part("output");
        self.part(id.as_str());
        self
    }

    /// 一个无法解析的导入（加载失败）
    pub fn unresolved_import(mut self, specifier: &str) -> Self {
        self.part("unresolved");
        self.part(specifier);
        self
    }

    /// 一个指回导入链上模块的导入
    pub fn cyclic_import(mut self, specifier: &str) -> Self {
        self.part("cycle");
        self.part(specifier);
        self
    }

    pub fn finish(self) -> OutputId {
        OutputId(hex::encode(self.hasher.finalize()))
    }
}
