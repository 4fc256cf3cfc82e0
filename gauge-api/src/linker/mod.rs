//! 模块链接器
//!
//! Linker 是项目之外的模块来源：
//! - `resolve`：把导入说明符解析为模块名（同步、纯计算）
//! - `load_module`：按名字取回源码（可能很慢，由项目放到后台线程调用）
//!
//! 固定了哈希的加载由 [`verify_pin`] 统一校验。

mod file;
mod memory;

pub use file::FileLinker;
pub use memory::MemoryLinker;

use crate::error::LinkError;
use crate::project::hash::hash_code;
use crate::project::module::ModuleSource;

pub trait Linker: Send + Sync {
    /// 说明符 -> 模块名；`from` 是导入者的模块名
    fn resolve(&self, specifier: &str, from: &str) -> Result<String, LinkError>;

    /// 取回模块源码；`pin` 存在时源码的哈希必须与之相同
    fn load_module(&self, name: &str, pin: Option<&str>) -> Result<ModuleSource, LinkError>;
}

/// 校验加载到的源码是否符合 pin
pub fn verify_pin(source: ModuleSource, pin: Option<&str>) -> Result<ModuleSource, LinkError> {
    let Some(expected) = pin else {
        return Ok(source);
    };
    let actual = hash_code(&source.code);
    if actual == expected {
        Ok(source)
    } else {
        Err(LinkError::HashMismatch {
            name: source.name,
            expected: expected.to_string(),
            actual,
        })
    }
}
