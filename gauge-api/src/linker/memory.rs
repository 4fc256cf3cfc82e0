//! 内存链接器
//!
//! 所有源码都存放在 `BTreeMap` 中，适合测试与嵌入使用。说明符原样作为模块名。

use super::{verify_pin, Linker};
use crate::error::LinkError;
use crate::project::module::ModuleSource;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct MemoryLinker {
    sources: RwLock<BTreeMap<String, String>>,
    /// 模拟慢速加载
    delay: Option<Duration>,
}

impl MemoryLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预先放入一组 (名字, 源码)
    pub fn with_sources<I, N, C>(sources: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        let linker = Self::new();
        {
            let mut map = linker.sources.write();
            for (name, code) in sources {
                map.insert(name.into(), code.into());
            }
        }
        linker
    }

    /// 每次加载前先睡眠 `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn insert(&self, name: impl Into<String>, code: impl Into<String>) {
        self.sources.write().insert(name.into(), code.into());
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.sources.write().remove(name)
    }
}

impl Linker for MemoryLinker {
    fn resolve(&self, specifier: &str, _from: &str) -> Result<String, LinkError> {
        Ok(specifier.to_string())
    }

    fn load_module(&self, name: &str, pin: Option<&str>) -> Result<ModuleSource, LinkError> {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        let code = self
            .sources
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| LinkError::NotFound {
                name: name.to_string(),
            })?;
        verify_pin(
            ModuleSource {
                name: name.to_string(),
                code,
            },
            pin,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::hash::hash_code;

    #[test]
    fn test_load_known_and_unknown() {
        let linker = MemoryLinker::with_sources([("lib", "x = 1")]);
        assert_eq!(linker.resolve("lib", "main").unwrap(), "lib");
        assert_eq!(linker.load_module("lib", None).unwrap().code, "x = 1");
        assert_eq!(
            linker.load_module("other", None),
            Err(LinkError::NotFound { name: "other".into() })
        );
    }

    #[test]
    fn test_pinned_load() {
        let linker = MemoryLinker::with_sources([("lib", "x = 1")]);
        assert!(linker.load_module("lib", Some(&hash_code("x = 1"))).is_ok());
        linker.insert("lib", "x = 2");
        assert!(matches!(
            linker.load_module("lib", Some(&hash_code("x = 1"))),
            Err(LinkError::HashMismatch { .. })
        ));
    }
}
