//! 文件链接器
//!
//! 模块名就是规范化后的文件路径。只接受相对说明符（`./`、`../`），
//! 相对于导入者所在目录解析；没有扩展名时补上 `.gauge`。

use super::{verify_pin, Linker};
use crate::error::LinkError;
use crate::project::module::ModuleSource;
use gauge_config::targets;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// 源文件扩展名
pub const EXTENSION: &str = "gauge";

#[derive(Debug, Clone, Copy, Default)]
pub struct FileLinker;

impl FileLinker {
    pub fn new() -> Self {
        Self
    }

    /// 把路径转换为模块名（词法规范化，统一使用 `/`）
    pub fn module_name(path: &Path) -> String {
        normalize(path).to_string_lossy().replace('\\', "/")
    }
}

/// 去掉 `.` 并折叠 `..`，不访问文件系统
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

impl Linker for FileLinker {
    fn resolve(&self, specifier: &str, from: &str) -> Result<String, LinkError> {
        if !(specifier.starts_with("./") || specifier.starts_with("../")) {
            return Err(LinkError::InvalidPath {
                specifier: specifier.to_string(),
                reason: "only relative imports ('./' or '../') are supported".to_string(),
            });
        }
        let base = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
        let mut path = base.join(specifier);
        if path.extension().is_none() {
            path.set_extension(EXTENSION);
        }
        Ok(Self::module_name(&path))
    }

    fn load_module(&self, name: &str, pin: Option<&str>) -> Result<ModuleSource, LinkError> {
        debug!(target: targets::PROJECT, module = name, "Reading module file");
        let code = std::fs::read_to_string(name).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LinkError::NotFound {
                name: name.to_string(),
            },
            _ => LinkError::Io {
                name: name.to_string(),
                message: e.to_string(),
            },
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

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gauge_linker_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_resolve_relative() {
        let linker = FileLinker::new();
        assert_eq!(linker.resolve("./lib", "models/main.gauge").unwrap(), "models/lib.gauge");
        assert_eq!(linker.resolve("../shared/rates.gauge", "models/main.gauge").unwrap(), "shared/rates.gauge");
        assert_eq!(linker.resolve("./lib", "main.gauge").unwrap(), "lib.gauge");
    }

    #[test]
    fn test_resolve_rejects_bare_names() {
        let linker = FileLinker::new();
        assert!(matches!(
            linker.resolve("lib", "main.gauge"),
            Err(LinkError::InvalidPath { .. })
        ));
        assert!(linker.resolve("/etc/lib", "main.gauge").is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = temp_dir("load");
        let path = dir.join("lib.gauge");
        std::fs::write(&path, "export x = 1").unwrap();

        let linker = FileLinker::new();
        let name = FileLinker::module_name(&path);
        assert_eq!(linker.load_module(&name, None).unwrap().code, "export x = 1");

        let missing = FileLinker::module_name(&dir.join("missing.gauge"));
        assert!(matches!(
            linker.load_module(&missing, None),
            Err(LinkError::NotFound { .. })
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
