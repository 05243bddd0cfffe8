use crate::Result;
use crate::error::RusuiteError;
use crate::registry::types::SuiteRegistry;
use std::fs;
use std::path::{Path, PathBuf};

/// 注册表来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    /// 从文件加载
    File(PathBuf),
    /// 内置默认注册表
    Builtin,
}

/// 已加载的注册表及其来源
#[derive(Debug, Clone)]
pub struct LoadedRegistry {
    pub registry: SuiteRegistry,
    pub source: RegistrySource,
}

impl LoadedRegistry {
    /// 解析套件目录，与当前工作目录无关
    ///
    /// 优先级：CLI 覆盖 > 注册表 `suite_dir`（相对注册表文件）> 注册表文件所在目录。
    /// 内置注册表使用可执行文件所在目录。
    pub fn suite_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(std::path::absolute(dir)?);
        }

        let base = match &self.source {
            RegistrySource::File(path) => parent_dir(path)?,
            RegistrySource::Builtin => RegistryLoader::executable_dir()?,
        };

        Ok(match &self.registry.suite_dir {
            Some(dir) => base.join(dir),
            None => base,
        })
    }
}

/// 注册表文件加载器
pub struct RegistryLoader;

impl RegistryLoader {
    /// 注册表文件名
    pub const REGISTRY_FILE: &'static str = "rusuite.toml";
    /// 指定注册表路径的环境变量
    pub const REGISTRY_ENV: &'static str = "RUSUITE_CONFIG";

    /// 从指定路径加载注册表
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<SuiteRegistry> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RusuiteError::Config(format!(
                "Failed to read registry file {}: {}",
                path.display(),
                e
            ))
        })?;

        let registry: SuiteRegistry = toml::from_str(&content)?;
        registry.validate()?;
        Ok(registry)
    }

    /// 查找并加载注册表
    /// 查找顺序：
    /// 1. 显式路径（--config）
    /// 2. 环境变量 RUSUITE_CONFIG
    /// 3. 可执行文件所在目录
    /// 4. 用户配置目录 ~/.config/rusuite/
    /// 5. 内置注册表
    pub fn resolve(explicit: Option<&Path>) -> Result<LoadedRegistry> {
        let env_path = std::env::var_os(Self::REGISTRY_ENV).map(PathBuf::from);

        // 显式指定的文件必须存在
        if let Some(path) = explicit.map(Path::to_path_buf).or(env_path) {
            let path = std::path::absolute(&path)?;
            let registry = Self::load_from_path(&path)?;
            tracing::debug!("Loaded registry from {}", path.display());
            return Ok(LoadedRegistry {
                registry,
                source: RegistrySource::File(path),
            });
        }

        for candidate in [Self::executable_candidate(), Self::user_candidate()]
            .into_iter()
            .flatten()
        {
            if candidate.is_file() {
                let registry = Self::load_from_path(&candidate)?;
                tracing::debug!("Loaded registry from {}", candidate.display());
                return Ok(LoadedRegistry {
                    registry,
                    source: RegistrySource::File(candidate),
                });
            }
        }

        tracing::debug!("No registry file found, using built-in registry");
        Ok(LoadedRegistry {
            registry: SuiteRegistry::builtin(),
            source: RegistrySource::Builtin,
        })
    }

    /// 可执行文件所在目录
    pub fn executable_dir() -> Result<PathBuf> {
        let exe = std::env::current_exe()?;
        parent_dir(&exe)
    }

    fn executable_candidate() -> Option<PathBuf> {
        Self::executable_dir()
            .ok()
            .map(|dir| dir.join(Self::REGISTRY_FILE))
    }

    fn user_candidate() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rusuite").join(Self::REGISTRY_FILE))
    }
}

fn parent_dir(path: &Path) -> Result<PathBuf> {
    path.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| RusuiteError::Config(format!("{} has no parent directory", path.display())))
}
