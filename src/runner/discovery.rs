use crate::registry::TestSuiteDescriptor;
use crate::runner::types::AvailableSuite;
use std::path::{Path, PathBuf};

/// 单个描述符的查找结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryEntry {
    pub descriptor: TestSuiteDescriptor,
    pub path: PathBuf,
    pub found: bool,
}

/// 按注册表顺序排列的查找结果
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub entries: Vec<DiscoveryEntry>,
}

impl Discovery {
    /// 存在的套件，保持原有顺序
    pub fn available(&self) -> Vec<AvailableSuite> {
        self.entries
            .iter()
            .filter(|entry| entry.found)
            .map(|entry| AvailableSuite {
                descriptor: entry.descriptor.clone(),
                path: entry.path.clone(),
            })
            .collect()
    }

    pub fn missing(&self) -> impl Iterator<Item = &DiscoveryEntry> {
        self.entries.iter().filter(|entry| !entry.found)
    }
}

/// 检查每个描述符对应的脚本是否存在
///
/// 脚本路径相对 `suite_dir` 解析（绝对路径原样使用），不依赖当前工作目录。
/// 从不失败：缺失的脚本只记录警告。
pub fn discover_available(descriptors: &[TestSuiteDescriptor], suite_dir: &Path) -> Discovery {
    let entries = descriptors
        .iter()
        .map(|descriptor| {
            let path = suite_dir.join(&descriptor.identifier);
            let found = path.is_file();
            if !found {
                tracing::warn!(
                    "Test suite '{}' not found at {}, skipping",
                    descriptor.identifier,
                    path.display()
                );
            }
            DiscoveryEntry {
                descriptor: descriptor.clone(),
                path,
                found,
            }
        })
        .collect();

    Discovery { entries }
}
