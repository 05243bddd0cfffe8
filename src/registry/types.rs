use crate::Result;
use crate::error::RusuiteError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 单个套件超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// 截图目录（相对套件目录）
pub const DEFAULT_SCREENSHOT_DIR: &str = "screenshots";
pub const DEFAULT_RUN_NAME: &str = "Test Suite";

/// 测试套件描述符：脚本标识 + 人类可读的标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuiteDescriptor {
    /// 脚本文件名或路径（相对套件目录）
    #[serde(rename = "script")]
    pub identifier: String,

    /// 报告中显示的描述
    pub description: String,
}

impl TestSuiteDescriptor {
    pub fn new(identifier: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            description: description.into(),
        }
    }
}

/// 套件注册表（rusuite.toml 的完整内容）
///
/// `suites` 的顺序即执行顺序和报告顺序。
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteRegistry {
    /// 报告标题
    #[serde(default = "default_name")]
    pub name: String,

    /// 运行脚本的解释器程序，例如 "python3"，路径原样使用
    /// 为空时直接执行脚本
    #[serde(default)]
    pub interpreter: Option<String>,

    /// 放在脚本路径之前的解释器参数，例如 ["-u"]
    #[serde(default)]
    pub interpreter_args: Vec<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 套件目录（相对注册表文件所在目录）
    #[serde(default)]
    pub suite_dir: Option<PathBuf>,

    /// 截图目录（相对套件目录）
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,

    #[serde(default)]
    pub suites: Vec<TestSuiteDescriptor>,
}

fn default_name() -> String {
    DEFAULT_RUN_NAME.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SCREENSHOT_DIR)
}

impl SuiteRegistry {
    /// 内置注册表：俱乐部网站的四个浏览器测试脚本
    pub fn builtin() -> Self {
        let interpreter = if cfg!(windows) { "python" } else { "python3" };

        Self {
            name: "Visclub SiM Test Suite".to_string(),
            interpreter: Some(interpreter.to_string()),
            interpreter_args: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            suite_dir: None,
            screenshot_dir: default_screenshot_dir(),
            suites: vec![
                TestSuiteDescriptor::new("test_homepage.py", "Homepage & Navigation Tests"),
                TestSuiteDescriptor::new("test_calendar.py", "Calendar Page Tests"),
                TestSuiteDescriptor::new("test_registration.py", "Registration Form Tests"),
                TestSuiteDescriptor::new("test_admin_with_server.py", "Admin Panel Tests"),
            ],
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 校验注册表内容
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(RusuiteError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(interpreter) = &self.interpreter
            && interpreter.trim().is_empty()
        {
            return Err(RusuiteError::Config(
                "interpreter must not be blank".to_string(),
            ));
        }

        if self.interpreter.is_none() && !self.interpreter_args.is_empty() {
            return Err(RusuiteError::Config(
                "interpreter_args requires an interpreter".to_string(),
            ));
        }

        for (index, suite) in self.suites.iter().enumerate() {
            if suite.identifier.trim().is_empty() {
                return Err(RusuiteError::Config(format!(
                    "suite #{} has an empty script",
                    index + 1
                )));
            }
            if suite.description.trim().is_empty() {
                return Err(RusuiteError::Config(format!(
                    "suite '{}' has an empty description",
                    suite.identifier
                )));
            }
        }

        Ok(())
    }
}

impl Default for SuiteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
