use thiserror::Error;

#[derive(Error, Debug)]
pub enum RusuiteError {
    #[error("没有可用的测试套件")]
    NoSuitesAvailable,

    #[error("测试被用户中断")]
    Interrupted,

    #[error("报告输出失败: {0}")]
    Reporting(std::io::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML 解析错误: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl RusuiteError {
    /// 进程退出码：中断为 130（SIGINT 约定），其余均为 1
    pub fn exit_code(&self) -> i32 {
        match self {
            RusuiteError::Interrupted => 130,
            _ => 1,
        }
    }
}

impl From<anyhow::Error> for RusuiteError {
    fn from(err: anyhow::Error) -> Self {
        RusuiteError::Other(err.to_string())
    }
}

/// Result type for rusuite crate
pub type Result<T> = std::result::Result<T, RusuiteError>;
