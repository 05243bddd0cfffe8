use crate::registry::TestSuiteDescriptor;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// 已在磁盘上找到的套件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableSuite {
    pub descriptor: TestSuiteDescriptor,

    /// 脚本的绝对路径
    pub path: PathBuf,
}

/// 单个套件的执行结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteOutcome {
    Passed,
    Failed,
    TimedOut,
    ExecutionError,
}

impl SuiteOutcome {
    pub fn is_passed(self) -> bool {
        self == SuiteOutcome::Passed
    }
}

impl fmt::Display for SuiteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SuiteOutcome::Passed => "PASSED",
            SuiteOutcome::Failed => "FAILED",
            SuiteOutcome::TimedOut => "TIMED OUT",
            SuiteOutcome::ExecutionError => "ERROR",
        };
        f.write_str(label)
    }
}

/// 单个套件的执行结果
#[derive(Debug, Clone)]
pub struct TestSuiteResult {
    pub descriptor: TestSuiteDescriptor,

    pub outcome: SuiteOutcome,

    /// 子进程退出码（超时或启动失败时为空）
    pub exit_code: Option<i32>,

    /// 错误消息（启动失败或被信号终止）
    pub error_message: Option<String>,

    /// 执行耗时
    pub duration: Duration,
}

impl TestSuiteResult {
    pub fn passed(descriptor: TestSuiteDescriptor, duration: Duration) -> Self {
        Self {
            descriptor,
            outcome: SuiteOutcome::Passed,
            exit_code: Some(0),
            error_message: None,
            duration,
        }
    }

    pub fn failed(descriptor: TestSuiteDescriptor, exit_code: i32, duration: Duration) -> Self {
        Self {
            descriptor,
            outcome: SuiteOutcome::Failed,
            exit_code: Some(exit_code),
            error_message: None,
            duration,
        }
    }

    /// 子进程没有退出码（Unix 下被信号终止）
    pub fn terminated(descriptor: TestSuiteDescriptor, status: String, duration: Duration) -> Self {
        Self {
            descriptor,
            outcome: SuiteOutcome::Failed,
            exit_code: None,
            error_message: Some(status),
            duration,
        }
    }

    pub fn timed_out(descriptor: TestSuiteDescriptor, duration: Duration) -> Self {
        Self {
            descriptor,
            outcome: SuiteOutcome::TimedOut,
            exit_code: None,
            error_message: None,
            duration,
        }
    }

    pub fn execution_error(
        descriptor: TestSuiteDescriptor,
        error: String,
        duration: Duration,
    ) -> Self {
        Self {
            descriptor,
            outcome: SuiteOutcome::ExecutionError,
            exit_code: None,
            error_message: Some(error),
            duration,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.outcome.is_passed()
    }

    /// 一行结论，例如 "Calendar Page Tests FAILED (exit code: 1)"
    pub fn status_line(&self) -> String {
        let description = &self.descriptor.description;
        match (self.outcome, self.exit_code, &self.error_message) {
            (SuiteOutcome::Failed, Some(code), _) => {
                format!("{} FAILED (exit code: {})", description, code)
            }
            (SuiteOutcome::Failed, None, Some(status)) => {
                format!("{} FAILED ({})", description, status)
            }
            (SuiteOutcome::ExecutionError, _, Some(error)) => {
                format!("{} ERROR: {}", description, error)
            }
            (outcome, _, _) => format!("{} {}", description, outcome),
        }
    }
}

/// 运行摘要，由结果序列派生
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl RunSummary {
    /// `duration` 是整个执行循环的墙钟时间，而不是各套件耗时之和
    pub fn from_results(results: &[TestSuiteResult], duration: Duration) -> Self {
        let passed = results.iter().filter(|r| r.is_passed()).count();

        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.failed == 0
    }
}

/// 一次完整运行的结果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub results: Vec<TestSuiteResult>,
    pub summary: RunSummary,

    /// 截图数量（截图目录不存在时为空）
    pub screenshots: Option<usize>,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        if self.summary.all_passed() { 0 } else { 1 }
    }
}
