use crate::Result;
use crate::error::RusuiteError;
use crate::output::TestReporter;
use crate::registry::{SuiteRegistry, TestSuiteDescriptor};
use crate::runner::discovery::{Discovery, discover_available};
use crate::runner::executor::{Execution, Interpreter, SuiteExecutor, is_interrupted};
use crate::runner::types::{RunReport, RunSummary};
use colored::Colorize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// 截图文件扩展名
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// 一次运行的设置
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// 报告标题
    pub name: String,
    pub suite_dir: PathBuf,
    pub interpreter: Option<Interpreter>,
    pub timeout: Duration,
    /// 截图目录（相对套件目录）
    pub screenshot_dir: PathBuf,
}

impl RunSettings {
    pub fn from_registry(registry: &SuiteRegistry, suite_dir: PathBuf) -> Self {
        Self {
            name: registry.name.clone(),
            suite_dir,
            interpreter: registry.interpreter.as_ref().map(|program| {
                Interpreter::new(program).with_args(registry.interpreter_args.clone())
            }),
            timeout: registry.timeout(),
            screenshot_dir: registry.screenshot_dir.clone(),
        }
    }

    pub fn screenshot_path(&self) -> PathBuf {
        self.suite_dir.join(&self.screenshot_dir)
    }
}

/// 测试编排器：查找 → 逐个执行 → 汇总 → 报告
pub struct Orchestrator {
    descriptors: Vec<TestSuiteDescriptor>,
    settings: RunSettings,
    executor: SuiteExecutor,
    reporter: TestReporter,
}

impl Orchestrator {
    pub fn new(
        descriptors: Vec<TestSuiteDescriptor>,
        settings: RunSettings,
        reporter: TestReporter,
    ) -> Self {
        let executor = SuiteExecutor::new(
            settings.interpreter.clone(),
            settings.timeout,
            settings.suite_dir.clone(),
        );

        Self {
            descriptors,
            settings,
            executor,
            reporter,
        }
    }

    /// 检查注册表中每个套件是否存在
    pub fn discover(&self) -> Discovery {
        discover_available(&self.descriptors, &self.settings.suite_dir)
    }

    /// 运行全部套件并返回进程退出码
    ///
    /// 0：全部通过；1：有失败、没有可用套件或报告出错；130：被用户中断。
    pub async fn run<I>(&mut self, interrupt: I) -> i32
    where
        I: Future<Output = ()>,
    {
        match self.try_run(interrupt).await {
            Ok(report) => report.exit_code(),
            Err(RusuiteError::Reporting(e)) => {
                tracing::error!("Reporting failed: {}", e);
                eprintln!("\n{}", format!("Fatal error: {}", e).red());
                1
            }
            Err(e) => e.exit_code(),
        }
    }

    /// 运行全部套件，返回完整报告
    ///
    /// 单个套件的失败、超时、启动错误都记录在结果中，不会中止运行。
    /// 只有没有可用套件、用户中断和报告输出失败会提前返回错误。
    pub async fn try_run<I>(&mut self, interrupt: I) -> Result<RunReport>
    where
        I: Future<Output = ()>,
    {
        let name = self.settings.name.clone();
        self.reporter.print_header(&name)?;

        let discovery = self.discover();
        self.reporter.print_discovery(&discovery)?;

        let available = discovery.available();
        if available.is_empty() {
            tracing::error!("No test suites found in {}", self.settings.suite_dir.display());
            self.reporter.print_no_suites()?;
            return Err(RusuiteError::NoSuitesAvailable);
        }

        self.reporter
            .print_banner(&format!("Running {} Test Suite(s)", available.len()))?;

        let mut interrupt = std::pin::pin!(interrupt);
        let start = Instant::now();
        let mut results = Vec::with_capacity(available.len());

        for suite in &available {
            if is_interrupted(&mut interrupt).await {
                return Err(self.interrupted());
            }

            self.reporter.print_suite_start(suite)?;

            match self.executor.execute(suite, &mut interrupt).await {
                Execution::Finished(result) => {
                    self.reporter.print_result(&result)?;
                    results.push(result);
                }
                Execution::Interrupted => return Err(self.interrupted()),
            }
        }

        // 最后一个套件结束后到达的中断同样不出报告
        if is_interrupted(&mut interrupt).await {
            return Err(self.interrupted());
        }

        let summary = RunSummary::from_results(&results, start.elapsed());
        let report = RunReport {
            results,
            summary,
            screenshots: count_screenshots(&self.settings.screenshot_path()),
        };

        self.reporter
            .print_report(&report, &self.settings.screenshot_dir)?;

        // 打印报告期间按下的 Ctrl+C 也要体现在退出码上
        if is_interrupted(&mut interrupt).await {
            return Err(self.interrupted());
        }

        Ok(report)
    }

    /// 中断消息尽力输出，退出码不受影响
    fn interrupted(&mut self) -> RusuiteError {
        if let Err(e) = self.reporter.print_interrupted() {
            tracing::warn!("Failed to print interrupt notice: {}", e);
        }
        RusuiteError::Interrupted
    }
}

/// 统计截图目录下的图片数量
///
/// 目录不存在或无法读取时返回 None，从不导致运行失败。
pub fn count_screenshots(dir: &Path) -> Option<usize> {
    if !dir.is_dir() {
        return None;
    }

    match std::fs::read_dir(dir) {
        Ok(entries) => Some(
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .filter(|entry| {
                    entry
                        .path()
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                        .unwrap_or(false)
                })
                .count(),
        ),
        Err(e) => {
            tracing::warn!("Failed to read screenshot directory {}: {}", dir.display(), e);
            None
        }
    }
}
