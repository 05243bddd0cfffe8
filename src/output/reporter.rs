use crate::Result;
use crate::error::RusuiteError;
use crate::output::sink::OutputSink;
use crate::runner::discovery::{Discovery, DiscoveryEntry};
use crate::runner::types::{AvailableSuite, RunReport, RunSummary, TestSuiteResult};
use colored::{ColoredString, Colorize};
use std::path::Path;

const WIDTH: usize = 60;

/// 终端报告器
///
/// 所有输出都写入构造时传入的 [`OutputSink`]，写入失败统一转换为
/// [`RusuiteError::Reporting`]。
pub struct TestReporter {
    sink: OutputSink,
}

impl TestReporter {
    pub fn new(sink: OutputSink) -> Self {
        Self { sink }
    }

    /// 按 sink 的颜色设置着色
    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.sink.color() {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: impl AsRef<str>) -> Result<()> {
        self.sink.line(text).map_err(RusuiteError::Reporting)
    }

    fn blank(&mut self) -> Result<()> {
        self.sink.blank().map_err(RusuiteError::Reporting)
    }

    pub fn success(&mut self, text: &str) -> Result<()> {
        let line = self.paint(&format!("✓ {}", text), |s| s.green());
        self.line(line)
    }

    pub fn error(&mut self, text: &str) -> Result<()> {
        let line = self.paint(&format!("✗ {}", text), |s| s.red());
        self.line(line)
    }

    pub fn warning(&mut self, text: &str) -> Result<()> {
        let line = self.paint(&format!("⚠ {}", text), |s| s.yellow());
        self.line(line)
    }

    fn strong(&self, text: &str) -> String {
        self.paint(text, |s| s.bold())
    }

    /// 打印居中的分节标题
    pub fn print_banner(&mut self, title: &str) -> Result<()> {
        let rule = self.paint(&"=".repeat(WIDTH), |s| s.blue().bold());
        let centered = self.paint(&format!("{:^width$}", title, width = WIDTH), |s| {
            s.blue().bold()
        });

        self.blank()?;
        self.line(&rule)?;
        self.line(centered)?;
        self.line(&rule)?;
        self.blank()
    }

    /// 打印运行开始
    pub fn print_header(&mut self, name: &str) -> Result<()> {
        self.print_banner(name)?;
        let started = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("{} {}", self.strong("Started:"), started);
        self.line(line)
    }

    /// 打印套件查找结果（按注册表顺序）
    pub fn print_discovery(&mut self, discovery: &Discovery) -> Result<()> {
        let heading = self.strong("Checking test files...");
        self.line(heading)?;
        for entry in &discovery.entries {
            self.print_discovery_entry(entry)?;
        }
        Ok(())
    }

    fn print_discovery_entry(&mut self, entry: &DiscoveryEntry) -> Result<()> {
        if entry.found {
            self.success(&format!("Found: {}", entry.descriptor.identifier))
        } else {
            self.warning(&format!("Not found: {}", entry.descriptor.identifier))
        }
    }

    pub fn print_no_suites(&mut self) -> Result<()> {
        self.error("No test suites found!")
    }

    /// 打印单个套件开始
    pub fn print_suite_start(&mut self, suite: &AvailableSuite) -> Result<()> {
        self.blank()?;
        let running = self.strong(&format!("Running: {}", suite.descriptor.description));
        self.line(running)?;
        self.line(format!("Test file: {}", suite.path.display()))?;
        self.line("-".repeat(WIDTH))
    }

    /// 打印单个套件结论
    pub fn print_result(&mut self, result: &TestSuiteResult) -> Result<()> {
        let status = result.status_line();
        if result.is_passed() {
            self.success(&status)
        } else {
            self.error(&status)
        }
    }

    /// 打印测试摘要
    pub fn print_summary(&mut self, summary: &RunSummary) -> Result<()> {
        self.print_banner("Test Summary")?;

        let total = format!("{} {}", self.strong("Total Tests:"), summary.total);
        self.line(total)?;
        self.success(&format!("Passed: {}", summary.passed))?;
        if summary.failed > 0 {
            self.error(&format!("Failed: {}", summary.failed))?;
        } else {
            let failed = self.paint("Failed: 0", |s| s.green());
            self.line(failed)?;
        }

        self.blank()?;
        let duration = format!(
            "{} {:.2} seconds",
            self.strong("Duration:"),
            summary.duration.as_secs_f64()
        );
        self.line(duration)
    }

    /// 按发现顺序逐个打印结果
    pub fn print_details(&mut self, results: &[TestSuiteResult]) -> Result<()> {
        self.blank()?;
        let heading = self.strong("Detailed Results:");
        self.line(heading)?;

        for result in results {
            if result.is_passed() {
                self.success(&result.descriptor.description)?;
            } else {
                self.error(&result.status_line())?;
            }
        }
        Ok(())
    }

    pub fn print_screenshots(&mut self, count: usize, dir: &Path) -> Result<()> {
        self.blank()?;
        let line = format!(
            "{} {} saved in {}/",
            self.strong("Screenshots:"),
            count,
            dir.display()
        );
        self.line(line)
    }

    pub fn print_final_status(&mut self, summary: &RunSummary) -> Result<()> {
        self.print_banner("Final Status")?;
        let banner = if summary.all_passed() {
            self.paint("ALL TESTS PASSED! ✓", |s| s.green().bold())
        } else {
            self.paint("SOME TESTS FAILED! ✗", |s| s.red().bold())
        };
        self.line(banner)
    }

    /// 打印完整报告：摘要、逐项结果、截图数量、最终状态
    pub fn print_report(&mut self, report: &RunReport, screenshot_dir: &Path) -> Result<()> {
        self.print_summary(&report.summary)?;
        self.print_details(&report.results)?;
        if let Some(count) = report.screenshots {
            self.print_screenshots(count, screenshot_dir)?;
        }
        self.print_final_status(&report.summary)
    }

    pub fn print_interrupted(&mut self) -> Result<()> {
        self.blank()?;
        self.blank()?;
        let line = self.paint("Tests interrupted by user", |s| s.yellow());
        self.line(line)
    }
}
