#![cfg(unix)]

use rusuite::RusuiteError;
use rusuite::output::{OutputSink, SharedBuffer, TestReporter};
use rusuite::registry::{SuiteRegistry, TestSuiteDescriptor};
use rusuite::runner::{Interpreter, Orchestrator, RunSettings, SuiteOutcome};
use std::fs;
use std::future::{Future, pending, poll_fn, ready};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::task::Poll;
use std::time::Duration;
use tempfile::TempDir;

fn write_suite(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn settings(dir: &Path, timeout: Duration) -> RunSettings {
    RunSettings {
        name: "Club Site".to_string(),
        suite_dir: dir.to_path_buf(),
        interpreter: Some(Interpreter::new("sh")),
        timeout,
        screenshot_dir: "screenshots".into(),
    }
}

/// 标志文件出现即视为中断
fn flag_raised(flag: PathBuf) -> impl Future<Output = ()> {
    poll_fn(move |cx| {
        if flag.exists() {
            Poll::Ready(())
        } else {
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
}

/// 写入包含指定文本时失败，其余写入正常
struct FailOn(&'static str);

impl Write for FailOn {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if String::from_utf8_lossy(buf).contains(self.0) {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        } else {
            Ok(buf.len())
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_sink(
    descriptors: Vec<TestSuiteDescriptor>,
    settings: RunSettings,
    writer: impl Write + Send + 'static,
) -> Orchestrator {
    Orchestrator::new(
        descriptors,
        settings,
        TestReporter::new(OutputSink::new(writer, false)),
    )
}

fn build(
    descriptors: Vec<TestSuiteDescriptor>,
    settings: RunSettings,
) -> (Orchestrator, SharedBuffer) {
    let (sink, buffer) = OutputSink::buffer(false);
    (
        Orchestrator::new(descriptors, settings, TestReporter::new(sink)),
        buffer,
    )
}

/// A 通过、B 失败、C 缺失、D 超时
#[tokio::test]
async fn test_mixed_outcomes_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_suite(dir.path(), "a.sh", "echo '[OK] homepage'\nexit 0\n");
    write_suite(dir.path(), "b.sh", "echo '[FAIL] calendar'\nexit 1\n");
    write_suite(dir.path(), "d.sh", "exec sleep 30\n");

    let descriptors = vec![
        TestSuiteDescriptor::new("a.sh", "Suite A"),
        TestSuiteDescriptor::new("b.sh", "Suite B"),
        TestSuiteDescriptor::new("c.sh", "Suite C"),
        TestSuiteDescriptor::new("d.sh", "Suite D"),
    ];

    let (mut orchestrator, buffer) =
        build(descriptors, settings(dir.path(), Duration::from_secs(1)));

    let discovered: Vec<String> = orchestrator
        .discover()
        .available()
        .into_iter()
        .map(|s| s.descriptor.identifier)
        .collect();
    assert_eq!(discovered, vec!["a.sh", "b.sh", "d.sh"]);

    let report = orchestrator.try_run(pending::<()>()).await.unwrap();

    let outcomes: Vec<(&str, SuiteOutcome, Option<i32>)> = report
        .results
        .iter()
        .map(|r| (r.descriptor.identifier.as_str(), r.outcome, r.exit_code))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("a.sh", SuiteOutcome::Passed, Some(0)),
            ("b.sh", SuiteOutcome::Failed, Some(1)),
            ("d.sh", SuiteOutcome::TimedOut, None),
        ]
    );

    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.summary.failed, 2);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.screenshots, None);

    let output = buffer.contents();
    assert!(output.contains("⚠ Not found: c.sh"));
    assert!(output.contains("Running 3 Test Suite(s)"));
    assert!(output.contains("✓ Suite A PASSED"));
    assert!(output.contains("✗ Suite B FAILED (exit code: 1)"));
    assert!(output.contains("✗ Suite D TIMED OUT"));
    assert!(output.contains("SOME TESTS FAILED! ✗"));
}

#[tokio::test]
async fn test_single_passing_suite_exits_zero() {
    let dir = TempDir::new().unwrap();
    write_suite(dir.path(), "e.sh", "exit 0\n");

    let descriptors = vec![TestSuiteDescriptor::new("e.sh", "Suite E")];

    let (mut orchestrator, _) =
        build(descriptors.clone(), settings(dir.path(), Duration::from_secs(10)));
    let report = orchestrator.try_run(pending::<()>()).await.unwrap();
    assert_eq!(report.summary.total, 1);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.summary.failed, 0);

    let (mut orchestrator, buffer) =
        build(descriptors, settings(dir.path(), Duration::from_secs(10)));
    assert_eq!(orchestrator.run(pending::<()>()).await, 0);
    assert!(buffer.contents().contains("ALL TESTS PASSED! ✓"));
}

#[tokio::test]
async fn test_no_available_suites() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("spawned");

    // 解释器若被调用会留下标记文件
    let mut run_settings = settings(dir.path(), Duration::from_secs(10));
    run_settings.interpreter =
        Some(Interpreter::new("touch").with_args([marker.display().to_string()]));

    let descriptors = vec![
        TestSuiteDescriptor::new("missing_one.sh", "Missing One"),
        TestSuiteDescriptor::new("missing_two.sh", "Missing Two"),
    ];

    let (mut orchestrator, buffer) = build(descriptors.clone(), run_settings.clone());
    let err = orchestrator.try_run(pending::<()>()).await.unwrap_err();
    assert!(matches!(err, RusuiteError::NoSuitesAvailable));
    assert!(buffer.contents().contains("✗ No test suites found!"));

    let (mut orchestrator, _) = build(descriptors, run_settings);
    assert_eq!(orchestrator.run(pending::<()>()).await, 1);
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_interrupt_stops_run() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("b.pid");
    let c_marker = dir.path().join("c.ran");

    write_suite(dir.path(), "a.sh", "exit 0\n");
    write_suite(
        dir.path(),
        "b.sh",
        &format!("echo $$ > {}\nexec sleep 30\n", pid_file.display()),
    );
    write_suite(dir.path(), "c.sh", &format!("touch {}\n", c_marker.display()));

    let descriptors = vec![
        TestSuiteDescriptor::new("a.sh", "Suite A"),
        TestSuiteDescriptor::new("b.sh", "Suite B"),
        TestSuiteDescriptor::new("c.sh", "Suite C"),
    ];

    let (mut orchestrator, buffer) =
        build(descriptors, settings(dir.path(), Duration::from_secs(20)));

    let code = orchestrator
        .run(tokio::time::sleep(Duration::from_millis(1500)))
        .await;
    assert_eq!(code, 130);

    let output = buffer.contents();
    assert!(output.contains("✓ Suite A PASSED"));
    assert!(output.contains("Tests interrupted by user"));
    assert!(!output.contains("Running: Suite C"));
    assert!(!output.contains("Test Summary"));
    assert!(!c_marker.exists());

    // B 已被杀死
    let pid = fs::read_to_string(&pid_file).unwrap().trim().to_string();
    let alive = std::process::Command::new("kill")
        .args(["-0", &pid])
        .status()
        .unwrap();
    assert!(!alive.success());
}

#[tokio::test]
async fn test_execution_error_does_not_stop_run() {
    let dir = TempDir::new().unwrap();
    write_suite(dir.path(), "direct.sh", "exit 0\n");
    write_suite(dir.path(), "after.sh", "exit 0\n");

    // 无解释器且脚本没有执行权限：启动失败
    let mut run_settings = settings(dir.path(), Duration::from_secs(10));
    run_settings.interpreter = None;

    let descriptors = vec![
        TestSuiteDescriptor::new("direct.sh", "Direct"),
        TestSuiteDescriptor::new("after.sh", "After"),
    ];
    let (mut orchestrator, buffer) = build(descriptors, run_settings);
    let report = orchestrator.try_run(pending::<()>()).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(
        report
            .results
            .iter()
            .all(|r| r.outcome == SuiteOutcome::ExecutionError)
    );
    assert!(report.results[0].error_message.is_some());
    assert!(buffer.contents().contains("✗ Direct ERROR: "));
}

#[tokio::test]
async fn test_screenshot_count_reported() {
    let dir = TempDir::new().unwrap();
    write_suite(
        dir.path(),
        "shot.sh",
        "mkdir -p screenshots\ntouch screenshots/homepage.png screenshots/calendar.png\n",
    );

    let registry = SuiteRegistry {
        suites: vec![TestSuiteDescriptor::new("shot.sh", "Screenshots")],
        interpreter: Some("sh".to_string()),
        ..SuiteRegistry::builtin()
    };
    let run_settings = RunSettings::from_registry(&registry, dir.path().to_path_buf());

    let (mut orchestrator, buffer) = build(registry.suites.clone(), run_settings);
    let report = orchestrator.try_run(pending::<()>()).await.unwrap();

    assert_eq!(report.screenshots, Some(2));
    assert!(buffer.contents().contains("Screenshots: 2 saved in screenshots/"));
}

/// B 退出的同时中断就绪：C 不得启动
#[tokio::test]
async fn test_interrupt_at_suite_exit_stops_run() {
    for _ in 0..5 {
        let dir = TempDir::new().unwrap();
        let flag = dir.path().join("stop");
        let c_marker = dir.path().join("c.ran");

        write_suite(dir.path(), "a.sh", "exit 0\n");
        write_suite(
            dir.path(),
            "b.sh",
            &format!("touch '{}'\nexit 1\n", flag.display()),
        );
        write_suite(dir.path(), "c.sh", &format!("touch '{}'\n", c_marker.display()));

        let descriptors = vec![
            TestSuiteDescriptor::new("a.sh", "Suite A"),
            TestSuiteDescriptor::new("b.sh", "Suite B"),
            TestSuiteDescriptor::new("c.sh", "Suite C"),
        ];
        let (mut orchestrator, buffer) =
            build(descriptors, settings(dir.path(), Duration::from_secs(10)));

        let code = orchestrator.run(flag_raised(flag.clone())).await;
        assert_eq!(code, 130);

        let output = buffer.contents();
        assert!(output.contains("Tests interrupted by user"));
        assert!(!output.contains("Running: Suite C"));
        assert!(!output.contains("Test Summary"));
        assert!(!c_marker.exists());
    }
}

/// 最后一个套件结束时到达的中断：不出报告，退出码 130
#[tokio::test]
async fn test_interrupt_after_last_suite_skips_report() {
    let dir = TempDir::new().unwrap();
    let flag = dir.path().join("stop");
    write_suite(
        dir.path(),
        "last.sh",
        &format!("touch '{}'\nexit 0\n", flag.display()),
    );

    let descriptors = vec![TestSuiteDescriptor::new("last.sh", "Last")];
    let (mut orchestrator, buffer) =
        build(descriptors, settings(dir.path(), Duration::from_secs(10)));

    assert_eq!(orchestrator.run(flag_raised(flag)).await, 130);

    let output = buffer.contents();
    assert!(output.contains("Tests interrupted by user"));
    assert!(!output.contains("Test Summary"));
    assert!(!output.contains("ALL TESTS PASSED"));
}

/// 运行开始前已经按下 Ctrl+C：不启动任何套件
#[tokio::test]
async fn test_interrupt_before_first_suite() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("a.ran");
    write_suite(dir.path(), "a.sh", &format!("touch '{}'\n", marker.display()));

    let descriptors = vec![TestSuiteDescriptor::new("a.sh", "Suite A")];
    let (mut orchestrator, buffer) =
        build(descriptors, settings(dir.path(), Duration::from_secs(10)));

    assert_eq!(orchestrator.run(ready(())).await, 130);

    let output = buffer.contents();
    assert!(output.contains("✓ Found: a.sh"));
    assert!(!output.contains("Running: Suite A"));
    assert!(output.contains("Tests interrupted by user"));
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_broken_sink_exits_one() {
    let dir = TempDir::new().unwrap();
    write_suite(dir.path(), "e.sh", "exit 0\n");
    let descriptors = vec![TestSuiteDescriptor::new("e.sh", "Suite E")];

    // 从第一行起就无法写入
    let mut orchestrator = with_sink(
        descriptors.clone(),
        settings(dir.path(), Duration::from_secs(10)),
        FailOn(""),
    );
    assert_eq!(orchestrator.run(pending::<()>()).await, 1);

    // 套件全部通过，但摘要写不出去
    let mut orchestrator = with_sink(
        descriptors,
        settings(dir.path(), Duration::from_secs(10)),
        FailOn("Test Summary"),
    );
    assert_eq!(orchestrator.run(pending::<()>()).await, 1);
}

#[tokio::test]
async fn test_broken_sink_interrupted_exits_130() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("slow.pid");
    write_suite(
        dir.path(),
        "slow.sh",
        &format!("echo $$ > '{}'\nexec sleep 30\n", pid_file.display()),
    );
    let descriptors = vec![TestSuiteDescriptor::new("slow.sh", "Slow")];

    let mut orchestrator = with_sink(
        descriptors,
        settings(dir.path(), Duration::from_secs(20)),
        FailOn("interrupted"),
    );
    let interrupt = async {
        while !pid_file.exists() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };
    assert_eq!(orchestrator.run(interrupt).await, 130);
}
