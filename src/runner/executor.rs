use crate::registry::TestSuiteDescriptor;
use crate::runner::types::{AvailableSuite, TestSuiteResult};
use std::future::Future;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};

/// 一次执行的结果：正常结束，或被操作者中断
#[derive(Debug)]
pub enum Execution {
    Finished(TestSuiteResult),
    Interrupted,
}

/// 解释器：程序路径原样使用，参数单独列出
///
/// 程序路径不做拆分，允许包含空格。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: String,
    pub args: Vec<String>,
}

impl Interpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// 套件执行器：每个套件一个子进程，带超时
pub struct SuiteExecutor {
    interpreter: Option<Interpreter>,
    timeout: Duration,
    working_dir: PathBuf,
}

impl SuiteExecutor {
    pub fn new(interpreter: Option<Interpreter>, timeout: Duration, working_dir: PathBuf) -> Self {
        Self {
            interpreter,
            timeout,
            working_dir,
        }
    }

    /// 执行单个套件（不可中断）
    pub async fn execute_suite(&self, suite: &AvailableSuite) -> TestSuiteResult {
        let mut never = std::pin::pin!(std::future::pending::<()>());
        match self.execute(suite, &mut never).await {
            Execution::Finished(result) => result,
            Execution::Interrupted => unreachable!("pending future never completes"),
        }
    }

    /// 执行单个套件，同时监听中断
    ///
    /// 子进程继承标准输入输出，不做缓冲。超时或中断时整个进程组会被杀死，
    /// 子进程被回收。中断与子进程退出同时就绪时以中断为准。
    pub async fn execute<I>(&self, suite: &AvailableSuite, interrupt: &mut I) -> Execution
    where
        I: Future<Output = ()> + Unpin,
    {
        let descriptor = suite.descriptor.clone();

        if is_interrupted(interrupt).await {
            tracing::warn!("Interrupted before starting '{}'", descriptor.identifier);
            return Execution::Interrupted;
        }

        let start = Instant::now();
        let mut command = self.command_for(suite);
        tracing::debug!("Spawning {:?}", command.as_std());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!("Failed to spawn '{}': {}", descriptor.identifier, e);
                return Execution::Finished(TestSuiteResult::execution_error(
                    descriptor,
                    e.to_string(),
                    start.elapsed(),
                ));
            }
        };

        let waited = tokio::select! {
            biased;
            _ = &mut *interrupt => None,
            waited = tokio::time::timeout(self.timeout, child.wait()) => Some(waited),
        };

        let result = match waited {
            None => {
                tracing::warn!("Interrupted while running '{}'", descriptor.identifier);
                terminate(&mut child, &descriptor.identifier).await;
                return Execution::Interrupted;
            }
            Some(Err(_elapsed)) => {
                tracing::warn!(
                    "'{}' exceeded {}s timeout, killing",
                    descriptor.identifier,
                    self.timeout.as_secs_f64()
                );
                terminate(&mut child, &descriptor.identifier).await;
                TestSuiteResult::timed_out(descriptor, start.elapsed())
            }
            Some(Ok(Err(e))) => {
                tracing::error!("Failed to wait for '{}': {}", descriptor.identifier, e);
                terminate(&mut child, &descriptor.identifier).await;
                TestSuiteResult::execution_error(descriptor, e.to_string(), start.elapsed())
            }
            Some(Ok(Ok(status))) => classify(descriptor, status, start.elapsed()),
        };

        Execution::Finished(result)
    }

    fn command_for(&self, suite: &AvailableSuite) -> Command {
        let mut command = match &self.interpreter {
            Some(interpreter) => {
                let mut command = Command::new(&interpreter.program);
                command.args(&interpreter.args).arg(&suite.path);
                command
            }
            None => Command::new(&suite.path),
        };

        if self.working_dir.is_dir() {
            command.current_dir(&self.working_dir);
        }

        // 套件自成一个进程组，终止时连同其派生的进程一起杀死
        #[cfg(unix)]
        command.process_group(0);

        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        command
    }
}

/// 中断是否已经发生（只轮询一次，不等待）
pub async fn is_interrupted<I>(interrupt: &mut I) -> bool
where
    I: Future<Output = ()> + Unpin,
{
    // 让出一次，使已送达的信号先被运行时处理
    tokio::task::yield_now().await;
    tokio::select! {
        biased;
        _ = &mut *interrupt => true,
        _ = std::future::ready(()) => false,
    }
}

fn classify(descriptor: TestSuiteDescriptor, status: ExitStatus, duration: Duration) -> TestSuiteResult {
    match status.code() {
        Some(0) => TestSuiteResult::passed(descriptor, duration),
        Some(code) => TestSuiteResult::failed(descriptor, code, duration),
        None => TestSuiteResult::terminated(descriptor, status.to_string(), duration),
    }
}

/// 杀死套件的进程组并回收子进程
async fn terminate(child: &mut Child, identifier: &str) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            tracing::debug!("Failed to kill process group of '{}': {}", identifier, e);
        }
    }

    // kill() 会等待进程退出，不会留下僵尸进程
    if let Err(e) = child.kill().await {
        tracing::warn!("Failed to kill '{}': {}", identifier, e);
    }
}
