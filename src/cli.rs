use clap::Parser;
use colored::Colorize;
use rusuite::output::{OutputSink, TestReporter, registry_table};
use rusuite::registry::{RegistryLoader, RegistrySource};
use rusuite::runner::{Orchestrator, RunSettings, discover_available};
use std::future::Future;
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 注册表文件路径（默认查找可执行文件旁的 rusuite.toml）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 套件脚本所在目录
    #[arg(short, long)]
    pub suite_dir: Option<PathBuf>,

    /// 单个套件超时（秒）
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// 运行脚本的解释器程序，例如 "python3"（路径原样使用）
    #[arg(short, long)]
    pub interpreter: Option<String>,

    /// 解释器参数，可重复，例如 --interpreter-arg=-u
    #[arg(long = "interpreter-arg", allow_hyphen_values = true)]
    pub interpreter_args: Vec<String>,

    /// 关闭彩色输出
    #[arg(long)]
    pub no_color: bool,

    /// 只列出注册表中的套件，不执行
    #[arg(short, long)]
    pub list: bool,
}

/// 执行 CLI，返回进程退出码
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    let loaded = match RegistryLoader::resolve(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", format!("✗ {}", e).red());
            return Ok(e.exit_code());
        }
    };

    let mut registry = loaded.registry.clone();
    if let Some(timeout) = cli.timeout {
        registry.timeout_secs = timeout;
    }
    if let Some(interpreter) = cli.interpreter {
        // 换了解释器，注册表中的参数不再适用
        registry.interpreter = Some(interpreter);
        registry.interpreter_args.clear();
    }
    if !cli.interpreter_args.is_empty() {
        registry.interpreter_args = cli.interpreter_args;
    }
    if let Err(e) = registry.validate() {
        eprintln!("{}", format!("✗ {}", e).red());
        return Ok(e.exit_code());
    }

    let suite_dir = loaded.suite_dir(cli.suite_dir.as_deref())?;
    tracing::debug!("Suite directory: {}", suite_dir.display());

    let settings = RunSettings::from_registry(&registry, suite_dir);

    if cli.list {
        let discovery = discover_available(&registry.suites, &settings.suite_dir);
        println!("{}", registry_table(&discovery));
        return Ok(0);
    }

    tracing::info!("Using registry: {}", describe_source(&loaded.source));

    // 在输出任何内容之前注册 Ctrl+C 处理
    let interrupt = operator_interrupt();

    let color = !cli.no_color && std::io::stdout().is_terminal();
    let reporter = TestReporter::new(OutputSink::stdout(color));
    let mut orchestrator = Orchestrator::new(registry.suites, settings, reporter);

    Ok(orchestrator.run(interrupt).await)
}

/// 监听 Ctrl+C，调用时即完成注册
///
/// 监听失败时返回的 future 永不完成，运行照常进行。
fn operator_interrupt() -> impl Future<Output = ()> {
    #[cfg(unix)]
    let listener = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt());
    #[cfg(windows)]
    let listener = tokio::signal::windows::ctrl_c();

    async move {
        match listener {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
}

fn describe_source(source: &RegistrySource) -> String {
    match source {
        RegistrySource::File(path) => path.display().to_string(),
        RegistrySource::Builtin => "built-in".to_string(),
    }
}
