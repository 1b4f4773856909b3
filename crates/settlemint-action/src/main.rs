//! SettleMint CLI Action 入口程序。
//!
//! 职责：
//! - 在 GitHub Actions 风格的 runner 上执行一次完整运行（默认子命令 `run`）
//! - 提供排障用的子命令：命令解析预览、工具缓存检测、环境自检
//!
//! 输出约定：
//! - 标准输出保留给 workflow command 与 CLI 自身输出
//! - 内部诊断日志（`tracing`）写到标准错误，级别由 `RUST_LOG` 控制
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use settlemint_core::command::parse_command;
use settlemint_core::paths;
use settlemint_core::run::{run, ActionConfig, RunOutcome};
use settlemint_core::toolkit::{Reporter, ToolCache};
use settlemint_core::version::validate_version;
use settlemint_toolkit::tool_cache::FsToolCache;
use settlemint_toolkit::{RunnerDirs, RunnerToolkit};
use tracing::{debug, info};

/// 命令行参数。
///
/// 说明：
/// - 目录参数缺省时按 runner 环境变量解析（`RUNNER_TOOL_CACHE`、`RUNNER_TEMP`）
/// - Action 的业务输入不走命令行，而是来自 `INPUT_<NAME>` 环境变量
#[derive(Debug, Parser)]
#[command(name = "settlemint-action", version)]
struct Cli {
    /// 安装的 npm 包名。
    #[arg(long, env = "SETTLEMINT_ACTION_PACKAGE", default_value = paths::DEFAULT_PACKAGE)]
    package: String,

    /// 工具缓存名称（同时作为依赖缓存键前缀）。
    #[arg(long, env = "SETTLEMINT_ACTION_TOOL_NAME", default_value = paths::DEFAULT_TOOL_NAME)]
    tool_name: String,

    /// CLI 可执行文件名。
    #[arg(long, env = "SETTLEMINT_ACTION_EXECUTABLE", default_value = paths::DEFAULT_EXECUTABLE)]
    executable: String,

    #[arg(long, env = "RUNNER_TOOL_CACHE")]
    tool_cache_dir: Option<PathBuf>,

    /// 依赖缓存根目录。
    #[arg(long, env = "SETTLEMINT_ACTION_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[arg(long, env = "RUNNER_TEMP")]
    scratch_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// 执行一次完整运行（默认）。
    Run,
    /// 预览命令解析结果（JSON 参数数组），不执行。
    Parse {
        command: String,
    },
    /// 检测工具缓存中是否已有指定版本。
    Detect {
        #[arg(long, default_value = "latest")]
        version: String,
    },
    /// 环境自检：平台、架构、缓存键与目录。
    Doctor,
}

impl Cli {
    fn tool_cache_dir(&self) -> PathBuf {
        self.tool_cache_dir
            .clone()
            .unwrap_or_else(paths::tool_cache_root)
    }

    fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| paths::blob_cache_root(&self.tool_cache_dir()))
    }

    fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(paths::runner_temp_dir)
    }

    fn action_config(&self) -> Result<ActionConfig> {
        ActionConfig::new(
            self.package.clone(),
            self.tool_name.clone(),
            self.executable.clone(),
            self.scratch_dir(),
        )
        .context("无法确定 npm 缓存目录")
    }

    fn runner_dirs(&self) -> RunnerDirs {
        RunnerDirs::with_roots(self.tool_cache_dir(), self.cache_dir())
    }
}

/// 程序入口：解析参数并分发子命令。
///
/// 返回值：
/// - 运行失败（已上报 `::error::`）或诊断子命令失败时返回非零退出码
fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        None | Some(Commands::Run) => run_action(&cli),
        Some(Commands::Parse { command }) => parse(command),
        Some(Commands::Detect { version }) => detect(&cli, version),
        Some(Commands::Doctor) => doctor(&cli),
    }
}

/// 执行一次完整运行。
///
/// 异常处理：
/// - 运行期错误由核心流程以 `::error::` 上报，这里只映射退出码
/// - 运行配置无法解析（如缺少主目录）时同样以 `::error::` 上报并返回失败退出码
fn run_action(cli: &Cli) -> Result<ExitCode> {
    let dirs = cli.runner_dirs();
    debug!("tool cache: {}", dirs.tool_cache_root.display());
    debug!("cache: {}", dirs.blob_cache_root.display());

    let mut toolkit = RunnerToolkit::from_env(dirs);
    let config = match cli.action_config() {
        Ok(config) => config,
        Err(e) => {
            toolkit.set_failed(&format!("{e:#}"));
            return Ok(ExitCode::FAILURE);
        }
    };
    match run(&mut toolkit, &config) {
        RunOutcome::Succeeded => {
            info!("运行完成");
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Failed(_) => Ok(ExitCode::FAILURE),
    }
}

fn parse(command: &str) -> Result<ExitCode> {
    match parse_command(command) {
        Ok(argv) => {
            println!("{}", serde_json::to_string(&argv)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// 检测工具缓存（不做任何修改）。
///
/// 输出：
/// - `<tool>@<version> = <true|false>`，命中时追加缓存目录
fn detect(cli: &Cli, version: &str) -> Result<ExitCode> {
    if let Err(e) = validate_version(version) {
        println!("{e}");
        return Ok(ExitCode::FAILURE);
    }
    let cache = FsToolCache::new(cli.tool_cache_dir());
    match cache.find(&cli.tool_name, version) {
        Some(dir) => println!("{}@{} = true ({})", cli.tool_name, version, dir.display()),
        None => println!("{}@{} = false", cli.tool_name, version),
    }
    Ok(ExitCode::SUCCESS)
}

/// 环境自检（用于排障）。
fn doctor(cli: &Cli) -> Result<ExitCode> {
    println!("platform = {}", paths::platform());
    println!("arch = {}", paths::arch());
    println!("cache_key = {}", paths::cache_key(&cli.tool_name, "latest"));
    println!("package = {}", cli.package);
    println!("tool_cache_dir = {}", cli.tool_cache_dir().display());
    println!("cache_dir = {}", cli.cache_dir().display());
    println!("scratch_dir = {}", cli.scratch_dir().display());
    match paths::npm_cache_dir() {
        Ok(dir) => println!("npm_cache_dir = {}", dir.display()),
        Err(e) => println!("npm_cache_dir = <unavailable: {e}>"),
    }
    Ok(ExitCode::SUCCESS)
}
