//! 编排流程：校验输入、恢复缓存、获取 CLI、准备环境、执行 login/connect/用户命令、保存缓存。
//!
//! 步骤（任一致命错误立即终止后续步骤）：
//! 1) 读取输入并校验版本号
//! 2) 非 standalone/local 实例必须提供访问令牌；令牌登记为敏感值
//! 3) 按 `<tool>-<version>-<platform>-<arch>` 恢复 npm 缓存（失败仅告警）
//! 4) 获取 CLI 工具（见 [`crate::acquire`]）
//! 5) 处理 dotEnvFile / dotEnvLocalFile（单个失败仅告警）
//! 6) 将输入物化为 `SETTLEMINT_*` 子进程环境变量
//! 7) 个人访问令牌执行 `login -a`；需要时执行 `connect -a`
//! 8) 解析并执行用户命令（错误统一加 `Failed to execute command: ` 前缀）
//! 9) 保存 npm 缓存（失败仅告警）
//!
//! 边界：
//! - 所有错误（包括 panic）在 [`run`] 内收敛为一次 `set_failed`，不会继续向外传播
//! - 不修改当前进程环境变量；子进程环境通过 [`ExecEnv`] 显式传递
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::acquire::{acquire_tool, ToolSpec};
use crate::command::parse_command;
use crate::envfile::process_env_content;
use crate::error::{ActionError, CacheOperation};
use crate::inputs::{Inputs, INPUT_DOT_ENV_FILE, INPUT_DOT_ENV_LOCAL_FILE};
use crate::paths;
use crate::toolkit::{ExecEnv, Toolkit};
use crate::version::validate_version;

/// 无法识别的失败（panic）对应的通用上报信息。
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// 运行配置（与输入无关、由部署环境决定的部分）。
#[derive(Debug, Clone)]
pub struct ActionConfig {
    /// npm 包名。
    pub package: String,
    /// 工具缓存名称与缓存键前缀。
    pub tool_name: String,
    /// 可执行文件名。
    pub executable: String,
    /// 需要跨运行缓存的 npm 缓存目录。
    pub npm_cache_dir: PathBuf,
    /// 隔离安装临时目录的父目录。
    pub scratch_root: PathBuf,
}

impl ActionConfig {
    /// 按给定包名/工具名构造，npm 缓存目录由用户主目录解析。
    ///
    /// 异常处理：
    /// - 无法确定用户主目录（`HOME`/`USERPROFILE` 均缺失）时返回错误
    pub fn new(package: String, tool_name: String, executable: String, scratch_root: PathBuf) -> Result<Self> {
        Ok(Self {
            package,
            tool_name,
            executable,
            npm_cache_dir: paths::npm_cache_dir()?,
            scratch_root,
        })
    }
}

/// 运行结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    /// 已通过 `set_failed` 上报的失败信息。
    Failed(String),
}

/// 执行一次完整运行。
///
/// 返回值：
/// - 成功：`Succeeded`（未调用 `set_failed`）
/// - 失败：`Failed(message)`，且恰好调用一次 `set_failed(message)`
pub fn run<T: Toolkit + ?Sized>(toolkit: &mut T, config: &ActionConfig) -> RunOutcome {
    let result = catch_unwind(AssertUnwindSafe(|| try_run(&mut *toolkit, config)));
    let message = match result {
        Ok(Ok(())) => return RunOutcome::Succeeded,
        Ok(Err(e)) => e.to_string(),
        Err(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
    };
    toolkit.set_failed(&message);
    RunOutcome::Failed(message)
}

fn try_run<T: Toolkit + ?Sized>(toolkit: &mut T, config: &ActionConfig) -> Result<(), ActionError> {
    let inputs = Inputs::read(&*toolkit);

    validate_version(&inputs.version)?;

    if inputs.access_token.is_none() && !inputs.access_token_waived() {
        return Err(ActionError::MissingAccessToken);
    }
    if let Some(token) = &inputs.access_token {
        toolkit.mark_secret(token.value());
    }
    if !inputs.auto_login.is_empty() {
        toolkit.debug("auto-login input is ignored; login follows the access token type");
    }

    let mut env = ExecEnv::default();
    env.set("CI", "true");

    let cache_key = paths::cache_key(&config.tool_name, &inputs.version);
    let cache_paths = vec![config.npm_cache_dir.clone()];
    restore_cache(toolkit, &cache_paths, &cache_key);

    toolkit.debug("Using SettleMint CLI...");
    let spec = ToolSpec {
        name: config.tool_name.clone(),
        package: config.package.clone(),
        version: inputs.version.clone(),
        executable: config.executable.clone(),
    };
    let acquired = acquire_tool(toolkit, &spec, &config.scratch_root, &mut env)?;
    let program = acquired.location.program(&config.executable);
    info!(state = ?acquired.state, "CLI 就绪: {program}");

    process_env_files(toolkit, &inputs, &mut env);

    for (key, value) in inputs.environment() {
        env.set(key, value);
    }

    if inputs.should_login() {
        invoke(toolkit, &program, &["login", "-a"], &env)?;
    }
    if inputs.should_connect() {
        invoke(toolkit, &program, &["connect", "-a"], &env)?;
    }

    if !inputs.command.is_empty() {
        let args = parse_command(&inputs.command).map_err(|e| ActionError::Command(e.to_string()))?;
        debug!("执行用户命令: {:?}", args);
        toolkit
            .exec(&program, &args, &env)
            .map_err(|e| ActionError::Command(format!("{e:#}")))?;
    }

    save_cache(toolkit, &cache_paths, &cache_key);
    Ok(())
}

fn invoke<T: Toolkit + ?Sized>(toolkit: &mut T, program: &str, args: &[&str], env: &ExecEnv) -> Result<(), ActionError> {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    toolkit
        .exec(program, &args, env)
        .map_err(|e| ActionError::Process(format!("{e:#}")))?;
    Ok(())
}

fn restore_cache<T: Toolkit + ?Sized>(toolkit: &mut T, paths: &[PathBuf], key: &str) {
    match toolkit.restore(paths, key) {
        Ok(true) => info!("已恢复依赖缓存: {key}"),
        Ok(false) => debug!("依赖缓存未命中: {key}"),
        Err(e) => warn_cache(toolkit, CacheOperation::Restore, e),
    }
}

fn save_cache<T: Toolkit + ?Sized>(toolkit: &mut T, paths: &[PathBuf], key: &str) {
    for p in paths {
        toolkit.debug(&format!("Caching npm packages from: {}", p.display()));
    }
    if let Err(e) = toolkit.save(paths, key) {
        warn_cache(toolkit, CacheOperation::Save, e);
    }
}

fn warn_cache<T: Toolkit + ?Sized>(toolkit: &mut T, operation: CacheOperation, e: anyhow::Error) {
    let err = ActionError::CacheOperation {
        operation,
        message: format!("{e:#}"),
    };
    toolkit.warning(&err.to_string());
}

fn process_env_files<T: Toolkit + ?Sized>(toolkit: &mut T, inputs: &Inputs, env: &mut ExecEnv) {
    let files = [
        (INPUT_DOT_ENV_FILE, inputs.dot_env_file.as_str()),
        (INPUT_DOT_ENV_LOCAL_FILE, inputs.dot_env_local_file.as_str()),
    ];
    for (source_name, content) in files {
        if content.is_empty() {
            continue;
        }
        match process_env_content(content, toolkit, env) {
            Ok(count) => debug!("{source_name}: 已导出 {count} 个环境变量"),
            Err(e) => {
                let err = ActionError::EnvFile {
                    source_name: source_name.to_string(),
                    message: format!("{e:#}"),
                };
                toolkit.warning(&err.to_string());
            }
        }
    }
}
