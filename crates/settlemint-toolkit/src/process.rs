//! 外部进程执行（不经过 shell）。
//!
//! 行为：
//! - 子进程继承当前进程环境，并叠加 [`ExecEnv`] 中的变量与 `PATH` 前缀
//! - 标准输入/输出/错误直接继承，CLI 输出原样出现在运行日志中
//! - 退出码非零或无法启动都视为失败

use std::process::Command;

use anyhow::{anyhow, Context, Result};
use settlemint_core::toolkit::ExecEnv;
use tracing::debug;

/// 构造待执行的命令（不启动）。
pub fn build_command(program: &str, args: &[String], env: &ExecEnv) -> Result<Command> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.envs(&env.vars);
    let inherited = std::env::var_os("PATH");
    if let Some(path) = env
        .joined_path(inherited.as_deref())
        .context("拼接 PATH 失败")?
    {
        cmd.env("PATH", path);
    }
    Ok(cmd)
}

/// 执行进程并等待结束。
///
/// 返回值：
/// - 成功：退出码（恒为 0）
///
/// 异常处理：
/// - 进程启动失败返回错误
/// - 退出码非零返回 `The process '<program>' failed with exit code <code>`
pub fn exec(program: &str, args: &[String], env: &ExecEnv) -> Result<i32> {
    let mut cmd = build_command(program, args, env)?;
    debug!("启动进程: {program} {:?}", args);
    let status = cmd
        .status()
        .with_context(|| format!("启动进程失败: {program}"))?;
    let code = status.code().unwrap_or(-1);
    if code != 0 {
        return Err(anyhow!("The process '{program}' failed with exit code {code}"));
    }
    Ok(code)
}
