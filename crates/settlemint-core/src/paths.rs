//! 统一路径、平台标识与缓存键约定。
//!
//! 目标：
//! - 将 runner 目录（临时目录、工具缓存目录）与 npm 缓存目录的解析集中管理
//! - 平台/架构标识与 Node.js 的 `os.platform()`/`os.arch()` 保持一致，保证缓存键跨实现稳定
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use uuid::Uuid;

/// 默认 npm 包名。
pub const DEFAULT_PACKAGE: &str = "@settlemint/sdk-cli";
/// 默认工具名（工具缓存目录名、缓存键前缀）。
pub const DEFAULT_TOOL_NAME: &str = "settlemint-cli";
/// 默认可执行文件名。
pub const DEFAULT_EXECUTABLE: &str = "settlemint";
/// npm 本地安装后可执行文件所在的子路径。
pub const PACKAGE_BIN_SUBPATH: &str = "node_modules/.bin";
/// 本工具在缓存根目录下使用的子目录名。
pub const VENDOR_DIR: &str = "settlemint-action";

/// 当前平台标识（`linux` / `darwin` / `win32` 等）。
pub fn platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// 当前 CPU 架构标识（`x64` / `arm64` / `ia32` 等）。
pub fn arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        other => other,
    }
}

/// 依赖缓存键：`<tool>-<version>-<platform>-<arch>`。
pub fn cache_key(tool_name: &str, version: &str) -> String {
    format!("{tool_name}-{version}-{}-{}", platform(), arch())
}

/// 校验缓存键可安全用作目录名。
///
/// 异常处理：
/// - 空键、包含路径分隔符、`..` 或 `,` 时返回错误
pub fn validate_cache_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(anyhow!("缓存键为空"));
    }
    if key.contains(['/', '\\', ',']) || key.contains("..") {
        return Err(anyhow!("缓存键包含非法字符: {key}"));
    }
    Ok(())
}

/// 当前用户主目录（`HOME`，Windows 下回退到 `USERPROFILE`）。
///
/// 异常处理：
/// - 两个环境变量都不存在时返回错误
pub fn home_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .context("读取 HOME/USERPROFILE 环境变量失败")?;
    Ok(PathBuf::from(home))
}

/// npm 缓存目录：`~/.npm`。
pub fn npm_cache_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(".npm"))
}

/// runner 临时目录（`RUNNER_TEMP`，缺省为系统临时目录）。
pub fn runner_temp_dir() -> PathBuf {
    env_dir("RUNNER_TEMP").unwrap_or_else(std::env::temp_dir)
}

/// 工具缓存根目录（`RUNNER_TOOL_CACHE`，缺省为 `<temp>/tool-cache`）。
pub fn tool_cache_root() -> PathBuf {
    env_dir("RUNNER_TOOL_CACHE").unwrap_or_else(|| std::env::temp_dir().join("tool-cache"))
}

/// 依赖缓存（按键保存目录）根目录：`<工具缓存根目录>/settlemint-action/cache`。
pub fn blob_cache_root(tool_cache_root: &Path) -> PathBuf {
    tool_cache_root.join(VENDOR_DIR).join("cache")
}

/// 确保目录存在（不存在则递归创建）。
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).with_context(|| format!("创建目录失败: {}", path.display()))?;
    Ok(())
}

/// 在 `root` 下创建一个全新的临时目录：`<root>/<prefix>-<uuid>`。
pub fn unique_scratch_dir(root: &Path, prefix: &str) -> Result<PathBuf> {
    let dir = root.join(format!("{prefix}-{}", Uuid::new_v4()));
    ensure_dir(&dir)?;
    Ok(dir)
}

fn env_dir(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
