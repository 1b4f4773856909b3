//! 运行期错误分类。
//!
//! 致命错误（终止本次运行，并转换为唯一一次失败上报）：
//! - `InvalidVersion`：版本号格式错误（任何副作用之前）
//! - `MissingAccessToken`：非 standalone/local 实例缺少访问令牌
//! - `Command`：用户命令解析失败或执行失败（统一加上 `Failed to execute command: ` 前缀）
//! - `Installation`：主安装失败后，全局安装降级也失败
//! - `Process`：login/connect 子命令执行失败
//!
//! 可恢复错误（只记录告警，流程继续）：
//! - `CacheOperation`：缓存恢复/保存失败
//! - `EnvFile`：单个 dotenv 文本处理失败
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use thiserror::Error;

/// 运行期错误。
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Invalid version format: {0}. Must be a valid semver version or 'latest'")]
    InvalidVersion(String),
    #[error("access-token is required when not in standalone or local mode")]
    MissingAccessToken,
    #[error("Failed to execute command: {0}")]
    Command(String),
    #[error("Installation of {package} failed: {message}")]
    Installation { package: String, message: String },
    #[error("{0}")]
    Process(String),
    #[error("Cache {operation} failed{}: {message}", .operation.warning_suffix())]
    CacheOperation { operation: CacheOperation, message: String },
    #[error("Failed to process {source_name}: {message}")]
    EnvFile { source_name: String, message: String },
}

/// 缓存操作类型（用于告警信息）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOperation {
    Restore,
    Save,
}

impl CacheOperation {
    fn warning_suffix(&self) -> &'static str {
        match self {
            CacheOperation::Restore => ", proceeding with download",
            CacheOperation::Save => "",
        }
    }
}

impl std::fmt::Display for CacheOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheOperation::Restore => f.write_str("restore"),
            CacheOperation::Save => f.write_str("save"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_warnings_describe_the_operation() {
        let restore = ActionError::CacheOperation {
            operation: CacheOperation::Restore,
            message: "offline".into(),
        };
        assert_eq!(restore.to_string(), "Cache restore failed, proceeding with download: offline");
        let save = ActionError::CacheOperation {
            operation: CacheOperation::Save,
            message: "disk full".into(),
        };
        assert_eq!(save.to_string(), "Cache save failed: disk full");
    }

    #[test]
    fn command_errors_carry_fixed_prefix() {
        let e = ActionError::Command("boom".into());
        assert_eq!(e.to_string(), "Failed to execute command: boom");
    }
}
