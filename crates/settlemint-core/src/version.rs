//! 版本号校验：`latest` 或符合语义化版本（SemVer 2.0.0）语法的版本号。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ActionError;

/// 表示“最新版本”的特殊取值。
pub const LATEST: &str = "latest";

// semver.org 官方给出的完整语法（含 pre-release 与 build metadata）。
static SEMVER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)",
        r"(?:-((?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
        r"(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    ))
    .expect("valid semver pattern")
});

/// 校验版本号。
///
/// 异常处理：
/// - 既不是 `latest` 也不是合法 SemVer 时返回 [`ActionError::InvalidVersion`]，消息中包含原始取值
pub fn validate_version(version: &str) -> Result<(), ActionError> {
    if version == LATEST || SEMVER_PATTERN.is_match(version) {
        return Ok(());
    }
    Err(ActionError::InvalidVersion(version.to_string()))
}
