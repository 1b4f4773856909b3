//! dotenv 风格文本解析与发布。
//!
//! 行格式：
//! - 空行与 `#` 开头的行跳过
//! - 第一个 `#` 及其后内容视为行尾注释（不识别引号，`X="a#b"` 会被截断为 `"a`）
//! - `KEY=VALUE`，KEY 需匹配 `[A-Za-z_][A-Za-z0-9_]*`；VALUE 中可再包含 `=`
//! - VALUE 两端若为同一种引号则去掉一层
//! - KEY/VALUE 均经过净化后才发布
//!
//! 不符合格式的行静默跳过（宽松格式，不做校验报错）。
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::sanitize::sanitize_input;
use crate::toolkit::{EnvPublisher, ExecEnv};

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*=").expect("valid env var pattern"));

/// 一条解析出的环境变量赋值（已净化）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvAssignment {
    pub key: String,
    pub value: String,
}

/// 解析 dotenv 文本，按出现顺序返回赋值列表。
pub fn parse_env_content(content: &str) -> Vec<EnvAssignment> {
    let mut out = Vec::new();
    for line in content.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let without_comment = trimmed.split('#').next().unwrap_or_default().trim();
        if !ENV_VAR_PATTERN.is_match(without_comment) {
            continue;
        }
        let Some((key, value)) = without_comment.split_once('=') else {
            continue;
        };
        let value = strip_matching_quotes(value);

        out.push(EnvAssignment {
            key: sanitize_input(key.trim()),
            value: sanitize_input(value.trim()),
        });
    }
    out
}

/// 解析并逐条发布：导出给后续步骤，同时写入本次运行的子进程环境。
///
/// 返回值：
/// - 成功：发布的条目数
///
/// 异常处理：
/// - 导出失败（例如写环境文件失败）立即返回错误；已发布的条目不回滚
pub fn process_env_content<P: EnvPublisher + ?Sized>(content: &str, publisher: &mut P, env: &mut ExecEnv) -> Result<usize> {
    let assignments = parse_env_content(content);
    for a in &assignments {
        debug!("导出环境变量: {}", a.key);
        publisher.export_variable(&a.key, &a.value)?;
        env.set(a.key.clone(), a.value.clone());
    }
    Ok(assignments.len())
}

fn strip_matching_quotes(value: &str) -> &str {
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
