//! 命令行解析：将单行命令字符串拆分为参数向量（不经过任何 shell）。
//!
//! 处理分两步：
//! 1) 黑名单检查：出现 `&&`、`||`、`;`、`|`、`` ` ``、`$(`、`>`、`<` 任一子串即整体拒绝，不做拆分
//! 2) 单遍扫描拆分：支持单/双引号包裹含空格的参数；前面紧跟反斜杠的引号视为普通字符
//!
//! 每个拆分出的参数都会再经过 [`sanitize_input`] 净化后才进入结果。
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use thiserror::Error;

use crate::sanitize::sanitize_input;

/// 会导致整条命令被拒绝的子串。
pub const DANGEROUS_PATTERNS: &[&str] = &["&&", "||", ";", "|", "`", "$(", ">", "<"];

/// 命令解析错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Command contains potentially dangerous characters. Please use simple commands only.")]
    DangerousInput,
    #[error("Command contains an unclosed quote")]
    UnclosedQuote,
}

/// 判断原始命令是否包含黑名单中的任一构造。
pub fn contains_dangerous_construct(raw: &str) -> bool {
    DANGEROUS_PATTERNS.iter().any(|p| raw.contains(p))
}

/// 解析命令字符串为参数向量。
///
/// 参数：
/// - `raw`：用户提供的单行命令（不可信）
///
/// 返回值：
/// - 成功：按顺序排列的已净化参数
///
/// 异常处理：
/// - 包含危险构造：`DangerousInput`（在拆分之前检查，整条拒绝）
/// - 结束时引号仍未闭合：`UnclosedQuote`
pub fn parse_command(raw: &str) -> Result<Vec<String>, CommandError> {
    if contains_dangerous_construct(raw) {
        return Err(CommandError::DangerousInput);
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    for c in raw.chars() {
        let escaped = prev == Some('\\');
        match c {
            '"' | '\'' if !escaped => match quote {
                None => quote = Some(c),
                Some(open) if open == c => quote = None,
                // 引号内遇到另一种引号：按普通字符处理。
                Some(_) => current.push(c),
            },
            ' ' if quote.is_none() => flush(&mut args, &mut current),
            _ => current.push(c),
        }
        prev = Some(c);
    }

    if quote.is_some() {
        return Err(CommandError::UnclosedQuote);
    }
    flush(&mut args, &mut current);
    Ok(args)
}

fn flush(args: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        args.push(sanitize_input(current));
        current.clear();
    }
}
