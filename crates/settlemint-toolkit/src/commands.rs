//! workflow command 格式化与环境文件写入。
//!
//! 协议：
//! - 单行命令：`::name key=value,...::message`；消息中 `%`、`\r`、`\n` 需转义，属性值还需转义 `:` 与 `,`
//! - 环境文件（`GITHUB_ENV`）：`KEY<<DELIMITER\nVALUE\nDELIMITER\n`，分隔符带随机 UUID
//! - 路径文件（`GITHUB_PATH`）：每行一个目录
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use uuid::Uuid;

/// 转义命令消息部分。
pub fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// 转义命令属性值。
pub fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// 格式化一条 workflow command。
pub fn format_command(name: &str, properties: &[(&str, &str)], message: &str) -> String {
    let mut out = format!("::{name}");
    if !properties.is_empty() {
        let props: Vec<String> = properties
            .iter()
            .map(|(k, v)| format!("{k}={}", escape_property(v)))
            .collect();
        out.push(' ');
        out.push_str(&props.join(","));
    }
    out.push_str("::");
    out.push_str(&escape_data(message));
    out
}

/// 生成环境文件中的一条 heredoc 记录。
///
/// 异常处理：
/// - 键或值中包含分隔符时返回错误（避免被截断注入额外变量）
pub fn env_file_entry(key: &str, value: &str) -> Result<String> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    if key.contains(&delimiter) {
        return Err(anyhow!("环境变量名中包含分隔符: {delimiter}"));
    }
    if value.contains(&delimiter) {
        return Err(anyhow!("环境变量值中包含分隔符: {delimiter}"));
    }
    Ok(format!("{key}<<{delimiter}\n{value}\n{delimiter}\n"))
}

/// 以追加方式写入文件命令（`GITHUB_ENV`/`GITHUB_PATH`）。
pub fn append_file_command(path: &Path, content: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("打开文件命令失败: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("写入文件命令失败: {}", path.display()))?;
    Ok(())
}
