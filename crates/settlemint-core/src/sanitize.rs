//! 输入净化：移除 shell 元字符。
//!
//! 说明：
//! - 被移除的字符：`; & | ` $ ( ) < > \`
//! - 其余字符保持原有顺序与位置；函数无副作用，对自身输出再次调用结果不变
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

/// 会被 [`sanitize_input`] 移除的 shell 元字符集合。
pub const SHELL_METACHARACTERS: &[char] = &[';', '&', '|', '`', '$', '(', ')', '<', '>', '\\'];

/// 移除输入中的全部 shell 元字符。
///
/// 参数：
/// - `input`：原始输入（可为空）
///
/// 返回值：
/// - 去除元字符后的字符串；空输入返回空字符串
pub fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| !SHELL_METACHARACTERS.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_every_metacharacter() {
        assert_eq!(sanitize_input("a;b&c|d`e$f(g)h<i>j\\k"), "abcdefghijk");
    }

    #[test]
    fn keeps_other_characters_in_place() {
        assert_eq!(sanitize_input("--env \"my value\" ='x'"), "--env \"my value\" ='x'");
        assert_eq!(sanitize_input(""), "");
    }

    #[test]
    /// 对净化结果再次净化应保持不变（不动点）。
    fn sanitize_is_a_fixed_point() {
        let samples = ["rm -rf / && echo $(whoami)", "plain", r"\\;;||", "ünï cødé $HOME"];
        for s in samples {
            let once = sanitize_input(s);
            assert_eq!(sanitize_input(&once), once, "input: {s}");
        }
    }
}
