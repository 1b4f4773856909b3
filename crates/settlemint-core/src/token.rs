//! 访问令牌分类。
//!
//! 规则：
//! - 以 `sm_pat_` 开头：个人访问令牌（会自动执行 `login -a`）
//! - 其余任意非空取值：应用访问令牌
//!
//! 两种令牌写入不同的环境变量名，分类在读取时一次完成。
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use crate::sanitize::sanitize_input;

/// 个人访问令牌前缀。
pub const PERSONAL_ACCESS_TOKEN_PREFIX: &str = "sm_pat_";

/// 判断令牌文本是否为个人访问令牌。
pub fn is_personal_access_token(token: &str) -> bool {
    token.starts_with(PERSONAL_ACCESS_TOKEN_PREFIX)
}

/// 已分类的访问令牌（携带净化后的值）。
#[derive(Clone, PartialEq, Eq)]
pub enum AccessToken {
    /// 个人访问令牌（`sm_pat_` 前缀）。
    Personal(String),
    /// 应用访问令牌。
    Application(String),
}

impl AccessToken {
    /// 对原始输入净化并分类。
    ///
    /// 返回值：
    /// - 输入为空（或净化后为空）：`None`
    pub fn classify(raw: &str) -> Option<Self> {
        let value = sanitize_input(raw);
        if value.is_empty() {
            return None;
        }
        Some(if is_personal_access_token(&value) {
            AccessToken::Personal(value)
        } else {
            AccessToken::Application(value)
        })
    }

    /// 令牌值（已净化）。
    pub fn value(&self) -> &str {
        match self {
            AccessToken::Personal(v) | AccessToken::Application(v) => v,
        }
    }

    pub fn is_personal(&self) -> bool {
        matches!(self, AccessToken::Personal(_))
    }

    /// 接收该令牌的环境变量名。
    pub fn env_var_name(&self) -> &'static str {
        match self {
            AccessToken::Personal(_) => "SETTLEMINT_PERSONAL_ACCESS_TOKEN",
            AccessToken::Application(_) => "SETTLEMINT_ACCESS_TOKEN",
        }
    }
}

// 令牌不应出现在日志中。
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessToken::Personal(_) => f.write_str("Personal(***)"),
            AccessToken::Application(_) => f.write_str("Application(***)"),
        }
    }
}
