//! 输入模型：读取平台输入、解析开关、映射为 `SETTLEMINT_*` 环境变量。
//!
//! 约定：
//! - 输入值为空字符串视为未提供
//! - 环境变量名：`SETTLEMINT_` + 输入键大写，`-` 替换为 `_`
//! - 访问令牌按分类写入 `SETTLEMINT_PERSONAL_ACCESS_TOKEN` 或 `SETTLEMINT_ACCESS_TOKEN`
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use crate::sanitize::sanitize_input;
use crate::token::AccessToken;
use crate::toolkit::InputSource;
use crate::version::LATEST;

pub const INPUT_COMMAND: &str = "command";
pub const INPUT_VERSION: &str = "version";
pub const INPUT_ACCESS_TOKEN: &str = "access-token";
pub const INPUT_PERSONAL_ACCESS_TOKEN: &str = "personal-access-token";
pub const INPUT_AUTO_CONNECT: &str = "auto-connect";
pub const INPUT_AUTO_LOGIN: &str = "auto-login";
pub const INPUT_INSTANCE: &str = "instance";
pub const INPUT_DOT_ENV_FILE: &str = "dotEnvFile";
pub const INPUT_DOT_ENV_LOCAL_FILE: &str = "dotEnvLocalFile";

/// 不要求访问令牌、且不执行 login/connect 的实例取值。
pub const INSTANCE_STANDALONE: &str = "standalone";
/// 不要求访问令牌的本地实例取值。
pub const INSTANCE_LOCAL: &str = "local";

/// 会被物化为 `SETTLEMINT_*` 环境变量的输入键（访问令牌单独处理）。
pub const ENV_VARS: &[&str] = &[
    "instance",
    "workspace",
    "application",
    "blockchain-network",
    "blockchain-node",
    "load-balancer",
    "hasura",
    "thegraph",
    "portal",
    "hd-private-key",
    "minio",
    "ipfs",
    "custom-deployment",
    "blockscout",
];

/// 输入键对应的环境变量名。
///
/// 示例：`blockchain-network` -> `SETTLEMINT_BLOCKCHAIN_NETWORK`
pub fn env_var_name(key: &str) -> String {
    format!("SETTLEMINT_{}", key.replace('-', "_").to_uppercase())
}

/// 一次运行读取到的全部输入。
#[derive(Debug, Clone)]
pub struct Inputs {
    pub command: String,
    /// 版本号；未提供时为 `latest`。
    pub version: String,
    pub access_token: Option<AccessToken>,
    /// `None` 表示未提供，由令牌类型决定是否自动 connect。
    pub auto_connect: Option<bool>,
    /// 仅读取并记录，不参与任何判断。
    pub auto_login: String,
    pub instance: String,
    pub dot_env_file: String,
    pub dot_env_local_file: String,
    /// 已提供值的拓扑类输入（键, 原始值），顺序同 [`ENV_VARS`]。
    pub variables: Vec<(String, String)>,
}

impl Inputs {
    /// 从平台输入源读取。
    pub fn read<S: InputSource + ?Sized>(source: &S) -> Self {
        let version = source.get_input(INPUT_VERSION);
        let mut token = source.get_input(INPUT_ACCESS_TOKEN);
        if token.is_empty() {
            token = source.get_input(INPUT_PERSONAL_ACCESS_TOKEN);
        }
        let auto_connect = match source.get_input(INPUT_AUTO_CONNECT).as_str() {
            "" => None,
            v => Some(v == "true"),
        };
        let variables = ENV_VARS
            .iter()
            .filter_map(|key| {
                let value = source.get_input(key);
                (!value.is_empty()).then(|| (key.to_string(), value))
            })
            .collect();

        Self {
            command: source.get_input(INPUT_COMMAND),
            version: if version.is_empty() { LATEST.to_string() } else { version },
            access_token: AccessToken::classify(&token),
            auto_connect,
            auto_login: source.get_input(INPUT_AUTO_LOGIN),
            instance: source.get_input(INPUT_INSTANCE),
            dot_env_file: source.get_input(INPUT_DOT_ENV_FILE),
            dot_env_local_file: source.get_input(INPUT_DOT_ENV_LOCAL_FILE),
            variables,
        }
    }

    pub fn is_standalone(&self) -> bool {
        self.instance == INSTANCE_STANDALONE
    }

    /// standalone/local 实例可以不提供访问令牌。
    pub fn access_token_waived(&self) -> bool {
        self.is_standalone() || self.instance == INSTANCE_LOCAL
    }

    /// 个人访问令牌且非 standalone 时自动 login。
    pub fn should_login(&self) -> bool {
        !self.is_standalone() && self.access_token.as_ref().is_some_and(AccessToken::is_personal)
    }

    /// 显式开关优先；未提供时由个人访问令牌隐含开启。
    pub fn should_connect(&self) -> bool {
        if self.is_standalone() {
            return false;
        }
        self.auto_connect
            .unwrap_or_else(|| self.access_token.as_ref().is_some_and(AccessToken::is_personal))
    }

    /// 需要物化为进程环境变量的（名称, 净化后取值）列表，令牌在最前。
    pub fn environment(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.variables.len() + 1);
        if let Some(token) = &self.access_token {
            out.push((token.env_var_name().to_string(), token.value().to_string()));
        }
        for (key, value) in &self.variables {
            let value = sanitize_input(value);
            if !value.is_empty() {
                out.push((env_var_name(key), value));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct MapInputs(HashMap<&'static str, &'static str>);

    impl InputSource for MapInputs {
        fn get_input(&self, name: &str) -> String {
            self.0.get(name).map(|v| v.to_string()).unwrap_or_default()
        }
    }

    fn inputs(pairs: &[(&'static str, &'static str)]) -> Inputs {
        Inputs::read(&MapInputs(pairs.iter().copied().collect()))
    }

    #[test]
    fn env_var_names_are_upper_snake() {
        assert_eq!(env_var_name("blockchain-network"), "SETTLEMINT_BLOCKCHAIN_NETWORK");
        assert_eq!(env_var_name("hd-private-key"), "SETTLEMINT_HD_PRIVATE_KEY");
        assert_eq!(env_var_name("workspace"), "SETTLEMINT_WORKSPACE");
    }

    #[test]
    fn version_defaults_to_latest() {
        assert_eq!(inputs(&[]).version, "latest");
        assert_eq!(inputs(&[("version", "1.2.3")]).version, "1.2.3");
    }

    #[test]
    fn personal_access_token_input_is_a_fallback() {
        let i = inputs(&[("personal-access-token", "sm_pat_1")]);
        assert!(i.access_token.as_ref().unwrap().is_personal());

        let i = inputs(&[("access-token", "sm_app_1"), ("personal-access-token", "sm_pat_1")]);
        assert!(!i.access_token.as_ref().unwrap().is_personal());
    }

    #[test]
    fn connect_follows_flag_then_token_kind() {
        assert!(inputs(&[("access-token", "sm_app_1"), ("auto-connect", "true")]).should_connect());
        assert!(!inputs(&[("access-token", "sm_pat_1"), ("auto-connect", "false")]).should_connect());
        assert!(inputs(&[("access-token", "sm_pat_1")]).should_connect());
        assert!(!inputs(&[("access-token", "sm_app_1")]).should_connect());
    }

    #[test]
    fn standalone_never_logs_in_or_connects() {
        let i = inputs(&[
            ("access-token", "sm_pat_1"),
            ("auto-connect", "true"),
            ("instance", "standalone"),
        ]);
        assert!(!i.should_login());
        assert!(!i.should_connect());
        assert!(i.access_token_waived());
    }

    #[test]
    /// `auto-login` 仅被读取，不影响 login 判断。
    fn auto_login_flag_does_not_gate_login() {
        let i = inputs(&[("access-token", "sm_app_1"), ("auto-login", "true")]);
        assert_eq!(i.auto_login, "true");
        assert!(!i.should_login());
        let i = inputs(&[("access-token", "sm_pat_1"), ("auto-login", "false")]);
        assert!(i.should_login());
    }

    #[test]
    fn environment_routes_token_and_sanitizes_values() {
        let i = inputs(&[
            ("access-token", "sm_app_1"),
            ("instance", "https://console.example"),
            ("workspace", "my-ws;rm"),
        ]);
        assert_eq!(
            i.environment(),
            vec![
                ("SETTLEMINT_ACCESS_TOKEN".to_string(), "sm_app_1".to_string()),
                ("SETTLEMINT_INSTANCE".to_string(), "https://console.example".to_string()),
                ("SETTLEMINT_WORKSPACE".to_string(), "my-wsrm".to_string()),
            ]
        );
    }
}
