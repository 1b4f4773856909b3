//! 外部协作方接口定义。
//!
//! 核心流程只通过这些窄接口与运行平台交互：
//! - [`InputSource`]：按名称读取输入（空字符串表示未提供）
//! - [`Reporter`]：分级日志、敏感值遮盖、唯一一次失败上报
//! - [`EnvPublisher`]：向后续步骤发布环境变量、追加可执行搜索路径
//! - [`CacheStore`]：按键保存/恢复目录
//! - [`ProcessRunner`]：执行外部进程（非零退出码视为错误）
//! - [`ToolCache`]：按（名称, 版本）查找/登记工具安装目录
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

pub trait InputSource {
    fn get_input(&self, name: &str) -> String;
}

pub trait Reporter {
    fn debug(&mut self, message: &str);
    fn info(&mut self, message: &str);
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
    /// 登记敏感值，之后的平台日志输出中会被遮盖。
    fn mark_secret(&mut self, value: &str);
    /// 终止性失败上报；一次运行最多调用一次。
    fn set_failed(&mut self, message: &str);
}

pub trait EnvPublisher {
    fn export_variable(&mut self, key: &str, value: &str) -> Result<()>;
    fn add_path(&mut self, dir: &Path) -> Result<()>;
}

pub trait CacheStore {
    /// 返回值：`Ok(true)` 命中并已恢复；`Ok(false)` 未命中。
    fn restore(&mut self, paths: &[PathBuf], key: &str) -> Result<bool>;
    fn save(&mut self, paths: &[PathBuf], key: &str) -> Result<()>;
}

pub trait ProcessRunner {
    /// 执行进程并等待结束。
    ///
    /// 异常处理：
    /// - 进程无法启动或退出码非零时返回错误
    fn exec(&mut self, program: &str, args: &[String], env: &ExecEnv) -> Result<i32>;
}

pub trait ToolCache {
    fn find(&self, name: &str, version: &str) -> Option<PathBuf>;
    /// 将 `source` 目录登记到工具缓存，返回缓存内的规范路径。
    fn cache_dir(&mut self, source: &Path, name: &str, version: &str) -> Result<PathBuf>;
}

/// 全部协作方的组合。
pub trait Toolkit: InputSource + Reporter + EnvPublisher + CacheStore + ProcessRunner + ToolCache {}

impl<T> Toolkit for T where T: InputSource + Reporter + EnvPublisher + CacheStore + ProcessRunner + ToolCache {}

/// 传给子进程的显式环境配置。
///
/// 说明：
/// - 不修改当前进程的环境变量；子进程在继承父进程环境的基础上叠加这里的取值
/// - `path_prefix` 中的目录按登记顺序的逆序放在 `PATH` 最前面（后登记的优先）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecEnv {
    pub vars: BTreeMap<String, String>,
    pub path_prefix: Vec<PathBuf>,
}

impl ExecEnv {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn prepend_path(&mut self, dir: impl Into<PathBuf>) {
        self.path_prefix.push(dir.into());
    }

    /// 在给定的原始 `PATH` 前拼接登记目录；无登记目录时返回 `None`（保持继承）。
    pub fn joined_path(&self, inherited: Option<&std::ffi::OsStr>) -> Result<Option<std::ffi::OsString>> {
        if self.path_prefix.is_empty() {
            return Ok(None);
        }
        let mut dirs: Vec<PathBuf> = self.path_prefix.iter().rev().cloned().collect();
        if let Some(inherited) = inherited {
            dirs.extend(std::env::split_paths(inherited));
        }
        Ok(Some(std::env::join_paths(dirs)?))
    }
}
