//! GitHub Actions 风格 runner 上的协作方实现。
//!
//! 行为：
//! - 输入：启动时从 `INPUT_<NAME>` 环境变量快照（名称转大写、空格转 `_`，值去首尾空白）
//! - 日志：以 workflow command 写到标准输出（`::debug::`/`::warning::`/`::error::`/`::add-mask::`）
//! - 环境发布：优先追加到 `GITHUB_ENV`/`GITHUB_PATH` 文件，缺省时退回旧式命令
//! - 已登记的敏感值在本进程写出的每一行中都被替换为 `***`
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::collections::HashMap;
use std::io::{Stdout, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use settlemint_core::toolkit::{
    CacheStore, EnvPublisher, ExecEnv, InputSource, ProcessRunner, Reporter, ToolCache,
};
use tracing::warn;

use crate::blob_cache::FsCacheStore;
use crate::commands::{append_file_command, env_file_entry, format_command};
use crate::process;
use crate::tool_cache::FsToolCache;

const INPUT_PREFIX: &str = "INPUT_";
const MASK: &str = "***";

/// runner 提供的目录与文件命令位置。
#[derive(Debug, Clone, Default)]
pub struct RunnerDirs {
    pub github_env: Option<PathBuf>,
    pub github_path: Option<PathBuf>,
    pub tool_cache_root: PathBuf,
    pub blob_cache_root: PathBuf,
}

impl RunnerDirs {
    /// 缓存根目录由调用方给出，文件命令位置读取 `GITHUB_ENV`/`GITHUB_PATH`。
    pub fn with_roots(tool_cache_root: PathBuf, blob_cache_root: PathBuf) -> Self {
        Self {
            github_env: file_command_path("GITHUB_ENV"),
            github_path: file_command_path("GITHUB_PATH"),
            tool_cache_root,
            blob_cache_root,
        }
    }
}

fn file_command_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// 输入名到环境变量名：`access-token` -> `INPUT_ACCESS-TOKEN`。
pub fn input_env_name(name: &str) -> String {
    format!("{INPUT_PREFIX}{}", name.replace(' ', "_").to_uppercase())
}

/// 当前进程环境中的全部输入（键为 `INPUT_...` 原样名称）。
fn env_inputs() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(INPUT_PREFIX))
        .collect()
}

/// runner 协作方组合。
pub struct RunnerToolkit<W: Write = Stdout> {
    inputs: HashMap<String, String>,
    dirs: RunnerDirs,
    out: W,
    tools: FsToolCache,
    blobs: FsCacheStore,
    secrets: Vec<String>,
    failed: bool,
}

impl RunnerToolkit<Stdout> {
    /// 以当前进程环境中的输入快照构造，输出到标准输出。
    pub fn from_env(dirs: RunnerDirs) -> Self {
        Self::with_writer(env_inputs(), dirs, std::io::stdout())
    }
}

impl<W: Write> RunnerToolkit<W> {
    /// 参数：
    /// - `inputs`：以环境变量名（`INPUT_...`）为键的输入快照
    /// - `dirs`：runner 目录
    /// - `out`：workflow command 输出目标
    pub fn with_writer(inputs: HashMap<String, String>, dirs: RunnerDirs, out: W) -> Self {
        let tools = FsToolCache::new(dirs.tool_cache_root.clone());
        let blobs = FsCacheStore::new(dirs.blob_cache_root.clone());
        Self {
            inputs,
            dirs,
            out,
            tools,
            blobs,
            secrets: Vec::new(),
            failed: false,
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    fn mask(&self, text: &str) -> String {
        let mut masked = text.to_string();
        for secret in &self.secrets {
            masked = masked.replace(secret.as_str(), MASK);
        }
        masked
    }

    fn emit(&mut self, line: &str) {
        let line = self.mask(line);
        if let Err(err) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!("写入 runner 输出失败: {err}");
        }
    }

    fn command(&mut self, name: &str, message: &str) {
        let masked = self.mask(message);
        self.emit(&format_command(name, &[], &masked));
    }
}

impl<W: Write> InputSource for RunnerToolkit<W> {
    fn get_input(&self, name: &str) -> String {
        self.inputs
            .get(&input_env_name(name))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }
}

impl<W: Write> Reporter for RunnerToolkit<W> {
    fn debug(&mut self, message: &str) {
        self.command("debug", message);
    }

    fn info(&mut self, message: &str) {
        self.emit(message);
    }

    fn warning(&mut self, message: &str) {
        self.command("warning", message);
    }

    fn error(&mut self, message: &str) {
        self.command("error", message);
    }

    fn mark_secret(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        // 先输出再登记，否则 add-mask 本身会被遮盖
        let line = format_command("add-mask", &[], value);
        if let Err(err) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!("写入 runner 输出失败: {err}");
        }
        self.secrets.push(value.to_string());
    }

    fn set_failed(&mut self, message: &str) {
        self.failed = true;
        self.command("error", message);
    }
}

impl<W: Write> EnvPublisher for RunnerToolkit<W> {
    fn export_variable(&mut self, key: &str, value: &str) -> Result<()> {
        match self.dirs.github_env.clone() {
            Some(file) => append_file_command(&file, &env_file_entry(key, value)?),
            None => {
                self.emit(&format_command("set-env", &[("name", key)], value));
                Ok(())
            }
        }
    }

    fn add_path(&mut self, dir: &Path) -> Result<()> {
        let dir = dir.display().to_string();
        match self.dirs.github_path.clone() {
            Some(file) => append_file_command(&file, &format!("{dir}\n")),
            None => {
                self.emit(&format_command("add-path", &[], &dir));
                Ok(())
            }
        }
    }
}

impl<W: Write> CacheStore for RunnerToolkit<W> {
    fn restore(&mut self, paths: &[PathBuf], key: &str) -> Result<bool> {
        self.blobs.restore(paths, key)
    }

    fn save(&mut self, paths: &[PathBuf], key: &str) -> Result<()> {
        self.blobs.save(paths, key)
    }
}

impl<W: Write> ProcessRunner for RunnerToolkit<W> {
    fn exec(&mut self, program: &str, args: &[String], env: &ExecEnv) -> Result<i32> {
        let mut line = format!("[command]{program}");
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.emit(&line);
        process::exec(program, args, env)
    }
}

impl<W: Write> ToolCache for RunnerToolkit<W> {
    fn find(&self, name: &str, version: &str) -> Option<PathBuf> {
        self.tools.find(name, version)
    }

    fn cache_dir(&mut self, source: &Path, name: &str, version: &str) -> Result<PathBuf> {
        self.tools.cache_dir(source, name, version)
    }
}
