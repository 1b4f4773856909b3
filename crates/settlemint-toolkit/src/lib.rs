//! 运行平台能力封装（GitHub Actions 风格 runner）。
//!
//! 目标：
//! - 将 workflow command、环境文件（`GITHUB_ENV`/`GITHUB_PATH`）、进程执行、
//!   工具缓存与依赖缓存等平台细节集中封装，核心流程只依赖 `settlemint_core::toolkit` 中的接口
//! - 统一错误处理风格（以 `anyhow::Result` 形式向上返回）
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod blob_cache;
pub mod commands;
pub mod fsutil;
pub mod process;
pub mod runner;
pub mod tool_cache;

pub use runner::{RunnerDirs, RunnerToolkit};
