//! SettleMint CLI Action 核心库（平台无关）。
//!
//! 功能：
//! - 输入净化、命令行解析（不经过 shell）、dotenv 文本解析、版本号校验
//! - 访问令牌分类（个人令牌 / 应用令牌）与输入键到环境变量名的映射
//! - 定义外部协作方接口（输入读取、日志上报、缓存、进程执行、工具缓存）
//! - CLI 工具获取状态机与整体编排流程（run）
//! - 缓存落盘记录模型与路径/缓存键约定
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod acquire;
pub mod command;
pub mod envfile;
pub mod error;
pub mod inputs;
pub mod paths;
pub mod run;
pub mod sanitize;
pub mod state;
pub mod token;
pub mod toolkit;
pub mod version;
