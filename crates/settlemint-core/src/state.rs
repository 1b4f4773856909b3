//! 缓存落盘记录模型。
//!
//! 目的：
//! - [`ToolCacheEntry`]：工具缓存目录旁的完成标记，存在才视为“已缓存”，避免半拷贝目录被误用
//! - [`CacheEntry`]：按键保存的依赖缓存清单，记录保存了哪些路径，恢复时据此还原
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// 工具缓存完成标记（`<root>/<name>/<version>/<arch>.complete`）。
///
/// 字段说明：
/// - `entry_id`：本次登记 ID
/// - `name` / `version` / `arch`：工具标识
/// - `cached_at`：登记时间（UTC）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCacheEntry {
    pub entry_id: Uuid,
    pub name: String,
    pub version: String,
    pub arch: String,
    #[serde(with = "time::serde::rfc3339")]
    pub cached_at: OffsetDateTime,
}

impl ToolCacheEntry {
    pub fn new(name: String, version: String, arch: String) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            name,
            version,
            arch,
            cached_at: OffsetDateTime::now_utc(),
        }
    }
}

/// 依赖缓存清单（`<cache_root>/<key>/entry.json`）。
///
/// 说明：
/// - `paths[i]` 的内容保存在 `<cache_root>/<key>/<i>` 下
/// - 保存时不存在的路径记录为 `None`，恢复时跳过
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub entry_id: Uuid,
    pub key: String,
    #[serde(default)]
    pub paths: Vec<SavedPath>,
    #[serde(with = "time::serde::rfc3339")]
    pub saved_at: OffsetDateTime,
}

impl CacheEntry {
    pub fn new(key: String) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            key,
            paths: Vec::new(),
            saved_at: OffsetDateTime::now_utc(),
        }
    }
}

/// 单个被保存的路径。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPath {
    /// 原始路径（恢复目标）。
    pub path: PathBuf,
    #[serde(default)]
    /// 在缓存目录中的子目录名；原始路径不存在时为 `None`。
    pub slot: Option<String>,
}
