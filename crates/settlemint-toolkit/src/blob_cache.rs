//! 文件系统依赖缓存：按键保存/恢复一组目录。
//!
//! 布局：
//! - `<root>/<key>/entry.json`：缓存清单（见 [`CacheEntry`]）
//! - `<root>/<key>/<i>`：第 i 个被保存路径的内容
//!
//! 约定：
//! - 同一个键只保存一次；键已存在时跳过保存（与托管缓存服务“键不可覆盖”的行为一致）
//! - 保存先写入临时目录，完成后整体重命名，避免并发运行读到半成品
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use settlemint_core::paths;
use settlemint_core::state::{CacheEntry, SavedPath};
use tracing::{debug, info};

use crate::fsutil::{copy_recursively, remove_path};

const MANIFEST_FILE: &str = "entry.json";

/// 文件系统依赖缓存。
#[derive(Debug, Clone)]
pub struct FsCacheStore {
    root: PathBuf,
}

impl FsCacheStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn read_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let manifest = self.root.join(key).join(MANIFEST_FILE);
        if !manifest.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&manifest).with_context(|| format!("读取缓存清单失败: {}", manifest.display()))?;
        Ok(Some(serde_json::from_slice(&bytes).context("解析缓存清单失败")?))
    }

    /// 恢复缓存。
    ///
    /// 返回值：
    /// - `Ok(true)`：键存在且至少恢复了一个请求的路径
    /// - `Ok(false)`：键不存在，或保存时的路径与本次请求没有交集
    ///
    /// 异常处理：
    /// - 键非法、清单损坏、复制失败返回错误
    pub fn restore(&self, paths_to_restore: &[PathBuf], key: &str) -> Result<bool> {
        paths::validate_cache_key(key)?;
        let Some(entry) = self.read_entry(key)? else {
            debug!("缓存未命中: {key}");
            return Ok(false);
        };

        let entry_dir = self.root.join(key);
        let mut restored = false;
        for saved in &entry.paths {
            if !paths_to_restore.contains(&saved.path) {
                continue;
            }
            let Some(slot) = &saved.slot else {
                continue;
            };
            copy_recursively(&entry_dir.join(slot), &saved.path)?;
            restored = true;
        }
        if restored {
            info!("已从缓存恢复: {key}");
        }
        Ok(restored)
    }

    /// 保存缓存。
    ///
    /// 异常处理：
    /// - 键非法、复制或写清单失败返回错误（临时目录会被清理）
    pub fn save(&self, paths_to_save: &[PathBuf], key: &str) -> Result<()> {
        paths::validate_cache_key(key)?;
        let entry_dir = self.root.join(key);
        if entry_dir.join(MANIFEST_FILE).is_file() {
            info!("缓存键已存在，跳过保存: {key}");
            return Ok(());
        }
        paths::ensure_dir(&self.root)?;
        let staging = paths::unique_scratch_dir(&self.root, &format!(".{key}"))?;

        let result = stage_entry(&staging, paths_to_save, key).and_then(|()| {
            remove_path(&entry_dir);
            std::fs::rename(&staging, &entry_dir)
                .with_context(|| format!("提交缓存失败: {}", entry_dir.display()))
        });
        if result.is_err() {
            remove_path(&staging);
        }
        result
    }
}

fn stage_entry(staging: &Path, paths_to_save: &[PathBuf], key: &str) -> Result<()> {
    let mut entry = CacheEntry::new(key.to_string());
    for (i, path) in paths_to_save.iter().enumerate() {
        let slot = if path.exists() {
            let slot = i.to_string();
            copy_recursively(path, &staging.join(&slot))?;
            Some(slot)
        } else {
            debug!("待缓存路径不存在，跳过: {}", path.display());
            None
        };
        entry.paths.push(SavedPath {
            path: path.clone(),
            slot,
        });
    }
    let bytes = serde_json::to_vec_pretty(&entry).context("序列化缓存清单失败")?;
    std::fs::write(staging.join(MANIFEST_FILE), bytes).context("写入缓存清单失败")?;
    Ok(())
}
