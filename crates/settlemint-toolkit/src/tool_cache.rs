//! 文件系统工具缓存：`<root>/<name>/<version>/<arch>`。
//!
//! 约定：
//! - 目录旁的 `<arch>.complete` 标记（JSON，见 [`ToolCacheEntry`]）存在才视为命中
//! - 登记时先删除旧目录与旧标记，复制完成后最后写标记，中途失败不会留下“命中”状态
//! - 版本号按字面作为目录名：`latest` 也是一个固定条目，首次登记后一直命中，
//!   不会随上游新发布而更新；需要新版本时应使用精确版本号或清理该条目
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use settlemint_core::paths;
use settlemint_core::state::ToolCacheEntry;
use tracing::{debug, info};

use crate::fsutil::{copy_recursively, remove_path};

/// 文件系统工具缓存。
#[derive(Debug, Clone)]
pub struct FsToolCache {
    root: PathBuf,
    arch: String,
}

impl FsToolCache {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            arch: paths::arch().to_string(),
        }
    }

    fn version_dir(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(name).join(version)
    }

    fn tool_dir(&self, name: &str, version: &str) -> PathBuf {
        self.version_dir(name, version).join(&self.arch)
    }

    fn marker(&self, name: &str, version: &str) -> PathBuf {
        self.version_dir(name, version)
            .join(format!("{}.complete", self.arch))
    }

    /// 按（名称, 版本）查找已登记的目录（版本按字面匹配，`latest` 不解析为具体版本）。
    pub fn find(&self, name: &str, version: &str) -> Option<PathBuf> {
        if name.is_empty() || version.is_empty() {
            return None;
        }
        let dir = self.tool_dir(name, version);
        let marker = self.marker(name, version);
        if dir.is_dir() && marker.is_file() {
            debug!("工具缓存命中: {}", dir.display());
            Some(dir)
        } else {
            None
        }
    }

    /// 读取已登记目录的完成标记。
    pub fn entry(&self, name: &str, version: &str) -> Result<Option<ToolCacheEntry>> {
        let marker = self.marker(name, version);
        if !marker.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&marker).with_context(|| format!("读取标记失败: {}", marker.display()))?;
        Ok(Some(serde_json::from_slice(&bytes).context("解析工具缓存标记失败")?))
    }

    /// 将 `source` 目录复制到缓存并写入完成标记。
    ///
    /// 异常处理：
    /// - 名称/版本为空或源目录不存在返回错误
    /// - 复制或写标记失败返回错误（不会留下完成标记）
    pub fn cache_dir(&self, source: &Path, name: &str, version: &str) -> Result<PathBuf> {
        if name.is_empty() || version.is_empty() {
            return Err(anyhow!("工具名称与版本不能为空"));
        }
        if !source.is_dir() {
            return Err(anyhow!("源目录不存在: {}", source.display()));
        }

        let dest = self.tool_dir(name, version);
        let marker = self.marker(name, version);
        remove_path(&marker);
        remove_path(&dest);
        paths::ensure_dir(&dest)?;

        info!("登记工具缓存: {} -> {}", source.display(), dest.display());
        copy_recursively(source, &dest)?;

        let entry = ToolCacheEntry::new(name.to_string(), version.to_string(), self.arch.clone());
        let bytes = serde_json::to_vec_pretty(&entry).context("序列化工具缓存标记失败")?;
        std::fs::write(&marker, bytes).with_context(|| format!("写入标记失败: {}", marker.display()))?;
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsutil::testutil::*;

    #[test]
    fn miss_then_hit_after_caching() {
        let root = unique_temp_dir("settlemint-tool-cache");
        let _cleanup = CleanupDir(root.clone());
        let cache = FsToolCache::new(root.join("tc"));
        write_file(&root.join("scratch/node_modules/.bin/settlemint"), "#!/bin/sh");

        assert!(cache.find("settlemint-cli", "1.2.3").is_none());

        let dest = cache.cache_dir(&root.join("scratch"), "settlemint-cli", "1.2.3").unwrap();

        assert_eq!(cache.find("settlemint-cli", "1.2.3"), Some(dest.clone()));
        assert!(dest.join("node_modules/.bin/settlemint").is_file());
        let entry = cache.entry("settlemint-cli", "1.2.3").unwrap().unwrap();
        assert_eq!(entry.version, "1.2.3");
        assert_eq!(entry.arch, paths::arch());
        assert!(cache.find("settlemint-cli", "2.0.0").is_none());
    }

    #[test]
    fn directory_without_marker_is_a_miss() {
        let root = unique_temp_dir("settlemint-tool-cache-partial");
        let _cleanup = CleanupDir(root.clone());
        let cache = FsToolCache::new(root.clone());
        std::fs::create_dir_all(root.join("settlemint-cli").join("latest").join(paths::arch())).unwrap();

        assert!(cache.find("settlemint-cli", "latest").is_none());
    }

    #[test]
    fn recaching_replaces_previous_content() {
        let root = unique_temp_dir("settlemint-tool-cache-replace");
        let _cleanup = CleanupDir(root.clone());
        let cache = FsToolCache::new(root.join("tc"));
        write_file(&root.join("v1/old.txt"), "old");
        write_file(&root.join("v2/new.txt"), "new");

        cache.cache_dir(&root.join("v1"), "tool", "latest").unwrap();
        let dest = cache.cache_dir(&root.join("v2"), "tool", "latest").unwrap();

        assert!(!dest.join("old.txt").exists());
        assert!(dest.join("new.txt").is_file());
    }

    #[test]
    fn latest_is_a_literal_entry() {
        let root = unique_temp_dir("settlemint-tool-cache-latest");
        let _cleanup = CleanupDir(root.clone());
        let cache = FsToolCache::new(root.join("tc"));
        write_file(&root.join("first/version.txt"), "1.0.0");

        let dest = cache.cache_dir(&root.join("first"), "settlemint-cli", "latest").unwrap();

        assert_eq!(dest, root.join("tc/settlemint-cli/latest").join(paths::arch()));
        assert_eq!(cache.find("settlemint-cli", "latest"), Some(dest.clone()));
        assert!(cache.find("settlemint-cli", "1.0.0").is_none());
        assert_eq!(std::fs::read_to_string(dest.join("version.txt")).unwrap(), "1.0.0");
    }

    #[test]
    fn rejects_missing_source() {
        let root = unique_temp_dir("settlemint-tool-cache-missing");
        let _cleanup = CleanupDir(root.clone());
        let cache = FsToolCache::new(root.clone());
        assert!(cache.cache_dir(&root.join("nope"), "tool", "1.0.0").is_err());
        assert!(cache.find("tool", "1.0.0").is_none());
    }
}
