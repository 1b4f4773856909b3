//! 目录复制等文件系统辅助函数。

use std::path::Path;

use anyhow::{Context, Result};

/// 递归复制文件/目录。
///
/// 参数：
/// - `src`：源路径（文件或目录）
/// - `dst`：目标路径（文件或目录）
///
/// 说明：
/// - Unix 下符号链接按链接本身复制（`node_modules/.bin` 中的入口均为相对链接）
/// - 目标已存在时覆盖：类型不同的旧条目（及旧链接）先删除，不会写穿旧链接
///
/// 异常处理：
/// - 读目录/创建目录/复制文件失败会返回错误
pub fn copy_recursively(src: &Path, dst: &Path) -> Result<()> {
    if src.is_file() {
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        clear_destination(dst, false)?;
        std::fs::copy(src, dst)
            .with_context(|| format!("复制文件失败: {} -> {}", src.display(), dst.display()))?;
        return Ok(());
    }

    clear_destination(dst, true)?;
    std::fs::create_dir_all(dst).with_context(|| format!("创建目录失败: {}", dst.display()))?;
    for entry in std::fs::read_dir(src).with_context(|| format!("读取目录失败: {}", src.display()))? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if file_type.is_symlink() {
            copy_symlink(&from, &to)?;
        } else if file_type.is_dir() {
            copy_recursively(&from, &to)?;
        } else {
            clear_destination(&to, false)?;
            std::fs::copy(&from, &to)
                .with_context(|| format!("复制文件失败: {} -> {}", from.display(), to.display()))?;
        }
    }
    Ok(())
}

/// 删除目标位置上与待写入类型冲突的已有条目。
///
/// - `keep_dir = true`：已有目录（含指向目录的链接）保留并合并写入，其余条目删除
/// - `keep_dir = false`：已有的链接删除，真实目录删除，普通文件由复制直接覆盖
fn clear_destination(dst: &Path, keep_dir: bool) -> Result<()> {
    let Ok(meta) = std::fs::symlink_metadata(dst) else {
        return Ok(());
    };
    if keep_dir && dst.is_dir() {
        return Ok(());
    }
    let file_type = meta.file_type();
    let result = if file_type.is_dir() {
        std::fs::remove_dir_all(dst)
    } else if file_type.is_symlink() || keep_dir {
        std::fs::remove_file(dst)
    } else {
        return Ok(());
    };
    result.with_context(|| format!("删除已有条目失败: {}", dst.display()))
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let target = std::fs::read_link(from).with_context(|| format!("读取链接失败: {}", from.display()))?;
    clear_destination(to, false)?;
    std::os::unix::fs::symlink(&target, to)
        .with_context(|| format!("创建链接失败: {} -> {}", to.display(), target.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    if from.is_dir() {
        copy_recursively(from, to)
    } else {
        clear_destination(to, false)?;
        std::fs::copy(from, to).with_context(|| format!("复制文件失败: {} -> {}", from.display(), to.display()))?;
        Ok(())
    }
}

/// 尽力删除文件或目录（不存在时忽略）。
pub fn remove_path(path: &Path) {
    if path.is_dir() {
        let _ = std::fs::remove_dir_all(path);
    } else {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::{Path, PathBuf};

    use uuid::Uuid;

    pub fn unique_temp_dir(prefix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    pub fn write_file(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().expect("parent"))
            .unwrap_or_else(|e| panic!("create parent for {} failed: {e}", path.display()));
        std::fs::write(path, content).unwrap_or_else(|e| panic!("write {} failed: {e}", path.display()));
    }

    pub struct CleanupDir(pub PathBuf);

    impl Drop for CleanupDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }
}
