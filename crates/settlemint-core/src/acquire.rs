//! CLI 工具获取：命中缓存则复用，否则隔离安装并登记缓存，安装失败时降级为一次全局安装。
//!
//! 状态流转：
//! - `Unresolved` -> `CacheHit`：工具缓存中已有（名称, 版本）
//! - `Unresolved` -> `Installing` -> `Installed`：安装到新建临时目录，登记到工具缓存
//! - `Installing` -> `GlobalFallback`：隔离安装失败，告警后执行一次全局安装
//! - `GlobalFallback` -> `Failed`：全局安装也失败，错误向上传递（由编排层统一上报）
//!
//! `CacheHit`/`Installed` 会把 `<path>/node_modules/.bin` 登记到可执行搜索路径；
//! `GlobalFallback` 不登记任何路径，调用方通过环境中的 `PATH` 查找可执行文件。
//!
//! 作者：SettleMint CLI Action 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::error::ActionError;
use crate::paths::{self, PACKAGE_BIN_SUBPATH};
use crate::toolkit::{EnvPublisher, ExecEnv, ProcessRunner, Reporter, ToolCache};

/// 获取流程所处状态（用于日志与测试观察）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireState {
    Unresolved,
    CacheHit,
    Installing,
    Installed,
    GlobalFallback,
    Failed,
}

/// 待获取的工具。
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// 工具缓存中的名称。
    pub name: String,
    /// npm 包名。
    pub package: String,
    /// 精确版本或 `latest`。
    pub version: String,
    /// 可执行文件名（不含扩展名）。
    pub executable: String,
}

impl ToolSpec {
    /// `<package>@<version>`。
    pub fn package_ref(&self) -> String {
        format!("{}@{}", self.package, self.version)
    }
}

/// 获取结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLocation {
    /// 受管安装：缓存目录与其可执行目录。
    Managed { root: PathBuf, bin_dir: PathBuf },
    /// 已尝试全局安装，可执行文件从 `PATH` 查找。
    Global,
}

impl ToolLocation {
    /// 调用工具时使用的程序名：受管安装返回绝对路径，全局安装返回裸名。
    pub fn program(&self, executable: &str) -> String {
        match self {
            ToolLocation::Managed { bin_dir, .. } => bin_dir
                .join(platform_executable(executable))
                .to_string_lossy()
                .into_owned(),
            ToolLocation::Global => executable.to_string(),
        }
    }
}

/// 获取结果与最终状态。
#[derive(Debug, Clone)]
pub struct Acquired {
    pub location: ToolLocation,
    pub state: AcquireState,
}

/// 执行获取流程。
///
/// 参数：
/// - `toolkit`：工具缓存/进程执行/路径登记/告警等协作方
/// - `spec`：待获取的工具
/// - `scratch_root`：隔离安装临时目录的父目录
/// - `env`：子进程环境；登记的可执行目录会同步加入其中
///
/// 异常处理：
/// - 隔离安装失败：告警并降级，不返回错误
/// - 全局安装失败、登记路径失败：返回 [`ActionError::Installation`]
pub fn acquire_tool<T>(toolkit: &mut T, spec: &ToolSpec, scratch_root: &Path, env: &mut ExecEnv) -> Result<Acquired, ActionError>
where
    T: Reporter + EnvPublisher + ProcessRunner + ToolCache + ?Sized,
{
    let mut state = AcquireState::Unresolved;
    debug!(?state, tool = %spec.name, version = %spec.version, "查找工具缓存");

    if let Some(root) = toolkit.find(&spec.name, &spec.version) {
        state = AcquireState::CacheHit;
        info!("命中工具缓存: {}", root.display());
        let location = register(toolkit, spec, root, env)?;
        return Ok(Acquired { location, state });
    }

    state = AcquireState::Installing;
    debug!(?state, "工具缓存未命中，开始安装 {}", spec.package_ref());
    match install_isolated(toolkit, spec, scratch_root, env) {
        Ok(root) => {
            state = AcquireState::Installed;
            debug!(?state, "已登记到工具缓存: {}", root.display());
            let location = register(toolkit, spec, root, env)?;
            Ok(Acquired { location, state })
        }
        Err(e) => {
            toolkit.warning(&format!(
                "Failed to install {} into the tool cache, falling back to a global installation: {e:#}",
                spec.package_ref()
            ));
            state = AcquireState::GlobalFallback;
            debug!(?state, "执行全局安装");
            install_global(toolkit, spec, env).map_err(|e| {
                debug!(state = ?AcquireState::Failed, "全局安装失败");
                installation_error(spec, e)
            })?;
            Ok(Acquired {
                location: ToolLocation::Global,
                state,
            })
        }
    }
}

fn install_isolated<T>(toolkit: &mut T, spec: &ToolSpec, scratch_root: &Path, env: &ExecEnv) -> Result<PathBuf>
where
    T: ProcessRunner + ToolCache + ?Sized,
{
    let scratch = paths::unique_scratch_dir(scratch_root, &spec.name)?;
    let args = vec![
        "install".to_string(),
        "--no-save".to_string(),
        "--prefix".to_string(),
        scratch.to_string_lossy().into_owned(),
        spec.package_ref(),
    ];
    let result = toolkit
        .exec(npm_program(), &args, env)
        .with_context(|| format!("npm install {} 失败", spec.package_ref()))
        .and_then(|_| toolkit.cache_dir(&scratch, &spec.name, &spec.version));
    // 已复制进工具缓存（或安装失败），临时目录不再需要。
    if let Err(e) = std::fs::remove_dir_all(&scratch) {
        warn!("清理临时安装目录失败: {}: {e}", scratch.display());
    }
    result
}

fn install_global<T>(toolkit: &mut T, spec: &ToolSpec, env: &ExecEnv) -> Result<()>
where
    T: ProcessRunner + ?Sized,
{
    let args = vec!["install".to_string(), "-g".to_string(), spec.package_ref()];
    toolkit.exec(npm_program(), &args, env)?;
    Ok(())
}

fn register<T>(toolkit: &mut T, spec: &ToolSpec, root: PathBuf, env: &mut ExecEnv) -> Result<ToolLocation, ActionError>
where
    T: EnvPublisher + ?Sized,
{
    let bin_dir = root.join(PACKAGE_BIN_SUBPATH);
    toolkit
        .add_path(&bin_dir)
        .map_err(|e| installation_error(spec, e))?;
    env.prepend_path(bin_dir.clone());
    Ok(ToolLocation::Managed { root, bin_dir })
}

fn installation_error(spec: &ToolSpec, e: anyhow::Error) -> ActionError {
    ActionError::Installation {
        package: spec.package_ref(),
        message: format!("{e:#}"),
    }
}

fn npm_program() -> &'static str {
    if cfg!(windows) {
        "npm.cmd"
    } else {
        "npm"
    }
}

fn platform_executable(executable: &str) -> String {
    if cfg!(windows) {
        format!("{executable}.cmd")
    } else {
        executable.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::anyhow;

    use super::*;

    /// 仅实现获取流程所需接口的记录型替身。
    #[derive(Default)]
    struct FakeToolkit {
        cached: HashMap<(String, String), PathBuf>,
        fail_programs: Vec<(String, String)>,
        execs: Vec<(String, Vec<String>)>,
        paths: Vec<PathBuf>,
        warnings: Vec<String>,
    }

    impl Reporter for FakeToolkit {
        fn debug(&mut self, _message: &str) {}
        fn info(&mut self, _message: &str) {}
        fn warning(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }
        fn error(&mut self, _message: &str) {}
        fn mark_secret(&mut self, _value: &str) {}
        fn set_failed(&mut self, _message: &str) {}
    }

    impl EnvPublisher for FakeToolkit {
        fn export_variable(&mut self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }
        fn add_path(&mut self, dir: &Path) -> Result<()> {
            self.paths.push(dir.to_path_buf());
            Ok(())
        }
    }

    impl ProcessRunner for FakeToolkit {
        fn exec(&mut self, program: &str, args: &[String], _env: &ExecEnv) -> Result<i32> {
            self.execs.push((program.to_string(), args.to_vec()));
            // 以“程序名 + 第二个参数”识别安装方式：--no-save 为隔离安装，-g 为全局安装。
            let mode = args.get(1).cloned().unwrap_or_default();
            if self.fail_programs.iter().any(|(p, m)| p == program && *m == mode) {
                return Err(anyhow!("The process '{program}' failed with exit code 1"));
            }
            Ok(0)
        }
    }

    impl ToolCache for FakeToolkit {
        fn find(&self, name: &str, version: &str) -> Option<PathBuf> {
            self.cached.get(&(name.to_string(), version.to_string())).cloned()
        }
        fn cache_dir(&mut self, _source: &Path, name: &str, version: &str) -> Result<PathBuf> {
            let p = PathBuf::from("/cached").join(name).join(version);
            self.cached.insert((name.to_string(), version.to_string()), p.clone());
            Ok(p)
        }
    }

    fn spec() -> ToolSpec {
        ToolSpec {
            name: "settlemint-cli".into(),
            package: "@settlemint/sdk-cli".into(),
            version: "1.2.3".into(),
            executable: "settlemint".into(),
        }
    }

    #[test]
    fn cache_hit_registers_bin_dir_without_installing() {
        let mut tk = FakeToolkit::default();
        tk.cached.insert(("settlemint-cli".into(), "1.2.3".into()), PathBuf::from("/tc/sm"));
        let mut env = ExecEnv::default();

        let got = acquire_tool(&mut tk, &spec(), &std::env::temp_dir(), &mut env).unwrap();

        assert_eq!(got.state, AcquireState::CacheHit);
        assert!(tk.execs.is_empty());
        let bin = PathBuf::from("/tc/sm").join(PACKAGE_BIN_SUBPATH);
        assert_eq!(tk.paths, vec![bin.clone()]);
        assert_eq!(env.path_prefix, vec![bin]);
    }

    #[test]
    fn miss_installs_once_and_caches() {
        let mut tk = FakeToolkit::default();
        let mut env = ExecEnv::default();

        let got = acquire_tool(&mut tk, &spec(), &std::env::temp_dir(), &mut env).unwrap();

        assert_eq!(got.state, AcquireState::Installed);
        assert_eq!(tk.execs.len(), 1);
        assert_eq!(tk.execs[0].1[0], "install");
        assert_eq!(tk.execs[0].1.last().unwrap(), "@settlemint/sdk-cli@1.2.3");
        let root = PathBuf::from("/cached/settlemint-cli/1.2.3");
        assert_eq!(
            got.location,
            ToolLocation::Managed {
                root: root.clone(),
                bin_dir: root.join(PACKAGE_BIN_SUBPATH)
            }
        );
        assert!(tk.find("settlemint-cli", "1.2.3").is_some());
    }

    #[test]
    fn failed_install_falls_back_to_global_once() {
        let mut tk = FakeToolkit::default();
        tk.fail_programs.push((npm_program().into(), "--no-save".into()));
        let mut env = ExecEnv::default();

        let got = acquire_tool(&mut tk, &spec(), &std::env::temp_dir(), &mut env).unwrap();

        assert_eq!(got.state, AcquireState::GlobalFallback);
        assert_eq!(got.location, ToolLocation::Global);
        assert_eq!(tk.execs.len(), 2);
        assert_eq!(tk.execs[1].1, vec!["install", "-g", "@settlemint/sdk-cli@1.2.3"]);
        assert_eq!(tk.warnings.len(), 1);
        assert!(tk.paths.is_empty());
        assert!(env.path_prefix.is_empty());
    }

    #[test]
    fn failed_global_install_propagates() {
        let mut tk = FakeToolkit::default();
        tk.fail_programs.push((npm_program().into(), "--no-save".into()));
        tk.fail_programs.push((npm_program().into(), "-g".into()));
        let mut env = ExecEnv::default();

        let err = acquire_tool(&mut tk, &spec(), &std::env::temp_dir(), &mut env).unwrap_err();

        assert!(matches!(err, ActionError::Installation { .. }));
        assert!(err.to_string().contains("@settlemint/sdk-cli@1.2.3"));
    }

    #[test]
    fn scratch_dirs_are_removed_after_install_attempts() {
        let scratch_root = std::env::temp_dir().join(format!("settlemint-acquire-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&scratch_root).unwrap();
        let mut tk = FakeToolkit::default();
        let mut env = ExecEnv::default();

        acquire_tool(&mut tk, &spec(), &scratch_root, &mut env).unwrap();
        tk.cached.clear();
        tk.fail_programs.push((npm_program().into(), "--no-save".into()));
        acquire_tool(&mut tk, &spec(), &scratch_root, &mut env).unwrap();

        let leftovers = std::fs::read_dir(&scratch_root).unwrap().count();
        let _ = std::fs::remove_dir_all(&scratch_root);
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn program_resolution_depends_on_location() {
        assert_eq!(ToolLocation::Global.program("settlemint"), "settlemint");
        let managed = ToolLocation::Managed {
            root: PathBuf::from("/r"),
            bin_dir: PathBuf::from("/r/bin"),
        };
        assert!(managed.program("settlemint").starts_with("/r/bin"));
    }
}
