//! Platform facts shared by several detectors.

use serde::Serialize;
use std::path::PathBuf;

/// Facts about the host and the current user, collected once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub home_dir: Option<PathBuf>,
    pub config_home: Option<PathBuf>,
    pub config_dirs: Vec<PathBuf>,
    pub data_dirs: Vec<PathBuf>,
    pub exe_path: Option<PathBuf>,
    pub user_name: String,
    pub user_shell: String,
    pub host_name: String,
    pub kernel_name: String,
    pub kernel_release: String,
    pub kernel_version: String,
}

impl Platform {
    /// Collect platform facts from the environment and `/proc`.
    pub fn collect() -> Self {
        Self::collect_with(|key| std::env::var(key).ok())
    }

    /// Collect with an injectable environment lookup.
    pub fn collect_with<F>(env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.is_empty());

        let home_dir = var("HOME").map(PathBuf::from);
        let config_home = var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir.as_ref().map(|h| h.join(".config")));
        let config_dirs = split_dirs(var("XDG_CONFIG_DIRS").as_deref().unwrap_or("/etc/xdg"));
        let data_dirs = split_dirs(
            var("XDG_DATA_DIRS")
                .as_deref()
                .unwrap_or("/usr/local/share:/usr/share"),
        );

        let host_name = read_kernel_value("hostname")
            .or_else(|| var("HOSTNAME"))
            .unwrap_or_default();

        Platform {
            home_dir,
            config_home,
            config_dirs,
            data_dirs,
            exe_path: std::env::current_exe().ok(),
            user_name: var("USER").or_else(|| var("LOGNAME")).unwrap_or_default(),
            user_shell: var("SHELL").unwrap_or_default(),
            host_name,
            kernel_name: read_kernel_value("ostype").unwrap_or_else(|| std::env::consts::OS.to_string()),
            kernel_release: read_kernel_value("osrelease").unwrap_or_default(),
            kernel_version: read_kernel_value("version").unwrap_or_default(),
        }
    }
}

fn split_dirs(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn read_kernel_value(name: &str) -> Option<String> {
    std::fs::read_to_string(format!("/proc/sys/kernel/{name}"))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
