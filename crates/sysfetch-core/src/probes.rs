//! Background probes.
//!
//! Each probe takes a [`ProbeContext`] snapshot and returns a value; it never
//! touches the runtime state directly. The orchestrator publishes the value
//! into the probe's own slot.

use crate::config::Configuration;
use crate::platform::Platform;
use release_file::{parse_prop_file, PropQuery};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

const DISPLAY_ENV_KEYS: &[&str] = &[
    "WAYLAND_DISPLAY",
    "DISPLAY",
    "XDG_SESSION_TYPE",
    "XDG_CURRENT_DESKTOP",
    "DESKTOP_SESSION",
];

/// Read-only inputs shared by all probes of one run.
#[derive(Debug, Clone)]
pub struct ProbeContext {
    pub config: Arc<Configuration>,
    pub home_dir: Option<PathBuf>,
    pub config_home: Option<PathBuf>,
    pub env: HashMap<String, String>,
}

impl ProbeContext {
    /// Snapshot the configuration, platform paths and display environment.
    pub fn capture(config: Arc<Configuration>, platform: Option<&Platform>) -> Self {
        let env = DISPLAY_ENV_KEYS
            .iter()
            .filter_map(|k| std::env::var(k).ok().map(|v| (k.to_string(), v)))
            .collect();

        ProbeContext {
            config,
            home_dir: platform.and_then(|p| p.home_dir.clone()),
            config_home: platform.and_then(|p| p.config_home.clone()),
            env,
        }
    }

    fn var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Display server connection facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayServerInfo {
    /// `wayland`, `x11`, `tty`, ... (empty when unknown)
    pub protocol: String,
    pub session_type: String,
    pub desktop: String,
}

/// Theme settings of a desktop toolkit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolkitInfo {
    pub theme: String,
    pub icons: String,
    pub font: String,
    pub cursor: String,
}

impl ToolkitInfo {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub fn detect_display_server(ctx: &ProbeContext) -> DisplayServerInfo {
    let session_type = ctx.var("XDG_SESSION_TYPE").unwrap_or_default().to_string();

    let protocol = if ctx.var("WAYLAND_DISPLAY").is_some() {
        "wayland".to_string()
    } else if ctx.var("DISPLAY").is_some() {
        "x11".to_string()
    } else {
        session_type.to_lowercase()
    };

    let desktop = ctx
        .var("XDG_CURRENT_DESKTOP")
        .or_else(|| ctx.var("DESKTOP_SESSION"))
        .unwrap_or_default()
        .to_string();

    DisplayServerInfo {
        protocol,
        session_type,
        desktop,
    }
}

/// GTK settings for major version 2, 3 or 4.
pub fn detect_gtk(ctx: &ProbeContext, major: u8) -> ToolkitInfo {
    let path = match major {
        2 => ctx.home_dir.as_ref().map(|h| h.join(".gtkrc-2.0")),
        _ => ctx
            .config_home
            .as_ref()
            .map(|c| c.join(format!("gtk-{major}.0")).join("settings.ini")),
    };

    let mut info = ToolkitInfo::default();
    if let Some(path) = path {
        parse_prop_file(
            &path,
            &mut [
                PropQuery::new("gtk-theme-name", &mut info.theme),
                PropQuery::new("gtk-icon-theme-name", &mut info.icons),
                PropQuery::new("gtk-font-name", &mut info.font),
                PropQuery::new("gtk-cursor-theme-name", &mut info.cursor),
            ],
        );
    }
    info
}

/// Qt / KDE Plasma settings.
pub fn detect_qt(ctx: &ProbeContext) -> ToolkitInfo {
    let mut info = ToolkitInfo::default();
    let Some(config_home) = ctx.config_home.as_ref() else {
        return info;
    };

    parse_prop_file(
        &config_home.join("kdeglobals"),
        &mut [
            PropQuery::new("widgetStyle", &mut info.theme),
            PropQuery::new("Theme", &mut info.icons),
            PropQuery::new("font", &mut info.font),
        ],
    );
    parse_prop_file(
        &config_home.join("kcminputrc"),
        &mut [PropQuery::new("cursorTheme", &mut info.cursor)],
    );
    info
}
