//! Debian derivatives and the plain Debian version.
//!
//! Several distributions keep Debian's os-release untouched. They are told
//! apart by markers: a prefixed `PRETTY_NAME` (Armbian) or a vendor tool on
//! disk (Proxmox VE's `pveversion`).

use super::{is_file, ResolverPaths};
use crate::identity::IdentityRecord;
use crate::process::capture_stdout;
use std::path::Path;
use tracing::debug;

/// Detect a Debian derivative and rewrite the record as that vendor.
///
/// Returns `false` when no derivative is recognised. A vendor tool that
/// fails to run counts as "not recognised" so the caller falls back to the
/// plain Debian version.
pub fn detect_derivative(record: &mut IdentityRecord, paths: &ResolverPaths) -> bool {
    detect_armbian(record) || detect_proxmox(record, &paths.pveversion())
}

fn detect_armbian(record: &mut IdentityRecord) -> bool {
    // PRETTY_NAME="Armbian 24.2.1 bookworm"
    let Some(rest) = record.pretty_name.strip_prefix("Armbian ") else {
        return false;
    };
    let version = rest.split(' ').next().unwrap_or_default().to_string();

    debug!("Armbian detected, version {}", version);
    record.name = "Armbian".to_string();
    record.id = "armbian".to_string();
    record.id_like = "debian".to_string();
    record.version_id = version;
    true
}

fn detect_proxmox(record: &mut IdentityRecord, pveversion: &Path) -> bool {
    if !is_file(pveversion) {
        return false;
    }

    let output = match capture_stdout(pveversion, &[]) {
        Ok(output) => output,
        Err(e) => {
            debug!("pveversion present but unusable: {}", e);
            return false;
        }
    };
    let version = extract_pve_version(&output);

    debug!("Proxmox VE detected, version {}", version);
    record.id = "pve".to_string();
    record.id_like = "debian".to_string();
    record.name = "Proxmox VE".to_string();
    record.pretty_name = if version.is_empty() {
        "Proxmox VE".to_string()
    } else {
        format!("Proxmox VE {version}")
    };
    record.version_id = version;
    true
}

/// Extract the manager version from `pveversion` output.
///
/// `pve-manager/8.2.2/9355359cd7afbae4 (running kernel: 6.8.4-2-pve)` yields
/// `8.2.2`: the text before the last `/`, then after the first `/`.
pub fn extract_pve_version(output: &str) -> String {
    let line = output.lines().next().unwrap_or_default().trim();
    let before_last = line.rfind('/').map_or(line, |i| &line[..i]);
    let after_first = before_last
        .find('/')
        .map_or(before_last, |i| &before_last[i + 1..]);
    after_first.to_string()
}

/// Use `/etc/debian_version` as both `version` and `version_id`.
///
/// Leaves the record untouched when the file is missing or blank.
pub fn apply_debian_version(record: &mut IdentityRecord, path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    let version = content.trim_end();
    if version.is_empty() {
        return;
    }
    record.version = version.to_string();
    record.version_id = version.to_string();
}
