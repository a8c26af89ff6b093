use std::path::Path;

use sysfetch_core::resolver::parse_os_release;
use sysfetch_core::{CascadeStep, IdentityRecord, OsIdentityResolver, ResolverEnv, ResolverPaths};
use tempfile::TempDir;

fn root() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn resolver(root: &Path, xdg_config_dirs: Option<&str>) -> OsIdentityResolver {
    OsIdentityResolver::new(
        ResolverPaths::new(root),
        ResolverEnv {
            xdg_config_dirs: xdg_config_dirs.map(str::to_string),
        },
    )
}

const UBUNTU_OS_RELEASE: &str = r#"PRETTY_NAME="Ubuntu 22.04.3 LTS"
NAME="Ubuntu"
VERSION_ID="22.04"
VERSION="22.04.3 LTS (Jammy Jellyfish)"
VERSION_CODENAME=jammy
ID=ubuntu
ID_LIKE=debian
"#;

// ── Legacy distribution-release step ─────────────────────────────────────

#[test]
fn mx_short_circuits_before_os_release() {
    let dir = root();
    write(
        dir.path(),
        "etc/lsb-release",
        "DISTRIB_ID=mx\nDISTRIB_RELEASE=23.1\nDISTRIB_DESCRIPTION=\"MX 23.1 Libretto\"\n",
    );
    write(
        dir.path(),
        "etc/os-release",
        "PRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\nNAME=\"Debian GNU/Linux\"\nID=debian\nVARIANT=bogus\n",
    );

    let resolution = resolver(dir.path(), None).resolve_detailed();
    let record = resolution.record;

    assert_eq!(resolution.step, CascadeStep::LegacyVendor);
    assert_eq!(record.name, "MX");
    assert_eq!(record.id_like, "debian");
    assert_eq!(record.pretty_name, "MX 23.1 Libretto");
    assert_eq!(record.version, "23.1");
    assert!(record.variant.is_empty(), "os-release must not be consulted");
}

#[test]
fn rolling_version_is_cleared() {
    let dir = root();
    write(
        dir.path(),
        "etc/lsb-release",
        "DISTRIB_ID=\"Arch\"\nDISTRIB_RELEASE=\"rolling\"\nDISTRIB_DESCRIPTION=\"Arch Linux\"\n",
    );
    write(
        dir.path(),
        "etc/os-release",
        "NAME=\"Arch Linux\"\nPRETTY_NAME=\"Arch Linux\"\nID=arch\nBUILD_ID=rolling\n",
    );

    let record = resolver(dir.path(), None).resolve();

    assert!(record.version.is_empty());
    assert_eq!(record.name, "Arch Linux");
    assert_eq!(record.build_id, "rolling");
}

#[test]
fn os_release_never_overwrites_lsb_fields() {
    let dir = root();
    write(
        dir.path(),
        "etc/lsb-release",
        "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=22.04\nDISTRIB_CODENAME=jammy\nDISTRIB_DESCRIPTION=\"Ubuntu 22.04 (lsb)\"\n",
    );
    write(dir.path(), "etc/os-release", UBUNTU_OS_RELEASE);

    let record = resolver(dir.path(), None).resolve();

    assert_eq!(record.id, "Ubuntu");
    assert_eq!(record.version, "22.04");
    assert_eq!(record.pretty_name, "Ubuntu 22.04 (lsb)");
    assert_eq!(record.codename, "jammy");
    // Fields lsb-release does not carry come from os-release
    assert_eq!(record.name, "Ubuntu");
    assert_eq!(record.version_id, "22.04");
    assert_eq!(record.id_like, "debian");
}

#[test]
fn parsing_same_file_twice_is_identical() {
    let dir = root();
    write(dir.path(), "etc/os-release", UBUNTU_OS_RELEASE);
    let path = dir.path().join("etc/os-release");

    let mut first = IdentityRecord::default();
    let mut second = IdentityRecord::default();
    assert!(parse_os_release(&path, &mut first));
    assert!(parse_os_release(&path, &mut second));

    assert_eq!(first, second);
    assert_eq!(first.codename, "jammy");
}

// ── Primary / fallback os-release ────────────────────────────────────────

#[test]
fn usable_primary_skips_fallback() {
    let dir = root();
    write(dir.path(), "etc/os-release", UBUNTU_OS_RELEASE);
    write(dir.path(), "usr/lib/os-release", "VARIANT=fallback\n");

    let resolution = resolver(dir.path(), None).resolve_detailed();
    assert_eq!(resolution.step, CascadeStep::PrimaryOsRelease);
    assert!(resolution.record.variant.is_empty());
}

#[test]
fn unusable_primary_is_completed_by_fallback() {
    let dir = root();
    write(dir.path(), "etc/os-release", "ID=fedora\nVERSION_ID=39\n");
    write(
        dir.path(),
        "usr/lib/os-release",
        "ID=rhel\nNAME=\"Fedora Linux\"\nPRETTY_NAME=\"Fedora Linux 39\"\nVERSION_ID=40\n",
    );

    let resolution = resolver(dir.path(), None).resolve_detailed();
    let record = resolution.record;

    assert_eq!(resolution.step, CascadeStep::FallbackOsRelease);
    assert_eq!(record.id, "fedora");
    assert_eq!(record.version_id, "39");
    assert_eq!(record.name, "Fedora Linux");
    assert!(record.all_relevant_values_set());
}

// ── End-to-end ───────────────────────────────────────────────────────────

#[test]
fn ubuntu_without_hint_is_plain_ubuntu() {
    let dir = root();
    write(
        dir.path(),
        "etc/os-release",
        "PRETTY_NAME=\"Ubuntu 22.04.3 LTS\"\nNAME=\"Ubuntu\"\nID=ubuntu\n",
    );

    let record = resolver(dir.path(), None).resolve();

    assert_eq!(record.id, "ubuntu");
    assert_eq!(record.name, "Ubuntu");
    assert_eq!(record.pretty_name, "Ubuntu 22.04.3 LTS");
    assert!(record.id_like.is_empty());
}

#[test]
fn debian_from_fallback_only() {
    let dir = root();
    write(dir.path(), "usr/lib/os-release", "ID=debian\n");

    let record = resolver(dir.path(), None).resolve();

    assert_eq!(record.id, "debian");
    assert!(record.name.is_empty());
    assert!(record.pretty_name.is_empty());
    assert!(record.version.is_empty());
    assert!(record.version_id.is_empty());
}

#[test]
fn debian_version_file_fills_version() {
    let dir = root();
    write(
        dir.path(),
        "etc/os-release",
        "PRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\nNAME=\"Debian GNU/Linux\"\nVERSION_ID=\"12\"\nID=debian\n",
    );
    write(dir.path(), "etc/debian_version", "12.5\n");

    let record = resolver(dir.path(), None).resolve();

    assert_eq!(record.version, "12.5");
    assert_eq!(record.version_id, "12.5");
}

#[test]
fn armbian_derivative() {
    let dir = root();
    write(
        dir.path(),
        "etc/os-release",
        "PRETTY_NAME=\"Armbian 24.2.1 bookworm\"\nNAME=\"Debian GNU/Linux\"\nID=debian\n",
    );
    write(dir.path(), "etc/debian_version", "12.5\n");

    let record = resolver(dir.path(), None).resolve();

    assert_eq!(record.id, "armbian");
    assert_eq!(record.name, "Armbian");
    assert_eq!(record.version_id, "24.2.1");
    assert!(record.version.is_empty(), "debian_version is not read for derivatives");
}

#[test]
fn ubuntu_flavour_precedence() {
    let dir = root();
    write(dir.path(), "etc/os-release", UBUNTU_OS_RELEASE);

    let record = resolver(dir.path(), Some("/etc/xdg/xdg-xfce:/usr/share/kde:/etc/xdg")).resolve();
    assert_eq!(record.name, "Kubuntu");
    assert_eq!(record.id, "kubuntu");

    let record = resolver(dir.path(), Some("/etc/xdg/xdg-xubuntu:/etc/xdg")).resolve();
    assert_eq!(record.name, "Xubuntu");
    assert_eq!(record.pretty_name, "Xubuntu");
    assert_eq!(record.id_like, "ubuntu");
}

#[test]
fn flavour_hint_ignored_for_other_distros() {
    let dir = root();
    write(
        dir.path(),
        "etc/os-release",
        "NAME=Fedora\nPRETTY_NAME=Fedora\nID=fedora\n",
    );

    let record = resolver(dir.path(), Some("/usr/share/kde")).resolve();
    assert_eq!(record.name, "Fedora");
}

// ── Escape hatch ─────────────────────────────────────────────────────────

#[test]
fn bedrock_with_usable_nested_os_release() {
    let dir = root();
    write(dir.path(), "bedrock/etc/bedrock-release", "Bedrock Linux 0.7.30 Poki\n");
    write(
        dir.path(),
        "bedrock/etc/os-release",
        "NAME=\"Bedrock Linux\"\nID=bedrock\nVERSION_ID=0.7.30\n",
    );
    write(dir.path(), "etc/os-release", UBUNTU_OS_RELEASE);

    let resolution = resolver(dir.path(), None).resolve_detailed();
    let record = resolution.record;

    assert_eq!(resolution.step, CascadeStep::EscapeHatch);
    assert_eq!(record.id, "bedrock");
    assert_eq!(record.name, "Bedrock");
    assert_eq!(record.pretty_name, "Bedrock Linux");
    assert_eq!(record.version_id, "0.7.30");
    assert!(record.codename.is_empty());
}

#[test]
fn empty_root_returns_empty_record() {
    let dir = root();
    let record = resolver(dir.path(), Some("/usr/share/kde")).resolve();
    assert!(record.is_empty());
}
