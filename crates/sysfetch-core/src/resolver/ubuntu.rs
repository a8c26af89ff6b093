//! Ubuntu flavour detection.
//!
//! Official flavours share `ID=ubuntu` in os-release. The desktop flavour is
//! guessed from `XDG_CONFIG_DIRS`, which flavours extend with their own
//! directories (`/etc/xdg/xdg-xubuntu`, `/usr/share/kubuntu-default-settings`, ...).

use crate::identity::IdentityRecord;
use tracing::debug;

/// An official Ubuntu flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UbuntuFlavour {
    /// Substrings of `XDG_CONFIG_DIRS` that select this flavour
    pub keywords: &'static [&'static str],
    /// Display name, used for both `name` and `pretty_name`
    pub name: &'static str,
    pub id: &'static str,
}

/// Flavours in match order. The first flavour with a matching keyword wins.
pub const FLAVOURS: &[UbuntuFlavour] = &[
    UbuntuFlavour {
        keywords: &["kde", "plasma"],
        name: "Kubuntu",
        id: "kubuntu",
    },
    UbuntuFlavour {
        keywords: &["xfce", "xubuntu"],
        name: "Xubuntu",
        id: "xubuntu",
    },
    UbuntuFlavour {
        keywords: &["lxde", "lubuntu"],
        name: "Lubuntu",
        id: "lubuntu",
    },
    UbuntuFlavour {
        keywords: &["budgie"],
        name: "Ubuntu Budgie",
        id: "ubuntu-budgie",
    },
    UbuntuFlavour {
        keywords: &["cinnamon"],
        name: "Ubuntu Cinnamon",
        id: "ubuntu-cinnamon",
    },
    UbuntuFlavour {
        keywords: &["mate"],
        name: "Ubuntu MATE",
        id: "ubuntu-mate",
    },
    UbuntuFlavour {
        keywords: &["studio"],
        name: "Ubuntu Studio",
        id: "ubuntu-studio",
    },
    UbuntuFlavour {
        keywords: &["sway"],
        name: "Ubuntu Sway",
        id: "ubuntu-sway",
    },
    UbuntuFlavour {
        keywords: &["touch"],
        name: "Ubuntu Touch",
        id: "ubuntu-touch",
    },
];

/// Find the flavour selected by a config-directories hint.
pub fn detect_flavour(xdg_config_dirs: &str) -> Option<&'static UbuntuFlavour> {
    FLAVOURS
        .iter()
        .find(|f| f.keywords.iter().any(|k| xdg_config_dirs.contains(k)))
}

/// Rewrite `record` as the flavour selected by the hint, if any.
///
/// Returns whether a flavour was applied.
pub fn apply_flavour(record: &mut IdentityRecord, xdg_config_dirs: Option<&str>) -> bool {
    let Some(hint) = xdg_config_dirs.filter(|h| !h.is_empty()) else {
        return false;
    };
    let Some(flavour) = detect_flavour(hint) else {
        return false;
    };

    debug!("Ubuntu flavour detected: {}", flavour.name);
    record.name = flavour.name.to_string();
    record.pretty_name = flavour.name.to_string();
    record.id = flavour.id.to_string();
    record.id_like = "ubuntu".to_string();
    true
}
