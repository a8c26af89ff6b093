//! OS identity record.

use serde::{Deserialize, Serialize};

/// Identity of the running operating system or distribution.
///
/// Every field is plain text and an empty string means "not known". Fields
/// are filled incrementally by the resolver; parser fills only ever write
/// empty fields, override rules may replace or clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pretty_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub codename: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id_like: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub build_id: String,
}

impl IdentityRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// A record is usable once `id`, `name` and `pretty_name` are all set.
    pub fn all_relevant_values_set(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty() && !self.pretty_name.is_empty()
    }

    /// Whether nothing at all has been filled in.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Case-insensitive comparison against the resolved `id`.
    pub fn id_is(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }
}

impl std::fmt::Display for IdentityRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.pretty_name.is_empty() {
            return write!(f, "{}", self.pretty_name);
        }
        match (self.name.is_empty(), self.version.is_empty()) {
            (false, false) => write!(f, "{} {}", self.name, self.version),
            (false, true) => write!(f, "{}", self.name),
            (true, _) => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, pretty: &str) -> IdentityRecord {
        IdentityRecord {
            id: id.to_string(),
            name: name.to_string(),
            pretty_name: pretty.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_relevant_values_set_requires_three_fields() {
        assert!(record("arch", "Arch Linux", "Arch Linux").all_relevant_values_set());
        assert!(!record("", "Arch Linux", "Arch Linux").all_relevant_values_set());
        assert!(!record("arch", "", "Arch Linux").all_relevant_values_set());
        assert!(!record("arch", "Arch Linux", "").all_relevant_values_set());
    }

    #[test]
    fn test_usability_ignores_other_fields() {
        let mut r = record("arch", "Arch Linux", "Arch Linux");
        r.version = "rolling".to_string();
        r.build_id = "2024.01.01".to_string();
        assert!(r.all_relevant_values_set());

        let mut r = IdentityRecord::new();
        r.version = "12".to_string();
        r.version_id = "12".to_string();
        r.codename = "bookworm".to_string();
        assert!(!r.all_relevant_values_set());
    }

    #[test]
    fn test_id_is_case_insensitive() {
        assert!(record("Ubuntu", "", "").id_is("ubuntu"));
        assert!(!record("kubuntu", "", "").id_is("ubuntu"));
    }

    #[test]
    fn test_display_fallbacks() {
        assert_eq!(record("ubuntu", "Ubuntu", "Ubuntu 22.04").to_string(), "Ubuntu 22.04");

        let mut r = record("debian", "Debian GNU/Linux", "");
        r.version = "12.5".to_string();
        assert_eq!(r.to_string(), "Debian GNU/Linux 12.5");

        assert_eq!(record("debian", "", "").to_string(), "debian");
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let v = serde_json::to_value(record("ubuntu", "Ubuntu", "")).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["id"], "ubuntu");
        assert!(!obj.contains_key("prettyName"));
    }
}
