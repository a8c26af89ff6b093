//! Property line scanning
//!
//! Accepts both `KEY=value` (os-release) and `KEY = value` (lsb-release as
//! written by some distributions) and strips shell quoting from values.

use crate::error::ReleaseFileError;
use crate::Result;
use std::path::Path;
use tracing::trace;

/// A key to look for and the field that receives its value.
///
/// The target is only written while it is still empty, so running several
/// parses into the same targets keeps the first value found.
#[derive(Debug)]
pub struct PropQuery<'a> {
    /// Key token as it appears on the left-hand side of `=`
    pub key: &'a str,
    /// Destination for the unquoted value
    pub target: &'a mut String,
}

impl<'a> PropQuery<'a> {
    /// Create a new query
    pub fn new(key: &'a str, target: &'a mut String) -> Self {
        PropQuery { key, target }
    }
}

/// Parse a property file into the given queries.
///
/// Returns `true` if the file could be read, regardless of how many
/// queries matched.
pub fn parse_prop_file(path: &Path, queries: &mut [PropQuery<'_>]) -> bool {
    match try_parse_prop_file(path, queries) {
        Ok(filled) => {
            trace!("{}: filled {} field(s)", path.display(), filled);
            true
        }
        Err(e) => {
            trace!("Skipping property file: {}", e);
            false
        }
    }
}

/// Parse a property file, surfacing the IO cause on failure.
///
/// Returns the number of targets filled by this call.
pub fn try_parse_prop_file(path: &Path, queries: &mut [PropQuery<'_>]) -> Result<usize> {
    if path.is_dir() {
        return Err(ReleaseFileError::NotAFile(path.to_path_buf()));
    }

    let content = std::fs::read(path).map_err(|source| ReleaseFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_prop_str(&String::from_utf8_lossy(&content), queries))
}

/// Scan property lines from a string.
///
/// Blank lines, `#` comments and lines without `=` are skipped. The first
/// occurrence of a key wins over later duplicates.
pub fn parse_prop_str(content: &str, queries: &mut [PropQuery<'_>]) -> usize {
    let mut filled = 0;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line
            .strip_prefix("export ")
            .map(str::trim_start)
            .unwrap_or(line);

        let Some((lhs, rhs)) = line.split_once('=') else {
            continue;
        };
        let key = lhs.trim();

        if let Some(query) = queries.iter_mut().find(|q| q.key == key) {
            if !query.target.is_empty() {
                continue;
            }
            let value = unquote(rhs.trim());
            if !value.is_empty() {
                *query.target = value;
                filled += 1;
            }
        }
    }

    filled
}

/// Strip shell quoting from a value.
///
/// Double-quoted values honour the escapes os-release permits
/// (`\"`, `\\`, `` \` ``, `\$`); single-quoted values are taken verbatim.
pub fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == b'\'' && last == b'\'' {
            return value[1..value.len() - 1].to_string();
        }
        if first == b'"' && last == b'"' {
            return unescape_double_quoted(&value[1..value.len() - 1]);
        }
    }
    value.to_string()
}

fn unescape_double_quoted(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next) if matches!(next, '"' | '\\' | '`' | '$') => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_os_release_style() {
        let mut id = String::new();
        let mut pretty = String::new();
        let content = "NAME=\"Ubuntu\"\nID=ubuntu\nPRETTY_NAME=\"Ubuntu 22.04.3 LTS\"\n";

        let filled = parse_prop_str(
            content,
            &mut [
                PropQuery::new("ID", &mut id),
                PropQuery::new("PRETTY_NAME", &mut pretty),
            ],
        );

        assert_eq!(filled, 2);
        assert_eq!(id, "ubuntu");
        assert_eq!(pretty, "Ubuntu 22.04.3 LTS");
    }

    #[test]
    fn test_parse_spaced_assignment() {
        let mut id = String::new();
        let mut release = String::new();
        let content = "DISTRIB_ID = Arch\nDISTRIB_RELEASE =rolling\n";

        parse_prop_str(
            content,
            &mut [
                PropQuery::new("DISTRIB_ID", &mut id),
                PropQuery::new("DISTRIB_RELEASE", &mut release),
            ],
        );

        assert_eq!(id, "Arch");
        assert_eq!(release, "rolling");
    }

    #[test]
    fn test_existing_target_is_not_overwritten() {
        let mut id = "fedora".to_string();
        let filled = parse_prop_str("ID=rhel\n", &mut [PropQuery::new("ID", &mut id)]);

        assert_eq!(filled, 0);
        assert_eq!(id, "fedora");
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut id = String::new();
        parse_prop_str("ID=first\nID=second\n", &mut [PropQuery::new("ID", &mut id)]);
        assert_eq!(id, "first");
    }

    #[test]
    fn test_skips_comments_and_malformed_lines() {
        let mut id = String::new();
        let content = "# ID=commented\nthis line is garbage\n\n  ID=arch  \n";

        parse_prop_str(content, &mut [PropQuery::new("ID", &mut id)]);
        assert_eq!(id, "arch");
    }

    #[test]
    fn test_key_prefix_does_not_match() {
        let mut version = String::new();
        parse_prop_str(
            "VERSION_ID=22.04\n",
            &mut [PropQuery::new("VERSION", &mut version)],
        );
        assert!(version.is_empty());
    }

    #[test]
    fn test_export_prefix_tolerated() {
        let mut id = String::new();
        parse_prop_str("export ID=nixos\n", &mut [PropQuery::new("ID", &mut id)]);
        assert_eq!(id, "nixos");
    }

    #[test]
    fn test_unquote_variants() {
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("'single \"kept\"'"), "single \"kept\"");
        assert_eq!(unquote(r#""a \"b\" \$c \\d""#), r#"a "b" $c \d"#);
        assert_eq!(unquote(r#""keep \n""#), r#"keep \n"#);
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote(""), "");
    }

    #[test]
    fn test_missing_file_returns_false() {
        let dir = tempdir().unwrap();
        let mut id = String::new();

        let found = parse_prop_file(
            &dir.path().join("os-release"),
            &mut [PropQuery::new("ID", &mut id)],
        );

        assert!(!found);
        assert!(id.is_empty());
    }

    #[test]
    fn test_try_parse_reports_not_found() {
        let dir = tempdir().unwrap();
        let err = try_parse_prop_file(&dir.path().join("missing"), &mut []).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        let err = try_parse_prop_file(dir.path(), &mut []).unwrap_err();
        assert!(matches!(err, ReleaseFileError::NotAFile(_)));
    }

    #[test]
    fn test_existing_file_without_matches_returns_true() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("os-release");
        std::fs::write(&path, "HOME_URL=https://example.org\n").unwrap();

        let mut id = String::new();
        assert!(parse_prop_file(&path, &mut [PropQuery::new("ID", &mut id)]));
        assert!(id.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("os-release");
        std::fs::write(&path, b"ID=arch\nNAME=\xff\xfe\n").unwrap();

        let mut id = String::new();
        let mut name = String::new();
        let filled = try_parse_prop_file(
            &path,
            &mut [PropQuery::new("ID", &mut id), PropQuery::new("NAME", &mut name)],
        )
        .unwrap();

        assert_eq!(filled, 2);
        assert_eq!(id, "arch");
        assert_eq!(name, "\u{fffd}\u{fffd}");
    }
}
