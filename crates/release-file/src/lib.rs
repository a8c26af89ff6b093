//! Release-File: KEY=value property file parsing for sysfetch
//!
//! Distribution identity lives in small line-oriented text files
//! (`/etc/lsb-release`, `/etc/os-release`, `/usr/lib/os-release`) and the
//! same shape shows up in toolkit settings (`settings.ini`, `kdeglobals`).
//! This crate scans such files and fills caller-provided targets.
//!
//! ## Contract
//!
//! Callers hand in a path and a list of [`PropQuery`] pairs. A missing or
//! unreadable file is never an error at this level: it simply fills nothing.
//! Use [`try_parse_prop_file`] when the IO cause matters.

pub mod error;
pub mod prop;

pub use error::ReleaseFileError;
pub use prop::{parse_prop_file, parse_prop_str, try_parse_prop_file, unquote, PropQuery};

/// Result type for release-file operations
pub type Result<T> = std::result::Result<T, ReleaseFileError>;
