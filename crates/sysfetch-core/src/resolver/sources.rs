//! Dialect bindings from release-file keys to [`IdentityRecord`] fields.

use crate::identity::IdentityRecord;
use crate::metrics::METRICS;
use release_file::{parse_prop_file, PropQuery};
use std::path::Path;

/// Parse an `lsb-release` style file (`DISTRIB_*` keys).
///
/// Returns whether the file could be read. Only empty fields are filled.
pub fn parse_lsb_release(path: &Path, record: &mut IdentityRecord) -> bool {
    let found = parse_prop_file(
        path,
        &mut [
            PropQuery::new("DISTRIB_ID", &mut record.id),
            PropQuery::new("DISTRIB_DESCRIPTION", &mut record.pretty_name),
            PropQuery::new("DISTRIB_RELEASE", &mut record.version),
            PropQuery::new("DISTRIB_CODENAME", &mut record.codename),
        ],
    );
    if found {
        METRICS.inc_sources_read();
    }
    found
}

/// Parse an `os-release` style file.
///
/// Returns whether the file could be read. Only empty fields are filled.
pub fn parse_os_release(path: &Path, record: &mut IdentityRecord) -> bool {
    let found = parse_prop_file(
        path,
        &mut [
            PropQuery::new("PRETTY_NAME", &mut record.pretty_name),
            PropQuery::new("NAME", &mut record.name),
            PropQuery::new("ID", &mut record.id),
            PropQuery::new("ID_LIKE", &mut record.id_like),
            PropQuery::new("VARIANT", &mut record.variant),
            PropQuery::new("VARIANT_ID", &mut record.variant_id),
            PropQuery::new("VERSION", &mut record.version),
            PropQuery::new("VERSION_ID", &mut record.version_id),
            PropQuery::new("VERSION_CODENAME", &mut record.codename),
            PropQuery::new("BUILD_ID", &mut record.build_id),
        ],
    );
    if found {
        METRICS.inc_sources_read();
    }
    found
}
