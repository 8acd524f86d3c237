//! # Identifiers
//!
//! Composite snapshot identifier (`<application-name>/<snapshot-name>`) and
//! application ARN parsing for import.
//!
//! The codec splits on every separator, so a name that itself contains `/`
//! cannot round-trip. Application and snapshot names are restricted to
//! `[0-9A-Za-z_.-]` by validation, which rules that out for managed resources.

use crate::constants::{APPLICATION_ARN_RESOURCE_PREFIX, SNAPSHOT_ID_SEPARATOR};
use crate::error::{Error, Result};

const SNAPSHOT_ID_PATTERN: &str = "application-name/snapshot-name";
const APPLICATION_ARN_PATTERN: &str =
    "arn:partition:kinesisanalytics:region:account:application/application-name";

/// Build the snapshot identifier from its parts
#[must_use]
pub fn snapshot_create_resource_id(application_name: &str, snapshot_name: &str) -> String {
    [application_name, snapshot_name].join(SNAPSHOT_ID_SEPARATOR)
}

/// Split a snapshot identifier into `(application_name, snapshot_name)`
///
/// # Errors
///
/// Fails unless the identifier has exactly two non-empty parts.
pub fn snapshot_parse_resource_id(id: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = id.split(SNAPSHOT_ID_SEPARATOR).collect();

    match parts.as_slice() {
        [application_name, snapshot_name]
            if !application_name.is_empty() && !snapshot_name.is_empty() =>
        {
            Ok(((*application_name).to_string(), (*snapshot_name).to_string()))
        }
        _ => Err(Error::InvalidIdentifier {
            id: id.to_string(),
            expected: SNAPSHOT_ID_PATTERN,
        }),
    }
}

/// Resolve an import identifier to an application name
///
/// Accepts a bare name or an application ARN whose resource part is
/// `application/<name>`.
///
/// # Errors
///
/// Fails when the value looks like an ARN but is not an application ARN.
pub fn application_name_from_import_id(id: &str) -> Result<String> {
    if !id.starts_with("arn:") {
        if id.is_empty() {
            return Err(Error::InvalidIdentifier {
                id: id.to_string(),
                expected: "application name or ARN",
            });
        }
        return Ok(id.to_string());
    }

    let invalid = || Error::InvalidIdentifier {
        id: id.to_string(),
        expected: APPLICATION_ARN_PATTERN,
    };

    // arn:partition:service:region:account:resource
    let fields: Vec<&str> = id.splitn(6, ':').collect();
    let [_, partition, service, _, _, resource] = fields.as_slice() else {
        return Err(invalid());
    };
    if partition.is_empty() || service.is_empty() {
        return Err(invalid());
    }

    match resource.split_once('/') {
        Some((APPLICATION_ARN_RESOURCE_PREFIX, name)) if !name.is_empty() && !name.contains('/') => {
            Ok(name.to_string())
        }
        _ => Err(invalid()),
    }
}
