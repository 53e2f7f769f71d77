//! Sidecar file naming
//!
//! Object names double as sidecar file names (`<name>.obj`). The default policy
//! uses them verbatim; the hardened policies reject or percent-encode names that
//! are not safe as a single path component.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

/// Extension of mesh sidecar files
pub const SIDECAR_EXTENSION: &str = "obj";

/// Characters that are unsafe in a file name on at least one mainstream platform
const RESERVED: &[char] = &['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Object name {0:?} is not a safe file name")]
pub struct UnsafeName(pub String);

/// How sidecar file names are derived from object names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilenamePolicy {
    /// Use the object name as-is
    #[default]
    Verbatim,
    /// Fail the export on path-unsafe names
    Reject,
    /// Replace path-unsafe bytes with `%XX`
    PercentEncode,
}

fn is_unsafe_char(c: char) -> bool {
    c.is_control() || RESERVED.contains(&c)
}

fn is_dot_name(name: &str) -> bool {
    name == "." || name == ".."
}

impl FilenamePolicy {
    /// Sidecar file name for an object, e.g. `Cube.obj`
    pub fn file_name(self, object_name: &str) -> Result<String, UnsafeName> {
        let stem = match self {
            Self::Verbatim => object_name.to_string(),
            Self::Reject => {
                if object_name.is_empty()
                    || is_dot_name(object_name)
                    || object_name.chars().any(is_unsafe_char)
                {
                    return Err(UnsafeName(object_name.to_string()));
                }
                object_name.to_string()
            }
            Self::PercentEncode => percent_encode(object_name),
        };
        Ok(format!("{}.{}", stem, SIDECAR_EXTENSION))
    }
}

fn percent_encode(name: &str) -> String {
    let encode_all = is_dot_name(name);
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if encode_all || c == '%' || is_unsafe_char(c) {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{:02X}", b);
            }
        } else {
            out.push(c);
        }
    }
    out
}
