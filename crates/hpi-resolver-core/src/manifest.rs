//! `META-INF/MANIFEST.MF` codec
//!
//! Only the main section is read. Attribute values are kept as strings;
//! interpreting fields like `Plugin-Version` is left to callers.

use std::collections::BTreeMap;

use crate::error::{ResolverError, Result};

/// Archive entry holding the manifest
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Main manifest attributes, sorted by name
pub type ManifestAttributes = BTreeMap<String, String>;

/// Parse the main section of a manifest.
///
/// Continuation lines start with a single space and extend the previous
/// value. Parsing stops at the first blank line.
pub fn parse_manifest(bytes: &[u8]) -> Result<ManifestAttributes> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut attributes = ManifestAttributes::new();
    let mut current: Option<(String, String)> = None;

    for (idx, line) in split_lines(text).enumerate() {
        if line.is_empty() {
            break;
        }

        if let Some(rest) = line.strip_prefix(' ') {
            match current.as_mut() {
                Some((_, value)) => value.push_str(rest),
                None => return Err(malformed(idx, "continuation line without a header")),
            }
            continue;
        }

        if let Some((name, value)) = current.take() {
            attributes.insert(name, value);
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| malformed(idx, "missing ':' separator"))?;
        if name.is_empty() || !name.chars().all(is_header_char) {
            return Err(malformed(idx, &format!("invalid attribute name '{}'", name)));
        }
        let value = value.strip_prefix(' ').unwrap_or(value);
        current = Some((name.to_string(), value.to_string()));
    }

    if let Some((name, value)) = current {
        attributes.insert(name, value);
    }

    Ok(attributes)
}

fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    // CRLF, LF and lone CR are all valid line endings
    text.split('\n')
        .flat_map(|l| l.strip_suffix('\r').unwrap_or(l).split('\r'))
}

fn is_header_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn malformed(idx: usize, message: &str) -> ResolverError {
    ResolverError::io(
        format!("Malformed manifest at line {}", idx + 1),
        message.to_string(),
    )
}
