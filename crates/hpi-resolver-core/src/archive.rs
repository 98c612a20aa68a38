//! Read-only access to plugin archives (`.hpi` / `.jpi` are plain jars)

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use zip::ZipArchive;

use crate::error::{ResolverError, Result};
use crate::manifest::{parse_manifest, ManifestAttributes, MANIFEST_PATH};

/// Largest manifest accepted; real plugin manifests are a few KiB
pub const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

/// An open plugin archive.
///
/// The underlying file handle is released when the value is dropped, so a
/// `PluginArchive` should live no longer than the query it answers.
pub struct PluginArchive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl PluginArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let zip = ZipArchive::new(BufReader::new(file)).map_err(|e| open_error(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    /// Stored modification time of the manifest entry.
    ///
    /// Jar timestamps are DOS date/time without a zone; they are read as UTC.
    pub fn manifest_timestamp(&mut self) -> Result<DateTime<Utc>> {
        let entry = self
            .zip
            .by_name(MANIFEST_PATH)
            .map_err(|e| entry_error(&self.path, e))?;
        let modified = entry.last_modified().ok_or_else(|| {
            ResolverError::io(
                format!("Failed to open {}", self.path.display()),
                format!("{} has no modification time", MANIFEST_PATH),
            )
        })?;

        NaiveDate::from_ymd_opt(
            i32::from(modified.year()),
            u32::from(modified.month()),
            u32::from(modified.day()),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(modified.hour()),
                u32::from(modified.minute()),
                u32::from(modified.second()),
            )
        })
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            ResolverError::io(
                format!("Failed to open {}", self.path.display()),
                format!("{} has an invalid modification time", MANIFEST_PATH),
            )
        })
    }

    /// Raw manifest bytes.
    ///
    /// The size declared in the archive header is not trusted; reading stops
    /// one byte past `MAX_MANIFEST_BYTES`.
    pub fn manifest_bytes(&mut self) -> Result<Vec<u8>> {
        let entry = self
            .zip
            .by_name(MANIFEST_PATH)
            .map_err(|e| entry_error(&self.path, e))?;
        let mut bytes = Vec::new();
        entry
            .take(MAX_MANIFEST_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| entry_error(&self.path, e))?;
        if bytes.len() as u64 > MAX_MANIFEST_BYTES {
            return Err(entry_error(
                &self.path,
                format!("manifest exceeds {} bytes", MAX_MANIFEST_BYTES),
            ));
        }
        Ok(bytes)
    }

    pub fn manifest_attributes(&mut self) -> Result<ManifestAttributes> {
        let bytes = self.manifest_bytes()?;
        parse_manifest(&bytes)
            .map_err(|e| ResolverError::io(format!("Failed to open {}", self.path.display()), e))
    }
}

fn open_error(path: &Path, err: impl Into<crate::error::BoxError>) -> ResolverError {
    ResolverError::io(format!("Failed to open {}", path.display()), err)
}

fn entry_error(path: &Path, err: impl Into<crate::error::BoxError>) -> ResolverError {
    ResolverError::io(
        format!("Failed to read {} in {}", MANIFEST_PATH, path.display()),
        err,
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;
    use std::path::Path;

    use zip::write::SimpleFileOptions;
    use zip::{DateTime, ZipWriter};

    use crate::manifest::ManifestAttributes;

    /// Render attributes in manifest form
    pub fn write_manifest(attributes: &ManifestAttributes) -> String {
        let mut out = String::from("Manifest-Version: 1.0\r\n");
        for (name, value) in attributes {
            if name == "Manifest-Version" {
                continue;
            }
            out.push_str(&format!("{}: {}\r\n", name, value));
        }
        out.push_str("\r\n");
        out
    }

    /// Write a minimal plugin jar whose manifest carries `attributes`
    pub fn write_plugin_jar(path: &Path, attributes: &[(&str, &str)], modified: DateTime) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let attributes: ManifestAttributes = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = || SimpleFileOptions::default().last_modified_time(modified);
        zip.start_file("META-INF/MANIFEST.MF", options()).unwrap();
        zip.write_all(write_manifest(&attributes).as_bytes()).unwrap();
        zip.start_file("WEB-INF/lib/plugin.jar", options()).unwrap();
        zip.write_all(b"not really a jar").unwrap();
        zip.finish().unwrap();
    }

    pub fn dos_time(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> DateTime {
        DateTime::from_date_and_time(year, month, day, hour, minute, second).unwrap()
    }
}
