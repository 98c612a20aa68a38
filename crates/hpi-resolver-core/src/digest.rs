//! SHA-1 content digests
//!
//! Every accessor reports digests as lowercase hex. Base64 is accepted on
//! input so digests recorded by older catalogs can still be compared.

use std::fmt;
use std::io::Read;
use std::path::Path;

use base64::Engine;
use sha1::{Digest, Sha1};

use crate::error::{ResolverError, Result};

/// Read buffer size used when hashing files
const CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha1Digest([u8; 20]);

impl Sha1Digest {
    /// Hash a reader in fixed-size chunks
    pub fn compute<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut hasher = Sha1::new();
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&hasher.finalize());
        Ok(Self(out))
    }

    pub fn compute_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| ResolverError::io(format!("Failed to open {}", path.display()), e))?;
        Self::compute(file)
            .map_err(|e| ResolverError::io(format!("Failed to read {}", path.display()), e))
    }

    pub fn from_hex(value: &str) -> Result<Self> {
        let bytes = hex::decode(value.trim())
            .map_err(|e| ResolverError::io(format!("Invalid hex SHA-1 '{}'", value), e))?;
        Self::from_slice(&bytes, value)
    }

    pub fn from_base64(value: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(value.trim())
            .map_err(|e| ResolverError::io(format!("Invalid base64 SHA-1 '{}'", value), e))?;
        Self::from_slice(&bytes, value)
    }

    /// Accept either encoding: 40 characters is hex, anything else base64
    pub fn parse(value: &str) -> Result<Self> {
        if value.trim().len() == 40 {
            Self::from_hex(value)
        } else {
            Self::from_base64(value)
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.0)
    }

    fn from_slice(bytes: &[u8], original: &str) -> Result<Self> {
        let array: [u8; 20] = bytes.try_into().map_err(|_| {
            ResolverError::io(
                format!("Invalid SHA-1 '{}'", original),
                format!("expected 20 bytes, got {}", bytes.len()),
            )
        })?;
        Ok(Self(array))
    }
}

impl fmt::Display for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_HEX: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";
    const HELLO_B64: &str = "Kq5sNclPz7QV2+lfQIuc6R7oRu0=";

    #[test]
    fn test_compute_known_value() {
        let digest = Sha1Digest::compute(&b"hello world"[..]).unwrap();
        assert_eq!(digest.to_hex(), HELLO_HEX);
        assert_eq!(digest.to_base64(), HELLO_B64);
    }

    #[test]
    fn test_compute_spans_chunks() {
        let data = vec![7u8; CHUNK_SIZE * 3 + 17];
        let chunked = Sha1Digest::compute(&data[..]).unwrap();

        let mut hasher = Sha1::new();
        hasher.update(&data);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hasher.finalize());
        let whole = Sha1Digest(bytes);
        assert_eq!(chunked, whole);
    }

    #[test]
    fn test_hex_and_base64_name_the_same_bytes() {
        assert_eq!(
            Sha1Digest::parse(HELLO_HEX).unwrap(),
            Sha1Digest::parse(HELLO_B64).unwrap()
        );
    }

    #[test]
    fn test_uppercase_hex_normalizes() {
        let digest = Sha1Digest::from_hex(&HELLO_HEX.to_uppercase()).unwrap();
        assert_eq!(digest.to_string(), HELLO_HEX);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(Sha1Digest::from_hex("abcd").is_err());
        assert!(Sha1Digest::parse("not base64!").is_err());
    }
}
