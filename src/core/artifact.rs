//! Publish coordinates, artifacts and receipts.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::util::hash::sha256_bytes;

/// Prefix of every content fingerprint.
pub const FINGERPRINT_ALGORITHM: &str = "sha256";

/// Where an artifact lives in the repository: `{namespace}/{name}/{version}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinates {
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl Coordinates {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let coordinates = Coordinates {
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
        };
        coordinates.validate()?;
        Ok(coordinates)
    }

    fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("namespace", &self.namespace),
            ("name", &self.name),
            ("version", &self.version),
        ] {
            if value.trim().is_empty() {
                bail!("artifact {} must not be empty", label);
            }
            if value.contains(['/', '\\', '?', '#', ' ']) {
                bail!("artifact {} `{}` contains a reserved character", label, value);
            }
            if value == "." || value == ".." {
                bail!("artifact {} must not be `{}`", label, value);
            }
        }
        Ok(())
    }

    /// Repository-relative path of the artifact.
    pub fn path(&self) -> String {
        format!("artifacts/{}/{}/{}", self.namespace, self.name, self.version)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.name, self.version)
    }
}

impl FromStr for Coordinates {
    type Err = anyhow::Error;

    /// Parse `namespace:name:version`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [namespace, name, version] => Coordinates::new(*namespace, *name, *version),
            _ => bail!(
                "invalid artifact coordinates `{}`: expected namespace:name:version",
                s
            ),
        }
    }
}

/// A serialized metadata document ready for transmission.
///
/// Never mutated after creation; a changed document is a new artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishArtifact {
    coordinates: Coordinates,
    document: Vec<u8>,
    fingerprint: String,
}

impl PublishArtifact {
    pub fn new(coordinates: Coordinates, document: Vec<u8>) -> Self {
        let fingerprint = fingerprint_of(&document);
        PublishArtifact {
            coordinates,
            document,
            fingerprint,
        }
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn document(&self) -> &[u8] {
        &self.document
    }

    /// `sha256:<hex>` of the document bytes.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Content fingerprint of a document.
pub fn fingerprint_of(document: &[u8]) -> String {
    format!("{}:{}", FINGERPRINT_ALGORITHM, sha256_bytes(document))
}

/// How a publish call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// The document was uploaded.
    Created,
    /// The repository already held a document with the same fingerprint.
    Unchanged,
}

/// Proof of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub coordinates: Coordinates,
    pub fingerprint: String,
    pub location: Url,
    pub status: ReceiptStatus,
    /// Requests sent, retries included.
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_parse() {
        let coordinates: Coordinates = "com.acme:acme-server:1.0.0".parse().unwrap();
        assert_eq!(coordinates.namespace, "com.acme");
        assert_eq!(coordinates.name, "acme-server");
        assert_eq!(coordinates.version, "1.0.0");
        assert_eq!(coordinates.to_string(), "com.acme:acme-server:1.0.0");
        assert_eq!(coordinates.path(), "artifacts/com.acme/acme-server/1.0.0");
    }

    #[test]
    fn test_coordinates_reject_bad_input() {
        assert!("com.acme:acme".parse::<Coordinates>().is_err());
        assert!("com.acme::1.0".parse::<Coordinates>().is_err());
        assert!("com/acme:acme:1.0".parse::<Coordinates>().is_err());
    }

    #[test]
    fn test_coordinates_reject_dot_segments() {
        assert!("..:acme:1.0".parse::<Coordinates>().is_err());
        assert!("com.acme:.:1.0".parse::<Coordinates>().is_err());
        assert!(Coordinates::new("com.acme", "acme", "..").is_err());
        assert!("com.acme:acme:1.0..2".parse::<Coordinates>().is_ok());
    }

    #[test]
    fn test_artifact_fingerprint() {
        let coordinates: Coordinates = "a:b:1".parse().unwrap();
        let artifact = PublishArtifact::new(coordinates, b"hello".to_vec());
        assert_eq!(
            artifact.fingerprint(),
            "sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
