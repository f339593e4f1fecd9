use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ManifestError;

/// Directory (logical form) under which per-module metadata lives in the
/// packaged output.
pub const MANIFEST_DIRECTORY: &str = "META-INF/kie";

pub const MANIFEST_FILE_NAME: &str = "generated-class-names";

/// `groupId:artifactId:version` coordinates of the module being built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseId {
    group_id: String,
    artifact_id: String,
    version: String,
}

impl ReleaseId {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, ManifestError> {
        let release_id = Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        };
        release_id.validate()?;
        Ok(release_id)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Logical (`/`-separated) location of this module's generated class
    /// manifest, relative to the output root. The version is not part of
    /// the path, so every build of the module lands on the same file.
    pub fn manifest_logical_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            MANIFEST_DIRECTORY, self.group_id, self.artifact_id, MANIFEST_FILE_NAME
        )
    }

    fn validate(&self) -> Result<(), ManifestError> {
        let parts = [
            ("groupId", &self.group_id),
            ("artifactId", &self.artifact_id),
            ("version", &self.version),
        ];

        for (label, value) in parts {
            if value.is_empty() {
                return Err(self.invalid(format!("{} is empty", label)));
            }
            // Group and artifact become path segments.
            if label != "version" && (value.contains(['/', '\\']) || value == "." || value == "..") {
                return Err(self.invalid(format!("{} '{}' is not a valid path segment", label, value)));
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: String) -> ManifestError {
        ManifestError::InvalidReleaseId {
            value: self.to_string(),
            reason,
        }
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

impl FromStr for ReleaseId {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [group_id, artifact_id, version] => Self::new(*group_id, *artifact_id, *version),
            _ => Err(ManifestError::InvalidReleaseId {
                value: s.to_string(),
                reason: "expected groupId:artifactId:version".to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ReleaseId {
    type Error = ManifestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReleaseId> for String {
    fn from(release_id: ReleaseId) -> Self {
        release_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_id() {
        let release_id: ReleaseId = "acme:rules:1.0".parse().unwrap();
        assert_eq!(release_id.group_id(), "acme");
        assert_eq!(release_id.artifact_id(), "rules");
        assert_eq!(release_id.version(), "1.0");
        assert_eq!(release_id.to_string(), "acme:rules:1.0");
    }

    #[test]
    fn test_invalid_release_ids() {
        for value in ["", "acme", "acme:rules", "acme:rules:1.0:extra", "acme::1.0", "../x:rules:1.0"] {
            assert!(
                matches!(value.parse::<ReleaseId>(), Err(ManifestError::InvalidReleaseId { .. })),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_manifest_path_ignores_version() {
        let v1: ReleaseId = "acme:rules:1.0".parse().unwrap();
        let v2: ReleaseId = "acme:rules:2.0-SNAPSHOT".parse().unwrap();

        assert_eq!(
            v1.manifest_logical_path(),
            "META-INF/kie/acme/rules/generated-class-names"
        );
        assert_eq!(v1.manifest_logical_path(), v2.manifest_logical_path());
    }

    #[test]
    fn test_serde_as_string() {
        let release_id: ReleaseId = serde_json::from_str("\"org.example:model:0.3\"").unwrap();
        assert_eq!(release_id.group_id(), "org.example");
        assert_eq!(serde_json::to_string(&release_id).unwrap(), "\"org.example:model:0.3\"");
        assert!(serde_json::from_str::<ReleaseId>("\"broken\"").is_err());
    }
}
