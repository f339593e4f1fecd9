use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{ManifestError, Result};
use crate::name_mapping::logical_path_to_physical_path;
use crate::release::ReleaseId;

/// Type names (primary and nested) that came out of generated sources.
///
/// Backed by an ordered set so the serialized manifest is identical for
/// identical inputs, regardless of discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedClassNames {
    names: BTreeSet<String>,
}

impl GeneratedClassNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the name was already present.
    pub fn insert(&mut self, type_name: impl Into<String>) -> bool {
        self.names.insert(type_name.into())
    }

    pub fn extend<I, S>(&mut self, type_names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(type_names.into_iter().map(Into::into));
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.names.contains(type_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// One name per line, sorted, each line newline-terminated.
    pub fn to_manifest_content(&self) -> String {
        let mut content = String::new();
        for name in &self.names {
            content.push_str(name);
            content.push('\n');
        }
        content
    }

    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for GeneratedClassNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut names = Self::new();
        names.extend(iter);
        names
    }
}

/// Writes and reads the per-release manifest under an output root.
pub struct ManifestWriter {
    output_dir: PathBuf,
}

impl ManifestWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn manifest_path(&self, release_id: &ReleaseId) -> PathBuf {
        self.output_dir
            .join(logical_path_to_physical_path(&release_id.manifest_logical_path()))
    }

    /// Replaces the manifest for `release_id` with `class_names`.
    ///
    /// The content goes to a temporary file next to the destination and is
    /// renamed into place, so readers see either the old manifest or the new
    /// one in full.
    pub fn write_manifest(
        &self,
        release_id: &ReleaseId,
        class_names: &GeneratedClassNames,
    ) -> Result<PathBuf> {
        let manifest_path = self.manifest_path(release_id);
        let write_error = |source: std::io::Error| ManifestError::Write {
            path: manifest_path.clone(),
            source,
        };

        let manifest_dir = manifest_path
            .parent()
            .ok_or_else(|| write_error(ErrorKind::InvalidInput.into()))?;
        fs::create_dir_all(manifest_dir).map_err(write_error)?;

        let mut tmp = NamedTempFile::new_in(manifest_dir).map_err(write_error)?;
        tmp.write_all(class_names.to_manifest_content().as_bytes())
            .map_err(write_error)?;
        tmp.as_file().sync_all().map_err(write_error)?;
        debug!(tmp = %tmp.path().display(), "manifest content staged");

        tmp.persist(&manifest_path)
            .map_err(|e| write_error(e.error))?;

        info!(
            path = %manifest_path.display(),
            entries = class_names.len(),
            "wrote generated class manifest"
        );

        Ok(manifest_path)
    }

    /// Reads the manifest for `release_id`; `None` if none has been written.
    pub fn read_manifest(&self, release_id: &ReleaseId) -> Result<Option<GeneratedClassNames>> {
        let manifest_path = self.manifest_path(release_id);
        match fs::read_to_string(&manifest_path) {
            Ok(content) => Ok(Some(GeneratedClassNames::parse(&content))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ManifestError::Read {
                path: manifest_path,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn release() -> ReleaseId {
        "acme:rules:1.0".parse().unwrap()
    }

    #[test]
    fn test_content_is_sorted_and_deduplicated() {
        let mut names = GeneratedClassNames::new();
        assert!(names.insert("com.acme.gen.Rules$Inner"));
        assert!(names.insert("com.acme.gen.Rules"));
        assert!(!names.insert("com.acme.gen.Rules"));

        assert_eq!(names.len(), 2);
        assert_eq!(
            names.to_manifest_content(),
            "com.acme.gen.Rules\ncom.acme.gen.Rules$Inner\n"
        );
    }

    #[test]
    fn test_parse_ignores_blank_lines_and_whitespace() {
        let names = GeneratedClassNames::parse("  com.acme.B \n\ncom.acme.A\r\ncom.acme.A\n");
        assert_eq!(names.iter().collect::<Vec<_>>(), vec!["com.acme.A", "com.acme.B"]);
        assert!(GeneratedClassNames::parse("").is_empty());
    }

    #[test]
    fn test_write_creates_directories_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let writer = ManifestWriter::new(dir.path());
        let names: GeneratedClassNames = ["com.acme.gen.Rules", "com.acme.gen.Rules$Inner"]
            .into_iter()
            .collect();

        let path = writer.write_manifest(&release(), &names).unwrap();

        let expected = dir
            .path()
            .join("META-INF")
            .join("kie")
            .join("acme")
            .join("rules")
            .join("generated-class-names");
        assert_eq!(path, expected);
        assert_eq!(writer.read_manifest(&release()).unwrap(), Some(names));
    }

    #[test]
    fn test_write_replaces_previous_manifest() {
        let dir = TempDir::new().unwrap();
        let writer = ManifestWriter::new(dir.path());

        let first: GeneratedClassNames = ["com.acme.Old", "com.acme.Older"].into_iter().collect();
        let second: GeneratedClassNames = ["com.acme.New"].into_iter().collect();
        writer.write_manifest(&release(), &first).unwrap();
        let path = writer.write_manifest(&release(), &second).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "com.acme.New\n");
        // No staging files left behind next to the manifest.
        let siblings = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(siblings, 1);
    }

    #[test]
    fn test_read_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let writer = ManifestWriter::new(dir.path());
        assert_eq!(writer.read_manifest(&release()).unwrap(), None);
    }

    #[test]
    fn test_write_fails_when_directory_is_a_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("META-INF"), "not a directory").unwrap();

        let writer = ManifestWriter::new(dir.path());
        let err = writer
            .write_manifest(&release(), &GeneratedClassNames::new())
            .unwrap_err();
        assert!(matches!(err, ManifestError::Write { .. }));
    }
}
