use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::artifact_discovery::ArtifactDiscovery;
use crate::error::Result;
use crate::manifest::ManifestWriter;
use crate::release::ReleaseId;

/// What the build lifecycle handed over to this step.
#[derive(Debug, Clone, Default)]
pub struct StepInputs {
    pub generated_files: Option<Vec<String>>,
    pub release_id: Option<ReleaseId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoGeneratedFiles,
    NoReleaseId,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoGeneratedFiles => "no generated files were recorded",
            SkipReason::NoReleaseId => "no release id was recorded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing to do; no manifest was touched.
    Skipped(SkipReason),
    /// The manifest was (re)written. An empty class set still produces an
    /// empty manifest so a stale one never survives.
    Written { path: PathBuf, entries: usize },
}

/// Discovers generated classes and writes the manifest. Failures are
/// returned as-is; whether they stop the build is up to the caller.
pub struct PostCompileStep {
    discovery: ArtifactDiscovery,
    writer: ManifestWriter,
}

impl PostCompileStep {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        let output_dir = output_dir.as_ref();
        Self {
            discovery: ArtifactDiscovery::new(output_dir),
            writer: ManifestWriter::new(output_dir),
        }
    }

    pub fn execute(&self, inputs: &StepInputs) -> Result<StepOutcome> {
        let generated_files = match inputs.generated_files.as_deref() {
            Some(files) if !files.is_empty() => files,
            _ => return Ok(StepOutcome::Skipped(SkipReason::NoGeneratedFiles)),
        };
        let Some(release_id) = inputs.release_id.as_ref() else {
            return Ok(StepOutcome::Skipped(SkipReason::NoReleaseId));
        };

        info!(
            release = %release_id,
            output_dir = %self.discovery.output_dir().display(),
            sources = generated_files.len(),
            "collecting generated classes"
        );
        debug!(?generated_files);

        let class_names = self.discovery.discover_generated_classes(generated_files)?;
        let path = self.writer.write_manifest(release_id, &class_names)?;

        Ok(StepOutcome::Written {
            path,
            entries: class_names.len(),
        })
    }
}
