use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::post_compile::StepInputs;
use crate::release::ReleaseId;

/// Values the code generation step hands over to the post-compile step.
///
/// The generator writes this as JSON once it has emitted its sources; every
/// field is optional because the generator may have had nothing to do.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_id: Option<ReleaseId>,
}

impl BuildContext {
    /// Loads a context file. A file that does not exist yields an empty
    /// context, which makes the post-compile step a no-op.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read build context {}", path.display()));
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse build context JSON from {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create context directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize build context to JSON")?;

        fs::write(path, json)
            .with_context(|| format!("Failed to write build context to {}", path.display()))
    }

    /// Explicit values take precedence over what the context file holds.
    pub fn into_inputs(
        self,
        generated_files: Vec<String>,
        release_id: Option<ReleaseId>,
    ) -> StepInputs {
        StepInputs {
            generated_files: if generated_files.is_empty() {
                self.generated_files
            } else {
                Some(generated_files)
            },
            release_id: release_id.or(self.release_id),
        }
    }
}
