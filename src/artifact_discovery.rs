use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ManifestError, Result};
use crate::manifest::GeneratedClassNames;
use crate::name_mapping::{
    nested_type_stem, source_id_to_type_name, split_type_name, type_name_to_physical_path,
};

/// Finds the compiled classes under an output root that belong to
/// generated sources.
pub struct ArtifactDiscovery {
    output_dir: PathBuf,
}

/// A generated source whose primary class exists on disk.
#[derive(Debug, Clone)]
pub struct DiscoveredArtifact {
    pub type_name: String,
    pub artifact_path: PathBuf,
}

impl ArtifactDiscovery {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Collects the primary class of every generated source that was
    /// compiled, plus the nested classes the compiler emitted next to it.
    ///
    /// Sources without a class file (interfaces folded away, sources the
    /// compiler skipped) contribute nothing.
    pub fn discover_generated_classes<S: AsRef<str>>(
        &self,
        generated_files: &[S],
    ) -> Result<GeneratedClassNames> {
        let mut class_names = GeneratedClassNames::new();

        for generated_file in generated_files {
            let generated_file = generated_file.as_ref();
            let Some(artifact) = self.find_primary_artifact(generated_file) else {
                debug!(source = generated_file, "no compiled class, skipping");
                continue;
            };

            debug!(
                source = generated_file,
                class = %artifact.type_name,
                "found generated class"
            );
            let nested = self.find_nested_types(&artifact)?;
            class_names.insert(artifact.type_name);
            class_names.extend(nested);
        }

        Ok(class_names)
    }

    /// Resolves a generated source id to its class file, if it exists.
    pub fn find_primary_artifact(&self, generated_file: &str) -> Option<DiscoveredArtifact> {
        let type_name = source_id_to_type_name(generated_file);
        let artifact_path = self.output_dir.join(type_name_to_physical_path(&type_name));

        artifact_path.exists().then_some(DiscoveredArtifact {
            type_name,
            artifact_path,
        })
    }

    /// Lists the artifact's directory (not recursively) for classes named
    /// `<Simple>$...`, which the compiler emits for nested and anonymous types.
    pub fn find_nested_types(&self, artifact: &DiscoveredArtifact) -> Result<Vec<String>> {
        let package_dir = artifact
            .artifact_path
            .parent()
            .unwrap_or(self.output_dir.as_path());
        let (package, simple_name) = split_type_name(&artifact.type_name);

        let listing_error = |source: std::io::Error| ManifestError::DirectoryListing {
            path: package_dir.to_path_buf(),
            source,
        };

        let mut nested = Vec::new();
        for entry in fs::read_dir(package_dir).map_err(listing_error)? {
            let entry = entry.map_err(listing_error)?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };

            if let Some(stem) = nested_type_stem(file_name, simple_name) {
                let nested_name = match package {
                    Some(package) => format!("{}.{}", package, stem),
                    None => stem.to_string(),
                };
                debug!(class = %nested_name, "found nested class");
                nested.push(nested_name);
            }
        }

        Ok(nested)
    }
}
