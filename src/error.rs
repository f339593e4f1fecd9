use std::path::PathBuf;

use thiserror::Error;

/// Failures of the post-compile step. Missing inputs and missing class
/// files are not errors; see [`StepOutcome`](crate::post_compile::StepOutcome).
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The directory holding a primary artifact could not be enumerated.
    #[error("failed to list artifact directory {}", path.display())]
    DirectoryListing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest (or its parent directories) could not be written.
    #[error("failed to write manifest {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read manifest {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid release id `{value}`: {reason}")]
    InvalidReleaseId { value: String, reason: String },
}

pub type Result<T, E = ManifestError> = std::result::Result<T, E>;
