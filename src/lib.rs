pub mod name_mapping;
pub mod release;
pub mod error;
pub mod artifact_discovery;
pub mod manifest;
pub mod build_context;
pub mod post_compile;
pub mod telemetry;
pub mod cli;

pub use error::ManifestError;
pub use manifest::GeneratedClassNames;
pub use post_compile::{PostCompileStep, StepInputs, StepOutcome};
pub use release::ReleaseId;
