use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::build_context::BuildContext;
use crate::manifest::ManifestWriter;
use crate::name_mapping::type_name_to_physical_path;
use crate::post_compile::{PostCompileStep, StepInputs, StepOutcome};
use crate::release::ReleaseId;
use crate::telemetry;

#[derive(Parser)]
#[command(name = "genmanifest")]
#[command(about = "Records which compiled classes were produced from generated sources")]
#[command(version)]
pub struct Cli {
    /// Log per-source discovery details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the generated class manifest after compilation
    PostCompile {
        /// Compiler output directory (classes root)
        #[arg(long, env = "GENMANIFEST_OUTPUT_DIR")]
        output_dir: PathBuf,

        /// Build context JSON left behind by the code generation step
        #[arg(long)]
        context: Option<PathBuf>,

        /// Module coordinates as groupId:artifactId:version (overrides the context)
        #[arg(long)]
        release_id: Option<ReleaseId>,

        /// Generated source path relative to the source root (repeatable, overrides the context)
        #[arg(long = "generated-file")]
        generated_files: Vec<String>,

        /// Fail instead of warning when the manifest cannot be produced
        #[arg(long)]
        strict: bool,
    },

    /// Print the generated class manifest of a module
    Show {
        /// Compiler output directory (classes root)
        #[arg(long, env = "GENMANIFEST_OUTPUT_DIR")]
        output_dir: PathBuf,

        /// Module coordinates as groupId:artifactId:version
        #[arg(long)]
        release_id: ReleaseId,

        /// Report entries whose class file is missing
        #[arg(long)]
        verify: bool,
    },
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    match cli.command {
        Commands::PostCompile {
            output_dir,
            context,
            release_id,
            generated_files,
            strict,
        } => post_compile_command(output_dir, context, release_id, generated_files, strict),
        Commands::Show {
            output_dir,
            release_id,
            verify,
        } => show_command(output_dir, release_id, verify),
    }
}

/// Runs the step as a best-effort enrichment of the build: unless `strict`
/// is set, any failure is logged as a warning and the command succeeds.
pub fn post_compile_command(
    output_dir: PathBuf,
    context: Option<PathBuf>,
    release_id: Option<ReleaseId>,
    generated_files: Vec<String>,
    strict: bool,
) -> Result<()> {
    let result = collect_inputs(context, release_id, generated_files).and_then(|inputs| {
        PostCompileStep::new(&output_dir)
            .execute(&inputs)
            .context("Failed to produce generated class manifest")
    });

    settle_outcome(result, strict)
}

/// Reports what the step did. A failure is only returned in `strict` mode;
/// otherwise it becomes a warning.
fn settle_outcome(result: Result<StepOutcome>, strict: bool) -> Result<()> {
    match result {
        Ok(StepOutcome::Skipped(reason)) => {
            info!("Skipping generated class manifest: {}", reason.as_str());
            Ok(())
        }
        Ok(StepOutcome::Written { path, entries }) => {
            println!("Generated manifest ({} classes): {}", entries, path.display());
            Ok(())
        }
        Err(e) if strict => Err(e),
        Err(e) => {
            warn!(
                "{:#}. This is not critical: the packaged output is still usable without the manifest",
                e
            );
            Ok(())
        }
    }
}

fn collect_inputs(
    context: Option<PathBuf>,
    release_id: Option<ReleaseId>,
    generated_files: Vec<String>,
) -> Result<StepInputs> {
    let build_context = match context {
        Some(path) => BuildContext::load(&path)?,
        None => BuildContext::default(),
    };

    Ok(build_context.into_inputs(generated_files, release_id))
}

fn show_command(output_dir: PathBuf, release_id: ReleaseId, verify: bool) -> Result<()> {
    let writer = ManifestWriter::new(&output_dir);
    let manifest_path = writer.manifest_path(&release_id);

    let class_names = writer
        .read_manifest(&release_id)
        .context("Failed to read generated class manifest")?
        .ok_or_else(|| anyhow::anyhow!("No manifest found at {}", manifest_path.display()))?;

    println!("Manifest: {} ({} classes)", manifest_path.display(), class_names.len());
    for name in class_names.iter() {
        if !verify {
            println!("  {}", name);
        } else if output_dir.join(type_name_to_physical_path(name)).exists() {
            println!("  ✓ {}", name);
        } else {
            println!("  ✗ {} (class file missing)", name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManifestError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_failure_is_downgraded_unless_strict() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("com/acme")).unwrap();
        fs::write(dir.path().join("com/acme/Rules.class"), b"").unwrap();
        // A file where the manifest directory should go makes the write fail.
        fs::write(dir.path().join("META-INF"), b"").unwrap();

        let run = |strict| {
            post_compile_command(
                dir.path().to_path_buf(),
                None,
                Some("acme:rules:1.0".parse().unwrap()),
                vec!["com/acme/Rules.java".to_string()],
                strict,
            )
        };

        assert!(run(false).is_ok());
        assert!(run(true).is_err());
    }

    #[test]
    fn test_listing_failure_is_downgraded_unless_strict() {
        let listing_failure = || -> Result<StepOutcome> {
            Err::<StepOutcome, _>(ManifestError::DirectoryListing {
                path: PathBuf::from("target/classes/org/gen"),
                source: std::io::ErrorKind::PermissionDenied.into(),
            })
            .context("Failed to produce generated class manifest")
        };

        assert!(settle_outcome(listing_failure(), false).is_ok());

        let err = settle_outcome(listing_failure(), true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ManifestError>(),
            Some(ManifestError::DirectoryListing { .. })
        ));
    }

    #[test]
    fn test_unreadable_context_is_downgraded() {
        let dir = TempDir::new().unwrap();
        let context = dir.path().join("build-context.json");
        fs::write(&context, "{ not json").unwrap();

        let run = |strict| {
            post_compile_command(
                dir.path().to_path_buf(),
                Some(context.clone()),
                None,
                Vec::new(),
                strict,
            )
        };

        assert!(run(false).is_ok());
        assert!(run(true).is_err());
    }

    #[test]
    fn test_cli_parses_post_compile() {
        let cli = Cli::try_parse_from([
            "genmanifest",
            "post-compile",
            "--output-dir",
            "target/classes",
            "--release-id",
            "acme:rules:1.0",
            "--generated-file",
            "com/acme/gen/Rules.java",
            "--generated-file",
            "com/acme/gen/Facts.java",
        ])
        .unwrap();

        match cli.command {
            Commands::PostCompile {
                release_id,
                generated_files,
                strict,
                ..
            } => {
                assert_eq!(release_id.unwrap().to_string(), "acme:rules:1.0");
                assert_eq!(generated_files.len(), 2);
                assert!(!strict);
            }
            Commands::Show { .. } => panic!("expected post-compile"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_release_id() {
        let result = Cli::try_parse_from([
            "genmanifest",
            "show",
            "--output-dir",
            "target/classes",
            "--release-id",
            "acme",
        ]);
        assert!(result.is_err());
    }
}
