//! Apply command
//!
//! Runs every task of a manifest in order, creating, updating or deleting
//! resources until they match their declarations.

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use transcoder_iac::executor::{Executor, RunMode};

/// Arguments for the apply command
#[derive(Parser, Debug, Clone)]
pub struct ApplyArgs {
    /// Path to the manifest file
    #[arg(required = true)]
    pub manifest: PathBuf,
}

impl ApplyArgs {
    /// Execute the apply command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        if ctx.check_mode {
            ctx.output
                .warning("Running in CHECK MODE - no changes will be made");
        }
        run_manifest(ctx, &self.manifest, RunMode::Apply).await
    }
}

/// Load, validate and run a manifest; returns the process exit code.
pub(crate) async fn run_manifest(
    ctx: &mut CommandContext,
    path: &Path,
    mode: RunMode,
) -> Result<i32> {
    let manifest = match ctx.load_manifest(path) {
        Ok(manifest) => manifest,
        Err(code) => return Ok(code),
    };

    let title = match mode {
        RunMode::Apply => "APPLY",
        RunMode::Destroy => "DESTROY",
    };
    ctx.output.banner(&format!(
        "{}: {}",
        title,
        path.file_name().unwrap_or_default().to_string_lossy()
    ));
    ctx.output
        .info(&format!("{} task(s) loaded", manifest.tasks.len()));

    let executor = Executor::new(ctx.registry(), ctx.module_context());
    let output = &ctx.output;

    // Modules block on the runtime handle; keep this worker out of the scheduler.
    let recap = tokio::task::block_in_place(|| {
        executor.run(&manifest, mode, |outcome| output.task_result(outcome))
    });

    ctx.output.recap(&recap);

    Ok(if recap.has_failures() { 2 } else { 0 })
}
