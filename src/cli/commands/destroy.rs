//! Destroy command
//!
//! Runs every task with `state: absent`, last task first.

use super::apply::run_manifest;
use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use transcoder_iac::executor::RunMode;

/// Arguments for the destroy command
#[derive(Parser, Debug, Clone)]
pub struct DestroyArgs {
    /// Path to the manifest file
    #[arg(required = true)]
    pub manifest: PathBuf,
}

impl DestroyArgs {
    /// Execute the destroy command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        if ctx.check_mode {
            ctx.output
                .warning("Running in CHECK MODE - nothing will be deleted");
        }
        run_manifest(ctx, &self.manifest, RunMode::Destroy).await
    }
}
