//! Plan command - apply in check and diff mode

use super::apply::run_manifest;
use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use transcoder_iac::executor::RunMode;

/// Arguments for the plan command
#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    /// Path to the manifest file
    #[arg(required = true)]
    pub manifest: PathBuf,
}

impl PlanArgs {
    /// Execute the plan command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        ctx.check_mode = true;
        ctx.diff_mode = true;

        ctx.output.banner("PLAN - DRY RUN");
        ctx.output.warning("No changes will be made to any resource");

        run_manifest(ctx, &self.manifest, RunMode::Apply).await
    }
}
