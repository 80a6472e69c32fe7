//! Validate command
//!
//! Parses a manifest and checks every task's parameters. Makes no network
//! calls.

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to the manifest file
    #[arg(required = true)]
    pub manifest: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        ctx.output.banner("MANIFEST VALIDATION");
        ctx.output
            .info(&format!("Validating: {}", self.manifest.display()));

        let manifest = match ctx.load_manifest(&self.manifest) {
            Ok(manifest) => manifest,
            Err(code) => return Ok(code),
        };

        for task in &manifest.tasks {
            ctx.output
                .info(&format!("ok: {} ({})", task.name, task.module));
        }
        ctx.output.success(&format!(
            "{}: {} task(s) valid",
            self.manifest.display(),
            manifest.tasks.len()
        ));

        Ok(0)
    }
}
