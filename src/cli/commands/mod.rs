//! Subcommands module for the transcoder-iac CLI

pub mod apply;
pub mod destroy;
pub mod plan;
pub mod validate;

use crate::cli::output::OutputFormatter;
use crate::config::Config;
use std::path::Path;
use transcoder_iac::manifest::Manifest;
use transcoder_iac::modules::{ModuleContext, ModuleRegistry};

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Check mode (dry-run)
    pub check_mode: bool,
    /// Diff mode
    pub diff_mode: bool,
    /// Region given on the command line
    pub region: Option<String>,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Config) -> Self {
        let use_color = !cli.no_color && config.colors.enabled;
        let output = OutputFormatter::new(use_color, cli.is_json(), cli.verbosity());
        let diff_mode = cli.diff_mode || config.defaults.diff;

        Self {
            config,
            output,
            check_mode: cli.check_mode,
            diff_mode,
            region: cli.region.clone(),
        }
    }

    /// Region for tasks that do not set one; the command line wins over config
    pub fn region(&self) -> Option<&str> {
        self.region
            .as_deref()
            .or(self.config.defaults.region.as_deref())
    }

    /// Module context for the current flags
    pub fn module_context(&self) -> ModuleContext {
        let context = ModuleContext::new()
            .with_check_mode(self.check_mode)
            .with_diff_mode(self.diff_mode);
        match self.region() {
            Some(region) => context.with_region(region),
            None => context,
        }
    }

    /// Registry with every built-in module
    pub fn registry(&self) -> ModuleRegistry {
        ModuleRegistry::with_builtins()
    }

    /// Load and validate a manifest, reporting failures through the formatter.
    ///
    /// Returns the exit code to use when the manifest is unusable.
    pub fn load_manifest(&self, path: &Path) -> Result<Manifest, i32> {
        let manifest = Manifest::from_file(path).map_err(|e| {
            self.output.error(&e.to_string());
            e.exit_code()
        })?;

        manifest.validate(&self.registry()).map_err(|e| {
            self.output.error(&e.to_string());
            e.exit_code()
        })?;

        Ok(manifest)
    }
}
