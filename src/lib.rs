//! # transcoder-iac
//!
//! Declarative provisioning of AWS Elastic Transcoder pipelines and presets.
//!
//! A manifest declares the desired resources; the host layer refreshes each
//! one from the service, diffs the declaration against what exists and
//! issues the create, partial update or delete that closes the gap.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        CLI Interface                          │
//! │            (apply / plan / destroy / validate)                │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │              Manifest + Executor + ModuleRegistry             │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │        reconcile(): refresh, diff, create/update/delete       │
//! │           PipelineResource        PresetResource              │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │     TranscoderApi (SdkTranscoderClient over the AWS SDK)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use transcoder_iac::prelude::*;
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<()> {
//!     let manifest = Manifest::from_file("site.yml")?;
//!     let executor = Executor::new(ModuleRegistry::with_builtins(), ModuleContext::new());
//!     let recap = executor.run(&manifest, RunMode::Apply, |outcome| {
//!         println!("{}: {:?}", outcome.name, outcome.status());
//!     });
//!     assert!(!recap.has_failures());
//!     Ok(())
//! }
//! ```

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Error handling
    pub use crate::error::{Error, Result};

    // Execution
    pub use crate::executor::{Executor, Recap, RunMode, TaskOutcome};
    pub use crate::manifest::{Manifest, Task};

    // Module system
    pub use crate::modules::{
        Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleRegistry,
        ModuleResult, ModuleStatus,
    };

    // Resources
    pub use crate::resource::{reconcile, Action, DesiredState, Reconciliation, ResourceData};
    pub use crate::traits::*;

    #[cfg(feature = "aws")]
    pub use crate::modules::cloud::aws::elastic_transcoder::{
        PipelineConfig, PipelineResource, PresetConfig, PresetResource, SdkTranscoderClient,
        TranscoderApi,
    };
}

/// Error types and result aliases.
pub mod error;

/// Core traits for managed resources.
pub mod traits;

/// Resource records and the reconciliation loop.
pub mod resource;

/// Manifest parsing and validation.
pub mod manifest;

/// Sequential task execution.
pub mod executor;

/// Module system: the `Module` trait, registry and built-in modules.
pub mod modules;

/// Structured logging.
pub mod telemetry;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
