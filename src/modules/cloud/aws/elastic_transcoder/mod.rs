//! AWS Elastic Transcoder pipelines and presets.
//!
//! ## Modules
//!
//! - [`ElasticTranscoderPipelineModule`] (`aws_elastictranscoder_pipeline`)
//! - [`ElasticTranscoderPresetModule`] (`aws_elastictranscoder_preset`)
//!
//! Both take the same reserved parameters; everything else is the resource's
//! configuration and unknown keys are rejected.
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `state` | No | Desired state: present, absent (default: present) |
//! | `id` | No | Id of an existing resource (default: looked up by name) |
//! | `region` | No | AWS region (default: from environment/config) |
//!
//! ### Example
//!
//! ```yaml
//! - name: Media pipeline
//!   aws_elastictranscoder_pipeline:
//!     name: media
//!     input_bucket: uploads
//!     output_bucket: transcoded
//!     role: arn:aws:iam::123456789012:role/transcoder
//!     notifications:
//!       error: arn:aws:sns:us-east-1:123456789012:transcode-errors
//!
//! - name: 720p web preset
//!   aws_elastictranscoder_preset:
//!     name: web-720p
//!     container: mp4
//!     audio:
//!       codec: AAC
//!       bitrate: 128
//!       channels: 2
//!       sample_rate: 44100
//!     video:
//!       codec: H.264
//!       codec_options:
//!         Profile: main
//!       max_width: 1280
//!       max_height: 720
//! ```

pub mod api;
pub mod convert;
pub mod pipeline;
pub mod preset;
pub mod types;

pub use api::{
    ApiError, ApiResult, SdkTranscoderClient, TranscoderApi, UpdatePresetInput,
    UpdatePresetOutput,
};
pub use pipeline::{ElasticTranscoderPipelineModule, PipelineResource};
pub use preset::{ElasticTranscoderPresetModule, PresetResource};
pub use types::{PipelineAttribute, PipelineConfig, PresetAttribute, PresetConfig};

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::modules::{
    Diff, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt,
};
use crate::resource::{reconcile, Action, DesiredState, ResourceData};
use crate::traits::{Resource, ResourceConfig};

/// Parameters that steer the module rather than describe the resource.
pub const RESERVED_PARAMS: &[&str] = &["state", "id", "region"];

/// A parsed module invocation.
#[derive(Debug, Clone)]
pub(crate) struct Task<C: ResourceConfig> {
    pub desired: DesiredState,
    pub data: ResourceData<C>,
    pub region: Option<String>,
}

impl<C: ResourceConfig> Task<C> {
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let desired = match params.get_string("state")? {
            Some(s) => s.parse()?,
            None => DesiredState::default(),
        };

        let mut data = ResourceData::new(params.get_typed::<C>(RESERVED_PARAMS)?.normalized());
        if let Some(id) = params.get_string("id")? {
            data.set_id(id);
        }

        Ok(Self {
            desired,
            data,
            region: params.get_string("region")?,
        })
    }

    /// Parameter checks that need no remote call.
    pub fn validate(&self) -> ModuleResult<()> {
        if self.desired == DesiredState::Present {
            self.data.config().validate()?;
        }
        Ok(())
    }
}

/// Wrap an API error with what was being done to which resource.
pub(crate) fn api_error(operation: &'static str, resource: String, source: ApiError) -> ModuleError {
    ModuleError::ApiCall {
        operation,
        resource,
        source,
    }
}

/// The client from the context, or an SDK client for the task's region.
pub(crate) async fn client_for(
    region: Option<&str>,
    context: &ModuleContext,
) -> Arc<dyn TranscoderApi> {
    if let Some(client) = &context.client {
        return Arc::clone(client);
    }
    let region = region.or(context.region.as_deref());
    Arc::new(SdkTranscoderClient::from_region(region).await)
}

/// Run an async module body to completion from the synchronous `Module` API.
pub(crate) fn block_on<F, T>(future: F) -> ModuleResult<T>
where
    F: Future<Output = ModuleResult<T>> + Send,
    T: Send,
{
    let handle = tokio::runtime::Handle::try_current()
        .map_err(|_| ModuleError::ExecutionFailed("No tokio runtime available".to_string()))?;

    std::thread::scope(|s| {
        s.spawn(move || handle.block_on(future))
            .join()
            .unwrap_or_else(|_| {
                Err(ModuleError::ExecutionFailed(
                    "Module execution panicked".to_string(),
                ))
            })
    })
}

fn to_yaml<C: Serialize>(value: Option<&C>) -> ModuleResult<String> {
    match value {
        Some(v) => serde_yaml::to_string(v).map_err(|e| ModuleError::ParseError(e.to_string())),
        None => Ok(String::new()),
    }
}

fn join_attributes<A: std::fmt::Display>(attributes: &[A]) -> String {
    attributes
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reconcile one resource and describe the result as module output.
pub(crate) async fn run_task<R: Resource>(
    resource: &R,
    task: Task<R::Config>,
    context: &ModuleContext,
) -> ModuleResult<ModuleOutput> {
    let Task {
        desired, mut data, ..
    } = task;
    let outcome = reconcile(resource, &mut data, desired, context.check_mode).await?;

    let label = format!(
        "{} '{}'",
        resource.type_name(),
        data.config().resource_name()
    );
    let msg = match (&outcome.action, context.check_mode) {
        (Action::Created, false) => format!("Created {}", label),
        (Action::Created, true) => format!("Would create {}", label),
        (Action::Updated(attrs), false) => {
            format!("Updated {} ({})", label, join_attributes(attrs))
        }
        (Action::Updated(attrs), true) => {
            format!("Would update {} ({})", label, join_attributes(attrs))
        }
        (Action::Deleted, false) => format!("Deleted {}", label),
        (Action::Deleted, true) => format!("Would delete {}", label),
        (Action::Unchanged, _) => format!("{} is up to date", label),
        (Action::Absent, _) => format!("{} does not exist", label),
    };

    let mut output = if outcome.action.changed() {
        ModuleOutput::changed(msg)
    } else {
        ModuleOutput::ok(msg)
    };

    if let Some(id) = data.id() {
        output = output.with_data("id", serde_json::json!(id));
    }
    if let Some(state) = data.state() {
        let state =
            serde_json::to_value(state).map_err(|e| ModuleError::ParseError(e.to_string()))?;
        if let Some(arn) = state.get("arn").cloned() {
            output = output.with_data("arn", arn);
        }
        output = output.with_data("state", state);
    }
    if !data.warnings().is_empty() {
        output = output.with_data("warnings", serde_json::json!(data.warnings()));
    }

    if context.diff_mode {
        let after = match &outcome.action {
            Action::Deleted | Action::Absent => String::new(),
            _ if context.check_mode => to_yaml(Some(data.config()))?,
            _ => to_yaml(data.state())?,
        };
        let mut diff = Diff::new(to_yaml(outcome.before.as_ref())?, after);
        if let Action::Updated(attrs) = &outcome.action {
            diff = diff.with_details(format!("changed: {}", join_attributes(attrs)));
        }
        output = output.with_diff(diff);
    }

    Ok(output)
}
