//! Elastic Transcoder pipeline lifecycle and the `aws_elastictranscoder_pipeline` module.
//!
//! ## Parameters
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `name` | Yes | Pipeline name: letters, digits, `.`, `_`, `-`; at most 40 characters |
//! | `input_bucket` | Yes | Bucket holding the source media |
//! | `role` | Yes | IAM role ARN the service assumes |
//! | `output_bucket` | No* | Bucket for transcoded files and thumbnails |
//! | `content_config` | No* | `bucket`, `storage_class`, `permissions` for transcoded files |
//! | `thumbnail_config` | No | `bucket`, `storage_class`, `permissions` for thumbnails |
//! | `notifications` | No | SNS topics: `completed`, `error`, `progressing`, `warning` |
//! | `aws_kms_key_arn` | No | KMS key used for encryption |
//!
//! \* Exactly one of `output_bucket` and `content_config.bucket` must be set.

use async_trait::async_trait;
use aws_sdk_elastictranscoder::operation::create_pipeline::CreatePipelineInput;
use aws_sdk_elastictranscoder::operation::update_pipeline::UpdatePipelineInput;
use aws_sdk_elastictranscoder::types::{PipelineOutputConfig, Warning};
use std::sync::Arc;

use super::api::{ApiError, TranscoderApi};
use super::convert::{
    expand_notifications, expand_output_config, flatten_pipeline, notifications_for_update,
};
use super::types::{OutputConfig, PipelineAttribute, PipelineConfig};
use super::{api_error, block_on, client_for, run_task, Task};
use crate::modules::{Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult};
use crate::resource::ResourceData;
use crate::traits::{Resource, ResourceConfig};

const TYPE_NAME: &str = "Elastic Transcoder pipeline";

fn describe(name: &str) -> String {
    format!("{} '{}'", TYPE_NAME, name)
}

/// Build the CreatePipeline request for a declared pipeline.
pub fn create_input(config: &PipelineConfig) -> ModuleResult<CreatePipelineInput> {
    CreatePipelineInput::builder()
        .name(&config.name)
        .input_bucket(&config.input_bucket)
        .role(&config.role)
        .set_output_bucket(config.output_bucket.clone())
        .set_aws_kms_key_arn(config.aws_kms_key_arn.clone())
        .set_notifications(config.notifications.as_ref().map(expand_notifications))
        .set_content_config(config.content_config.as_ref().map(expand_output_config))
        .set_thumbnail_config(config.thumbnail_config.as_ref().map(expand_output_config))
        .build()
        .map_err(|e| ModuleError::InvalidParameter(e.to_string()))
}

/// An output block pointed at `bucket`, keeping the rest of `block`.
fn retarget(block: Option<&OutputConfig>, bucket: &str) -> PipelineOutputConfig {
    let retargeted = OutputConfig {
        bucket: Some(bucket.to_string()),
        ..block.cloned().unwrap_or_default()
    };
    expand_output_config(&retargeted)
}

/// A declared output block as sent on update. A block without a bucket
/// inherits the pipeline's `output_bucket`.
fn outgoing(block: &OutputConfig, output_bucket: Option<&String>) -> PipelineOutputConfig {
    match (&block.bucket, output_bucket) {
        (None, Some(bucket)) => retarget(Some(block), bucket),
        _ => expand_output_config(block),
    }
}

/// Build an UpdatePipeline request carrying only `changed` attributes.
///
/// The service has no output bucket field on update, so a new
/// `output_bucket` is sent as content and thumbnail configs targeting it.
pub fn update_input(
    id: &str,
    config: &PipelineConfig,
    observed: Option<&PipelineConfig>,
    changed: &[PipelineAttribute],
) -> ModuleResult<UpdatePipelineInput> {
    let mut builder = UpdatePipelineInput::builder().id(id);
    let mut content_config = None;
    let mut thumbnail_config = None;

    if changed.contains(&PipelineAttribute::OutputBucket) {
        if let Some(bucket) = &config.output_bucket {
            let current_content = config
                .content_config
                .as_ref()
                .or_else(|| observed.and_then(|o| o.content_config.as_ref()));
            let current_thumbnails = config
                .thumbnail_config
                .as_ref()
                .or_else(|| observed.and_then(|o| o.thumbnail_config.as_ref()));
            content_config = Some(retarget(current_content, bucket));
            thumbnail_config = Some(retarget(current_thumbnails, bucket));
        }
    }

    for attribute in changed {
        match attribute {
            PipelineAttribute::AwsKmsKeyArn => {
                builder = builder.set_aws_kms_key_arn(config.aws_kms_key_arn.clone());
            }
            PipelineAttribute::ContentConfig => {
                content_config = config
                    .content_config
                    .as_ref()
                    .map(|c| outgoing(c, config.output_bucket.as_ref()));
            }
            PipelineAttribute::InputBucket => {
                builder = builder.input_bucket(&config.input_bucket);
            }
            PipelineAttribute::Name => {
                builder = builder.name(&config.name);
            }
            PipelineAttribute::Notifications => {
                builder =
                    builder.notifications(notifications_for_update(config.notifications.as_ref()));
            }
            PipelineAttribute::OutputBucket => {}
            PipelineAttribute::Role => {
                builder = builder.role(&config.role);
            }
            PipelineAttribute::ThumbnailConfig => {
                thumbnail_config = config
                    .thumbnail_config
                    .as_ref()
                    .map(|c| outgoing(c, config.output_bucket.as_ref()));
            }
        }
    }

    builder
        .set_content_config(content_config)
        .set_thumbnail_config(thumbnail_config)
        .build()
        .map_err(|e| ModuleError::InvalidParameter(e.to_string()))
}

fn record_warnings(data: &mut ResourceData<PipelineConfig>, warnings: &[Warning]) {
    for warning in warnings {
        let code = warning.code().unwrap_or("Warning");
        let message = warning.message().unwrap_or_default();
        tracing::warn!("{} {}: {}", TYPE_NAME, code, message);
        data.add_warning(format!("{}: {}", code, message));
    }
}

/// Pipeline lifecycle over a [`TranscoderApi`].
#[derive(Clone)]
pub struct PipelineResource {
    client: Arc<dyn TranscoderApi>,
}

impl PipelineResource {
    pub fn new(client: Arc<dyn TranscoderApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for PipelineResource {
    type Config = PipelineConfig;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn create(&self, data: &mut ResourceData<PipelineConfig>) -> ModuleResult<()> {
        let config = data.config().clone();
        config.validate()?;

        let input = create_input(&config)?;
        tracing::debug!("{} create input: {:?}", TYPE_NAME, input);

        let resp = self
            .client
            .create_pipeline(input)
            .await
            .map_err(|e| api_error("creating", describe(&config.name), e))?;

        let pipeline = resp.pipeline().ok_or_else(|| {
            api_error(
                "creating",
                describe(&config.name),
                ApiError::MalformedResponse {
                    operation: "CreatePipeline",
                    field: "pipeline",
                },
            )
        })?;
        let id = pipeline.id().ok_or_else(|| {
            api_error(
                "creating",
                describe(&config.name),
                ApiError::MalformedResponse {
                    operation: "CreatePipeline",
                    field: "pipeline id",
                },
            )
        })?;

        data.set_id(id);
        tracing::info!("Created {} ({})", describe(&config.name), id);
        record_warnings(data, resp.warnings());
        data.set_state(flatten_pipeline(pipeline));

        self.update(data).await
    }

    async fn read(&self, data: &mut ResourceData<PipelineConfig>) -> ModuleResult<()> {
        let id = data.require_id("read")?.to_string();
        let name = data.config().name.clone();

        let resp = match self.client.read_pipeline(&id).await {
            Ok(resp) => resp,
            Err(e) if e.is_not_found() => {
                tracing::info!("{} {} not found, removing from state", TYPE_NAME, id);
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(api_error("reading", describe(&name), e)),
        };
        tracing::debug!("{} read response: {:?}", TYPE_NAME, resp);

        let pipeline = resp.pipeline().ok_or_else(|| {
            api_error(
                "reading",
                describe(&name),
                ApiError::MalformedResponse {
                    operation: "ReadPipeline",
                    field: "pipeline",
                },
            )
        })?;
        data.set_state(flatten_pipeline(pipeline));
        Ok(())
    }

    async fn update(&self, data: &mut ResourceData<PipelineConfig>) -> ModuleResult<()> {
        let id = data.require_id("update")?.to_string();
        let changed = data.changed_attributes();

        if changed.is_empty() {
            tracing::debug!("{} {} has no changes to apply", TYPE_NAME, id);
        } else {
            let input = update_input(&id, data.config(), data.state(), &changed)?;
            tracing::debug!("Updating {}: {:?}", TYPE_NAME, input);

            let resp = self
                .client
                .update_pipeline(input)
                .await
                .map_err(|e| api_error("updating", describe(&data.config().name), e))?;

            record_warnings(data, resp.warnings());
            tracing::info!(
                "Updated {} ({:?})",
                describe(&data.config().name),
                changed
            );
        }

        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData<PipelineConfig>) -> ModuleResult<()> {
        let id = data.require_id("delete")?.to_string();
        tracing::debug!("Deleting {}: {}", TYPE_NAME, id);

        self.client
            .delete_pipeline(&id)
            .await
            .map_err(|e| api_error("deleting", describe(&data.config().name), e))?;

        tracing::info!("Deleted {} ({})", describe(&data.config().name), id);
        data.clear_id();
        Ok(())
    }

    async fn find_id_by_name(&self, name: &str) -> ModuleResult<Option<String>> {
        let pipelines = self
            .client
            .list_pipelines()
            .await
            .map_err(|e| api_error("listing", format!("{}s", TYPE_NAME), e))?;

        let mut ids: Vec<String> = pipelines
            .iter()
            .filter(|p| p.name() == Some(name))
            .filter_map(|p| p.id().map(str::to_string))
            .collect();

        match ids.len() {
            0 | 1 => Ok(ids.pop()),
            n => Err(ModuleError::ExecutionFailed(format!(
                "Found {} {}s named '{}'; set 'id' to choose one",
                n, TYPE_NAME, name
            ))),
        }
    }
}

/// Module managing Elastic Transcoder pipelines.
pub struct ElasticTranscoderPipelineModule;

impl ElasticTranscoderPipelineModule {
    async fn execute_async(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let task = Task::<PipelineConfig>::from_params(params)?;
        let client = client_for(task.region.as_deref(), context).await;
        run_task(&PipelineResource::new(client), task, context).await
    }
}

impl Module for ElasticTranscoderPipelineModule {
    fn name(&self) -> &'static str {
        "aws_elastictranscoder_pipeline"
    }

    fn description(&self) -> &'static str {
        "Create, update, and delete AWS Elastic Transcoder pipelines"
    }

    fn required_params(&self) -> &[&'static str] {
        &["name", "input_bucket", "role"]
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        block_on(self.execute_async(params, context))
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        Task::<PipelineConfig>::from_params(params)?.validate()
    }
}
