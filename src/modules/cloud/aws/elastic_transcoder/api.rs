//! Client seam for the Elastic Transcoder API.
//!
//! The lifecycle code only talks to [`TranscoderApi`]; [`SdkTranscoderClient`]
//! is the production implementation on top of `aws-sdk-elastictranscoder`.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_elastictranscoder::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_elastictranscoder::operation::create_pipeline::{
    CreatePipelineInput, CreatePipelineOutput,
};
use aws_sdk_elastictranscoder::operation::create_preset::{CreatePresetInput, CreatePresetOutput};
use aws_sdk_elastictranscoder::operation::read_pipeline::ReadPipelineOutput;
use aws_sdk_elastictranscoder::operation::read_preset::ReadPresetOutput;
use aws_sdk_elastictranscoder::operation::update_pipeline::{
    UpdatePipelineInput, UpdatePipelineOutput,
};
use aws_sdk_elastictranscoder::types::{AudioParameters, Pipeline, Preset, Thumbnails, VideoParameters};
use aws_sdk_elastictranscoder::Client;
use thiserror::Error;

/// Error code the service returns for an unknown pipeline or preset id.
pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

/// Errors surfaced by a [`TranscoderApi`] implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{operation}: resource not found: {message}")]
    NotFound {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} failed{}: {message}", .code.as_deref().map(|c| format!(" ({})", c)).unwrap_or_default())]
    Service {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{operation} returned no {field}")]
    MalformedResponse {
        operation: &'static str,
        field: &'static str,
    },

    #[error("replacing preset {old_id}: {error}; replacement preset {new_id} could not be removed: {cleanup}")]
    OrphanedPreset {
        old_id: String,
        new_id: String,
        error: Box<ApiError>,
        cleanup: Box<ApiError>,
    },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Request for an in-place preset update.
///
/// Only the id is mandatory. `None` leaves an attribute untouched; an empty
/// block (or an empty description) removes it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdatePresetInput {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub container: Option<String>,
    pub audio: Option<AudioParameters>,
    pub video: Option<VideoParameters>,
    pub thumbnails: Option<Thumbnails>,
}

impl UpdatePresetInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdatePresetOutput {
    /// The preset as it exists after the update. Its id may differ from the
    /// request id.
    pub preset: Option<Preset>,
    pub warning: Option<String>,
}

/// The subset of the Elastic Transcoder API the resource lifecycles use.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscoderApi: Send + Sync {
    async fn create_pipeline(&self, input: CreatePipelineInput) -> ApiResult<CreatePipelineOutput>;

    async fn read_pipeline(&self, id: &str) -> ApiResult<ReadPipelineOutput>;

    async fn update_pipeline(&self, input: UpdatePipelineInput) -> ApiResult<UpdatePipelineOutput>;

    async fn delete_pipeline(&self, id: &str) -> ApiResult<()>;

    async fn list_pipelines(&self) -> ApiResult<Vec<Pipeline>>;

    async fn create_preset(&self, input: CreatePresetInput) -> ApiResult<CreatePresetOutput>;

    async fn read_preset(&self, id: &str) -> ApiResult<ReadPresetOutput>;

    async fn update_preset(&self, input: UpdatePresetInput) -> ApiResult<UpdatePresetOutput>;

    async fn delete_preset(&self, id: &str) -> ApiResult<()>;

    async fn list_presets(&self) -> ApiResult<Vec<Preset>>;
}

/// [`TranscoderApi`] backed by the AWS SDK.
#[derive(Debug, Clone)]
pub struct SdkTranscoderClient {
    client: Client,
}

impl SdkTranscoderClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS credential chain.
    pub async fn from_region(region: Option<&str>) -> Self {
        let config = if let Some(region_str) = region {
            aws_config::defaults(BehaviorVersion::latest())
                .region(aws_sdk_elastictranscoder::config::Region::new(
                    region_str.to_string(),
                ))
                .load()
                .await
        } else {
            aws_config::defaults(BehaviorVersion::latest())
                .load()
                .await
        };

        Self::new(Client::new(&config))
    }
}

fn sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err
        .as_service_error()
        .and_then(|e| e.code())
        .map(str::to_string);
    let message = DisplayErrorContext(&err).to_string();

    if code.as_deref() == Some(RESOURCE_NOT_FOUND) {
        ApiError::NotFound { operation, message }
    } else {
        ApiError::Service {
            operation,
            code,
            message,
        }
    }
}

/// Resolve one attribute of a replacement preset.
fn overlay<T: Clone + PartialEq>(requested: Option<T>, current: Option<&T>, empty: &T) -> Option<T> {
    match requested {
        Some(value) if &value == empty => None,
        Some(value) => Some(value),
        None => current.cloned(),
    }
}

/// Carry out a preset update as a replacement, since presets are immutable
/// in the service.
///
/// The current preset is read, the requested attributes are overlaid, a new
/// preset is created and the old one deleted. If the old preset can't be
/// deleted the new one is removed again, so a failed update leaves exactly
/// the original preset behind.
pub async fn replace_preset<A>(api: &A, input: UpdatePresetInput) -> ApiResult<UpdatePresetOutput>
where
    A: TranscoderApi + ?Sized,
{
    let current = api
        .read_preset(&input.id)
        .await?
        .preset
        .ok_or(ApiError::MalformedResponse {
            operation: "ReadPreset",
            field: "preset",
        })?;

    let description = match input.description {
        Some(d) if d.is_empty() => None,
        Some(d) => Some(d),
        None => current.description().map(str::to_string),
    };

    let replacement = CreatePresetInput::builder()
        .set_name(input.name.or_else(|| current.name().map(str::to_string)))
        .set_description(description)
        .set_container(
            input
                .container
                .or_else(|| current.container().map(str::to_string)),
        )
        .set_audio(overlay(
            input.audio,
            current.audio(),
            &AudioParameters::builder().build(),
        ))
        .set_video(overlay(
            input.video,
            current.video(),
            &VideoParameters::builder().build(),
        ))
        .set_thumbnails(overlay(
            input.thumbnails,
            current.thumbnails(),
            &Thumbnails::builder().build(),
        ))
        .build()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let created = api.create_preset(replacement).await?;
    let new_id = created
        .preset()
        .and_then(|p| p.id())
        .ok_or(ApiError::MalformedResponse {
            operation: "CreatePreset",
            field: "preset",
        })?
        .to_string();

    if let Err(error) = api.delete_preset(&input.id).await {
        tracing::warn!(
            "Could not delete preset {} after creating {}, rolling back: {}",
            input.id,
            new_id,
            error
        );
        return match api.delete_preset(&new_id).await {
            Ok(()) => Err(error),
            Err(cleanup) => Err(ApiError::OrphanedPreset {
                old_id: input.id,
                new_id,
                error: Box::new(error),
                cleanup: Box::new(cleanup),
            }),
        };
    }
    tracing::info!("Replaced Elastic Transcoder preset {} with {}", input.id, new_id);

    Ok(UpdatePresetOutput {
        preset: created.preset().cloned(),
        warning: created.warning().map(str::to_string),
    })
}

#[async_trait]
impl TranscoderApi for SdkTranscoderClient {
    async fn create_pipeline(&self, input: CreatePipelineInput) -> ApiResult<CreatePipelineOutput> {
        tracing::debug!("CreatePipeline request: {:?}", input);
        self.client
            .create_pipeline()
            .set_name(input.name().map(str::to_string))
            .set_input_bucket(input.input_bucket().map(str::to_string))
            .set_output_bucket(input.output_bucket().map(str::to_string))
            .set_role(input.role().map(str::to_string))
            .set_aws_kms_key_arn(input.aws_kms_key_arn().map(str::to_string))
            .set_notifications(input.notifications().cloned())
            .set_content_config(input.content_config().cloned())
            .set_thumbnail_config(input.thumbnail_config().cloned())
            .send()
            .await
            .map_err(|e| sdk_error("CreatePipeline", e))
    }

    async fn read_pipeline(&self, id: &str) -> ApiResult<ReadPipelineOutput> {
        self.client
            .read_pipeline()
            .id(id)
            .send()
            .await
            .map_err(|e| sdk_error("ReadPipeline", e))
    }

    async fn update_pipeline(&self, input: UpdatePipelineInput) -> ApiResult<UpdatePipelineOutput> {
        tracing::debug!("UpdatePipeline request: {:?}", input);
        self.client
            .update_pipeline()
            .set_id(input.id().map(str::to_string))
            .set_name(input.name().map(str::to_string))
            .set_input_bucket(input.input_bucket().map(str::to_string))
            .set_role(input.role().map(str::to_string))
            .set_aws_kms_key_arn(input.aws_kms_key_arn().map(str::to_string))
            .set_notifications(input.notifications().cloned())
            .set_content_config(input.content_config().cloned())
            .set_thumbnail_config(input.thumbnail_config().cloned())
            .send()
            .await
            .map_err(|e| sdk_error("UpdatePipeline", e))
    }

    async fn delete_pipeline(&self, id: &str) -> ApiResult<()> {
        self.client
            .delete_pipeline()
            .id(id)
            .send()
            .await
            .map_err(|e| sdk_error("DeletePipeline", e))?;
        Ok(())
    }

    async fn list_pipelines(&self) -> ApiResult<Vec<Pipeline>> {
        let mut pipelines = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_pipelines()
                .set_page_token(page_token.take())
                .send()
                .await
                .map_err(|e| sdk_error("ListPipelines", e))?;

            pipelines.extend(resp.pipelines().iter().cloned());

            match resp.next_page_token() {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(pipelines)
    }

    async fn create_preset(&self, input: CreatePresetInput) -> ApiResult<CreatePresetOutput> {
        tracing::debug!("CreatePreset request: {:?}", input);
        self.client
            .create_preset()
            .set_name(input.name().map(str::to_string))
            .set_description(input.description().map(str::to_string))
            .set_container(input.container().map(str::to_string))
            .set_audio(input.audio().cloned())
            .set_video(input.video().cloned())
            .set_thumbnails(input.thumbnails().cloned())
            .send()
            .await
            .map_err(|e| sdk_error("CreatePreset", e))
    }

    async fn read_preset(&self, id: &str) -> ApiResult<ReadPresetOutput> {
        self.client
            .read_preset()
            .id(id)
            .send()
            .await
            .map_err(|e| sdk_error("ReadPreset", e))
    }

    async fn update_preset(&self, input: UpdatePresetInput) -> ApiResult<UpdatePresetOutput> {
        replace_preset(self, input).await
    }

    async fn delete_preset(&self, id: &str) -> ApiResult<()> {
        self.client
            .delete_preset()
            .id(id)
            .send()
            .await
            .map_err(|e| sdk_error("DeletePreset", e))?;
        Ok(())
    }

    async fn list_presets(&self) -> ApiResult<Vec<Preset>> {
        let mut presets = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_presets()
                .set_page_token(page_token.take())
                .send()
                .await
                .map_err(|e| sdk_error("ListPresets", e))?;

            presets.extend(resp.presets().iter().cloned());

            match resp.next_page_token() {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(presets)
    }
}
