//! Shared test utilities for the transcoder-iac integration tests.
//!
//! [`FakeTranscoder`] is an in-memory Elastic Transcoder that implements
//! [`TranscoderApi`]. It records every call so tests can assert on what was
//! sent, and returns `ApiError::NotFound` for ids it does not hold.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_sdk_elastictranscoder::operation::create_pipeline::{
    CreatePipelineInput, CreatePipelineOutput,
};
use aws_sdk_elastictranscoder::operation::create_preset::{CreatePresetInput, CreatePresetOutput};
use aws_sdk_elastictranscoder::operation::read_pipeline::ReadPipelineOutput;
use aws_sdk_elastictranscoder::operation::read_preset::ReadPresetOutput;
use aws_sdk_elastictranscoder::operation::update_pipeline::{
    UpdatePipelineInput, UpdatePipelineOutput,
};
use aws_sdk_elastictranscoder::types::{
    AudioParameters, Pipeline, PipelineOutputConfig, Preset, Thumbnails, VideoParameters, Warning,
};

use transcoder_iac::modules::cloud::aws::elastic_transcoder::{
    ApiError, ApiResult, TranscoderApi, UpdatePresetInput, UpdatePresetOutput,
};
use transcoder_iac::modules::{ModuleContext, ModuleOutput, ModuleParams, ModuleRegistry, ModuleResult};

const ACCOUNT_ARN: &str = "arn:aws:elastictranscoder:us-east-1:123456789012";

#[derive(Default)]
struct Store {
    pipelines: BTreeMap<String, Pipeline>,
    presets: BTreeMap<String, Preset>,
    next_id: u64,
    calls: Vec<String>,
    pipeline_updates: Vec<UpdatePipelineInput>,
    preset_updates: Vec<UpdatePresetInput>,
    create_warnings: Vec<Warning>,
}

impl Store {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:013}-{:06}", 1_700_000_000_000u64 + self.next_id, self.next_id)
    }
}

/// In-memory Elastic Transcoder.
#[derive(Default)]
pub struct FakeTranscoder {
    store: Mutex<Store>,
}

impl FakeTranscoder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Warnings returned by every subsequent CreatePipeline call.
    pub fn warn_on_create(&self, code: &str, message: &str) {
        self.store.lock().unwrap().create_warnings.push(
            Warning::builder()
                .code(code)
                .message(message)
                .build(),
        );
    }

    /// Operation names in call order, e.g. `["ListPipelines", "CreatePipeline"]`.
    pub fn calls(&self) -> Vec<String> {
        self.store.lock().unwrap().calls.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == operation).count()
    }

    pub fn clear_calls(&self) {
        self.store.lock().unwrap().calls.clear();
    }

    pub fn pipeline_updates(&self) -> Vec<UpdatePipelineInput> {
        self.store.lock().unwrap().pipeline_updates.clone()
    }

    pub fn preset_updates(&self) -> Vec<UpdatePresetInput> {
        self.store.lock().unwrap().preset_updates.clone()
    }

    pub fn pipeline(&self, id: &str) -> Option<Pipeline> {
        self.store.lock().unwrap().pipelines.get(id).cloned()
    }

    pub fn pipelines(&self) -> Vec<Pipeline> {
        self.store.lock().unwrap().pipelines.values().cloned().collect()
    }

    pub fn preset(&self, id: &str) -> Option<Preset> {
        self.store.lock().unwrap().presets.get(id).cloned()
    }

    pub fn presets(&self) -> Vec<Preset> {
        self.store.lock().unwrap().presets.values().cloned().collect()
    }

    /// Seed a preset as if created outside this tool.
    pub fn insert_preset(&self, preset: Preset) {
        let id = preset.id().unwrap_or_default().to_string();
        self.store.lock().unwrap().presets.insert(id, preset);
    }

    /// Remove a pipeline behind the tool's back.
    pub fn remove_pipeline(&self, id: &str) {
        self.store.lock().unwrap().pipelines.remove(id);
    }

    fn record(&self, operation: &str) {
        self.store.lock().unwrap().calls.push(operation.to_string());
    }
}

fn not_found(operation: &'static str, kind: &str, id: &str) -> ApiError {
    ApiError::NotFound {
        operation,
        message: format!("The specified {} was not found: {}", kind, id),
    }
}

/// Output config the service reports for a pipeline created with only an
/// output bucket.
fn default_output_config(bucket: &str) -> PipelineOutputConfig {
    PipelineOutputConfig::builder()
        .bucket(bucket)
        .storage_class("Standard")
        .build()
}

/// An empty block in an update removes the attribute.
fn overlay<T: Clone + PartialEq>(requested: Option<T>, current: Option<&T>, empty: &T) -> Option<T> {
    match requested {
        Some(block) if &block == empty => None,
        Some(block) => Some(block),
        None => current.cloned(),
    }
}

#[async_trait]
impl TranscoderApi for FakeTranscoder {
    async fn create_pipeline(&self, input: CreatePipelineInput) -> ApiResult<CreatePipelineOutput> {
        self.record("CreatePipeline");
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();

        let output_bucket = input.output_bucket().map(str::to_string);
        let content_config = input
            .content_config()
            .cloned()
            .or_else(|| output_bucket.as_deref().map(default_output_config));
        let thumbnail_config = input
            .thumbnail_config()
            .cloned()
            .or_else(|| output_bucket.as_deref().map(default_output_config));

        let pipeline = Pipeline::builder()
            .id(&id)
            .arn(format!("{}:pipeline/{}", ACCOUNT_ARN, id))
            .set_name(input.name().map(str::to_string))
            .status("Active")
            .set_input_bucket(input.input_bucket().map(str::to_string))
            .set_output_bucket(output_bucket)
            .set_role(input.role().map(str::to_string))
            .set_aws_kms_key_arn(input.aws_kms_key_arn().map(str::to_string))
            .set_notifications(input.notifications().cloned())
            .set_content_config(content_config)
            .set_thumbnail_config(thumbnail_config)
            .build();

        store.pipelines.insert(id, pipeline.clone());
        let warnings = store.create_warnings.clone();

        Ok(CreatePipelineOutput::builder()
            .pipeline(pipeline)
            .set_warnings(Some(warnings))
            .build())
    }

    async fn read_pipeline(&self, id: &str) -> ApiResult<ReadPipelineOutput> {
        self.record("ReadPipeline");
        let store = self.store.lock().unwrap();
        let pipeline = store
            .pipelines
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("ReadPipeline", "pipeline", id))?;
        Ok(ReadPipelineOutput::builder().pipeline(pipeline).build())
    }

    async fn update_pipeline(&self, input: UpdatePipelineInput) -> ApiResult<UpdatePipelineOutput> {
        self.record("UpdatePipeline");
        let mut store = self.store.lock().unwrap();
        store.pipeline_updates.push(input.clone());

        let id = input.id().unwrap_or_default().to_string();
        let current = store
            .pipelines
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("UpdatePipeline", "pipeline", &id))?;

        // A pipeline that reports an output bucket follows its content config
        let output_bucket = match (current.output_bucket(), input.content_config()) {
            (Some(_), Some(content)) => content.bucket().map(str::to_string),
            (bucket, _) => bucket.map(str::to_string),
        };

        let pipeline = Pipeline::builder()
            .id(&id)
            .set_arn(current.arn().map(str::to_string))
            .set_name(input.name().or(current.name()).map(str::to_string))
            .set_status(current.status().map(str::to_string))
            .set_input_bucket(
                input
                    .input_bucket()
                    .or(current.input_bucket())
                    .map(str::to_string),
            )
            .set_output_bucket(output_bucket)
            .set_role(input.role().or(current.role()).map(str::to_string))
            .set_aws_kms_key_arn(
                input
                    .aws_kms_key_arn()
                    .or(current.aws_kms_key_arn())
                    .map(str::to_string),
            )
            .set_notifications(
                input
                    .notifications()
                    .or(current.notifications())
                    .cloned(),
            )
            .set_content_config(
                input
                    .content_config()
                    .or(current.content_config())
                    .cloned(),
            )
            .set_thumbnail_config(
                input
                    .thumbnail_config()
                    .or(current.thumbnail_config())
                    .cloned(),
            )
            .build();

        store.pipelines.insert(id, pipeline.clone());
        Ok(UpdatePipelineOutput::builder().pipeline(pipeline).build())
    }

    async fn delete_pipeline(&self, id: &str) -> ApiResult<()> {
        self.record("DeletePipeline");
        self.store
            .lock()
            .unwrap()
            .pipelines
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("DeletePipeline", "pipeline", id))
    }

    async fn list_pipelines(&self) -> ApiResult<Vec<Pipeline>> {
        self.record("ListPipelines");
        Ok(self.store.lock().unwrap().pipelines.values().cloned().collect())
    }

    async fn create_preset(&self, input: CreatePresetInput) -> ApiResult<CreatePresetOutput> {
        self.record("CreatePreset");
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();

        let preset = Preset::builder()
            .id(&id)
            .arn(format!("{}:preset/{}", ACCOUNT_ARN, id))
            .set_name(input.name().map(str::to_string))
            .set_description(input.description().map(str::to_string))
            .set_container(input.container().map(str::to_string))
            .set_audio(input.audio().cloned())
            .set_video(input.video().cloned())
            .set_thumbnails(input.thumbnails().cloned())
            .r#type("Custom")
            .build();

        store.presets.insert(id, preset.clone());
        Ok(CreatePresetOutput::builder().preset(preset).build())
    }

    async fn read_preset(&self, id: &str) -> ApiResult<ReadPresetOutput> {
        self.record("ReadPreset");
        let store = self.store.lock().unwrap();
        let preset = store
            .presets
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("ReadPreset", "preset", id))?;
        Ok(ReadPresetOutput::builder().preset(preset).build())
    }

    /// Replaces the preset under a new id, like the service-side
    /// replacement the production client performs.
    async fn update_preset(&self, input: UpdatePresetInput) -> ApiResult<UpdatePresetOutput> {
        self.record("UpdatePreset");
        let mut store = self.store.lock().unwrap();
        store.preset_updates.push(input.clone());

        let current = store
            .presets
            .remove(&input.id)
            .ok_or_else(|| not_found("UpdatePreset", "preset", &input.id))?;
        let id = store.next_id();

        let description = match input.description {
            Some(d) if d.is_empty() => None,
            Some(d) => Some(d),
            None => current.description().map(str::to_string),
        };

        let preset = Preset::builder()
            .id(&id)
            .arn(format!("{}:preset/{}", ACCOUNT_ARN, id))
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
            .r#type("Custom")
            .build();

        store.presets.insert(id, preset.clone());
        Ok(UpdatePresetOutput {
            preset: Some(preset),
            warning: None,
        })
    }

    async fn delete_preset(&self, id: &str) -> ApiResult<()> {
        self.record("DeletePreset");
        self.store
            .lock()
            .unwrap()
            .presets
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("DeletePreset", "preset", id))
    }

    async fn list_presets(&self) -> ApiResult<Vec<Preset>> {
        self.record("ListPresets");
        Ok(self.store.lock().unwrap().presets.values().cloned().collect())
    }
}

/// Module parameters from a JSON object literal.
pub fn params(value: serde_json::Value) -> ModuleParams {
    match value {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        other => panic!("module params must be an object, got {}", other),
    }
}

/// A module context that talks to `fake`.
pub fn context(fake: &Arc<FakeTranscoder>) -> ModuleContext {
    let client: Arc<dyn TranscoderApi> = fake.clone();
    ModuleContext::new().with_client(client)
}

/// Run a built-in module from inside a multi-threaded tokio test.
pub fn execute_module(
    module: &str,
    context: &ModuleContext,
    value: serde_json::Value,
) -> ModuleResult<ModuleOutput> {
    let registry = ModuleRegistry::with_builtins();
    let params = params(value);
    tokio::task::block_in_place(|| registry.execute(module, &params, context))
}

/// Parameters for a minimal valid pipeline.
pub fn pipeline_params(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "input_bucket": "uploads",
        "output_bucket": "transcoded",
        "role": "arn:aws:iam::123456789012:role/Elastic_Transcoder_Default_Role",
    })
}

/// Parameters for a web preset with audio, video and thumbnails.
pub fn preset_params(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "container": "mp4",
        "description": "720p for the web",
        "audio": {
            "codec": "AAC",
            "bitrate": "128",
            "channels": "2",
            "sample_rate": "44100",
            "codec_options": { "profile": "AAC-LC" },
        },
        "video": {
            "codec": "H.264",
            "bitrate": "2400",
            "frame_rate": "30",
            "keyframes_max_dist": "90",
            "fixed_gop": "false",
            "max_width": "1280",
            "max_height": "720",
            "sizing_policy": "ShrinkToFit",
            "padding_policy": "NoPad",
            "display_aspect_ratio": "auto",
            "codec_options": {
                "Profile": "main",
                "Level": "3.1",
                "MaxReferenceFrames": "3",
            },
        },
        "thumbnails": {
            "format": "png",
            "interval": "60",
            "max_width": "192",
            "max_height": "108",
            "sizing_policy": "ShrinkToFit",
            "padding_policy": "NoPad",
        },
    })
}
