//! Elastic Transcoder preset lifecycle and the `aws_elastictranscoder_preset` module.
//!
//! ## Parameters
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `name` | Yes | Preset name |
//! | `container` | Yes | Container type, e.g. mp4, ts, webm |
//! | `description` | No | Free-form description |
//! | `audio` | No | Audio encoding parameters |
//! | `video` | No | Video encoding parameters, including `watermarks` |
//! | `thumbnails` | No | Thumbnail parameters |

use async_trait::async_trait;
use aws_sdk_elastictranscoder::operation::create_preset::CreatePresetInput;
use aws_sdk_elastictranscoder::types::{AudioParameters, Thumbnails, VideoParameters};
use std::sync::Arc;

use super::api::{ApiError, TranscoderApi, UpdatePresetInput};
use super::convert::{expand_audio, expand_thumbnails, expand_video, flatten_preset};
use super::types::{PresetAttribute, PresetConfig};
use super::{api_error, block_on, client_for, run_task, Task};
use crate::modules::{Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult};
use crate::resource::ResourceData;
use crate::traits::{Resource, ResourceConfig};

const TYPE_NAME: &str = "Elastic Transcoder preset";

fn describe(name: &str) -> String {
    format!("{} '{}'", TYPE_NAME, name)
}

/// Build the CreatePreset request. Blocks are included only when declared.
pub fn create_input(config: &PresetConfig) -> ModuleResult<CreatePresetInput> {
    CreatePresetInput::builder()
        .name(&config.name)
        .container(&config.container)
        .set_description(config.description.clone())
        .set_audio(config.audio.as_ref().map(expand_audio))
        .set_video(config.video.as_ref().map(expand_video))
        .set_thumbnails(config.thumbnails.as_ref().map(expand_thumbnails))
        .build()
        .map_err(|e| ModuleError::InvalidParameter(e.to_string()))
}

/// Build an update request carrying only `changed` attributes. A block that
/// is no longer declared is sent empty, which removes it.
pub fn update_input(id: &str, config: &PresetConfig, changed: &[PresetAttribute]) -> UpdatePresetInput {
    let mut input = UpdatePresetInput::new(id);

    for attribute in changed {
        match attribute {
            PresetAttribute::Audio => {
                input.audio = Some(
                    config
                        .audio
                        .as_ref()
                        .map(expand_audio)
                        .unwrap_or_else(|| AudioParameters::builder().build()),
                );
            }
            PresetAttribute::Container => input.container = Some(config.container.clone()),
            PresetAttribute::Description => {
                input.description = Some(config.description.clone().unwrap_or_default());
            }
            PresetAttribute::Name => input.name = Some(config.name.clone()),
            PresetAttribute::Thumbnails => {
                input.thumbnails = Some(
                    config
                        .thumbnails
                        .as_ref()
                        .map(expand_thumbnails)
                        .unwrap_or_else(|| Thumbnails::builder().build()),
                );
            }
            PresetAttribute::Video => {
                input.video = Some(
                    config
                        .video
                        .as_ref()
                        .map(expand_video)
                        .unwrap_or_else(|| VideoParameters::builder().build()),
                );
            }
        }
    }

    input
}

fn record_warning(data: &mut ResourceData<PresetConfig>, warning: Option<&str>) {
    if let Some(warning) = warning.filter(|w| !w.is_empty()) {
        tracing::warn!("{}: {}", TYPE_NAME, warning);
        data.add_warning(warning);
    }
}

fn malformed(operation: &'static str, action: &'static str, name: &str) -> ModuleError {
    api_error(
        action,
        describe(name),
        ApiError::MalformedResponse {
            operation,
            field: "preset",
        },
    )
}

/// Preset lifecycle over a [`TranscoderApi`].
#[derive(Clone)]
pub struct PresetResource {
    client: Arc<dyn TranscoderApi>,
}

impl PresetResource {
    pub fn new(client: Arc<dyn TranscoderApi>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for PresetResource {
    type Config = PresetConfig;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn create(&self, data: &mut ResourceData<PresetConfig>) -> ModuleResult<()> {
        let config = data.config().clone();
        config.validate()?;

        let input = create_input(&config)?;
        tracing::debug!("{} create input: {:?}", TYPE_NAME, input);

        let resp = self
            .client
            .create_preset(input)
            .await
            .map_err(|e| api_error("creating", describe(&config.name), e))?;

        let preset = resp
            .preset()
            .ok_or_else(|| malformed("CreatePreset", "creating", &config.name))?;
        let id = preset
            .id()
            .ok_or_else(|| malformed("CreatePreset", "creating", &config.name))?;

        data.set_id(id);
        tracing::info!("Created {} ({})", describe(&config.name), id);
        record_warning(data, resp.warning());
        data.set_state(flatten_preset(preset));

        self.update(data).await
    }

    async fn read(&self, data: &mut ResourceData<PresetConfig>) -> ModuleResult<()> {
        let id = data.require_id("read")?.to_string();
        let name = data.config().name.clone();

        let resp = match self.client.read_preset(&id).await {
            Ok(resp) => resp,
            Err(e) if e.is_not_found() => {
                tracing::info!("{} {} not found, removing from state", TYPE_NAME, id);
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(api_error("reading", describe(&name), e)),
        };

        let preset = resp
            .preset()
            .ok_or_else(|| malformed("ReadPreset", "reading", &name))?;
        data.set_state(flatten_preset(preset));
        Ok(())
    }

    async fn update(&self, data: &mut ResourceData<PresetConfig>) -> ModuleResult<()> {
        let id = data.require_id("update")?.to_string();
        let changed = data.changed_attributes();

        if changed.is_empty() {
            tracing::debug!("{} {} has no changes to apply", TYPE_NAME, id);
        } else {
            let input = update_input(&id, data.config(), &changed);
            tracing::debug!("Updating {}: {:?}", TYPE_NAME, input);

            let resp = self
                .client
                .update_preset(input)
                .await
                .map_err(|e| api_error("updating", describe(&data.config().name), e))?;

            if let Some(new_id) = resp.preset.as_ref().and_then(|p| p.id()) {
                if new_id != id {
                    tracing::info!("{} {} replaced by {}", TYPE_NAME, id, new_id);
                }
                data.set_id(new_id);
            }
            record_warning(data, resp.warning.as_deref());
            tracing::info!(
                "Updated {} ({:?})",
                describe(&data.config().name),
                changed
            );
        }

        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData<PresetConfig>) -> ModuleResult<()> {
        let id = data.require_id("delete")?.to_string();
        tracing::debug!("Deleting {}: {}", TYPE_NAME, id);

        self.client
            .delete_preset(&id)
            .await
            .map_err(|e| api_error("deleting", describe(&data.config().name), e))?;

        tracing::info!("Deleted {} ({})", describe(&data.config().name), id);
        data.clear_id();
        Ok(())
    }

    /// Only custom presets are candidates; system presets can't be managed.
    async fn find_id_by_name(&self, name: &str) -> ModuleResult<Option<String>> {
        let presets = self
            .client
            .list_presets()
            .await
            .map_err(|e| api_error("listing", format!("{}s", TYPE_NAME), e))?;

        let mut ids: Vec<String> = presets
            .iter()
            .filter(|p| p.name() == Some(name) && p.r#type() != Some("System"))
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

/// Module managing Elastic Transcoder presets.
pub struct ElasticTranscoderPresetModule;

impl ElasticTranscoderPresetModule {
    async fn execute_async(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let task = Task::<PresetConfig>::from_params(params)?;
        let client = client_for(task.region.as_deref(), context).await;
        run_task(&PresetResource::new(client), task, context).await
    }
}

impl Module for ElasticTranscoderPresetModule {
    fn name(&self) -> &'static str {
        "aws_elastictranscoder_preset"
    }

    fn description(&self) -> &'static str {
        "Create, update, and delete AWS Elastic Transcoder presets"
    }

    fn required_params(&self) -> &[&'static str] {
        &["name", "container"]
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        block_on(self.execute_async(params, context))
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        Task::<PresetConfig>::from_params(params)?.validate()
    }
}
