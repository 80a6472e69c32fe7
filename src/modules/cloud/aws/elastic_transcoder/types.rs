//! Typed configuration for Elastic Transcoder pipelines and presets.
//!
//! Every leaf is a string, as on the wire. Blocks the service allows at most
//! once are `Option`s; unordered collections are `Vec`s compared after
//! sorting.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::modules::{ModuleError, ModuleResult};
use crate::traits::ResourceConfig;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[.0-9A-Za-z_-]+$").expect("Invalid pipeline name regex"));

/// Longest pipeline name the service accepts.
pub const MAX_NAME_LEN: usize = 40;

/// Check a pipeline name against the service's naming rules.
///
/// All problems are reported together, separated by `; `.
pub fn validate_name(name: &str) -> ModuleResult<()> {
    let mut problems = Vec::new();

    if !NAME_PATTERN.is_match(name) {
        problems.push(
            "only alphanumeric characters, hyphens, underscores, and periods allowed in \"name\""
                .to_string(),
        );
    }
    if name.chars().count() > MAX_NAME_LEN {
        problems.push(format!(
            "\"name\" cannot be longer than {} characters",
            MAX_NAME_LEN
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ModuleError::InvalidParameter(problems.join("; ")))
    }
}

/// `declared` differs from `observed`, treating an undeclared value as
/// "whatever the service chose".
fn computed_differs<T: PartialEq>(declared: &Option<T>, observed: &Option<T>) -> bool {
    declared.is_some() && declared != observed
}

fn clear_empty(value: &mut Option<String>) {
    if value.as_deref() == Some("") {
        *value = None;
    }
}

/// Normalise a declared block, dropping it when nothing is left.
fn prune<T>(block: Option<T>, normalize: fn(&mut T), is_empty: fn(&T) -> bool) -> Option<T> {
    let mut block = block?;
    normalize(&mut block);
    (!is_empty(&block)).then_some(block)
}

// ============================================================================
// Pipeline
// ============================================================================

/// One permission grant on an output bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Permission {
    /// Read, ReadAcp, WriteAcp or FullControl. Unordered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grantee: Option<String>,
    /// Canonical, Email or Group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grantee_type: Option<String>,
}

impl Permission {
    fn normalize(&mut self) {
        self.access.retain(|a| !a.is_empty());
        clear_empty(&mut self.grantee);
        clear_empty(&mut self.grantee_type);
    }

    fn canonical(&self) -> Self {
        let mut access = self.access.clone();
        access.sort();
        access.dedup();
        Self {
            access,
            ..self.clone()
        }
    }
}

/// Where and how transcoded files or thumbnails are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl OutputConfig {
    /// Permissions sorted, each with sorted access levels.
    pub fn canonical(&self) -> Self {
        let mut permissions: Vec<Permission> =
            self.permissions.iter().map(Permission::canonical).collect();
        permissions.sort();
        permissions.dedup();
        Self {
            permissions,
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bucket.is_none() && self.storage_class.is_none() && self.permissions.is_empty()
    }

    fn normalize(&mut self) {
        clear_empty(&mut self.bucket);
        clear_empty(&mut self.storage_class);
        for permission in &mut self.permissions {
            permission.normalize();
        }
        self.permissions.retain(|p| p != &Permission::default());
    }

    /// Whether the remote block satisfies this declaration. Undeclared
    /// scalars are left to the service.
    fn covered_by(&self, observed: &OutputConfig) -> bool {
        let declared = self.canonical();
        let observed = observed.canonical();
        !computed_differs(&declared.bucket, &observed.bucket)
            && !computed_differs(&declared.storage_class, &observed.storage_class)
            && declared.permissions == observed.permissions
    }
}

/// SNS topics notified on job status changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Notifications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progressing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Notifications {
    pub fn is_empty(&self) -> bool {
        self.completed.is_none()
            && self.error.is_none()
            && self.progressing.is_none()
            && self.warning.is_none()
    }

    fn normalize(&mut self) {
        for topic in [
            &mut self.completed,
            &mut self.error,
            &mut self.progressing,
            &mut self.warning,
        ] {
            clear_empty(topic);
        }
    }
}

/// A transcoding pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Set from the service, never sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_kms_key_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_config: Option<OutputConfig>,
    pub input_bucket: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Notifications>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_bucket: Option<String>,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_config: Option<OutputConfig>,
}

impl PipelineConfig {
    /// Exactly one of `output_bucket` and `content_config.bucket` must be set.
    pub fn validate_buckets(&self) -> ModuleResult<()> {
        let content_bucket = self
            .content_config
            .as_ref()
            .and_then(|c| c.bucket.as_ref());

        match (&self.output_bucket, content_bucket) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(ModuleError::InvalidParameter(
                "you must specify only one of output_bucket or content_config.bucket".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineAttribute {
    AwsKmsKeyArn,
    ContentConfig,
    InputBucket,
    Name,
    Notifications,
    OutputBucket,
    Role,
    ThumbnailConfig,
}

impl fmt::Display for PipelineAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineAttribute::AwsKmsKeyArn => "aws_kms_key_arn",
            PipelineAttribute::ContentConfig => "content_config",
            PipelineAttribute::InputBucket => "input_bucket",
            PipelineAttribute::Name => "name",
            PipelineAttribute::Notifications => "notifications",
            PipelineAttribute::OutputBucket => "output_bucket",
            PipelineAttribute::Role => "role",
            PipelineAttribute::ThumbnailConfig => "thumbnail_config",
        };
        f.write_str(name)
    }
}

impl ResourceConfig for PipelineConfig {
    type Attribute = PipelineAttribute;

    fn resource_name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> ModuleResult<()> {
        validate_name(&self.name)?;
        self.validate_buckets()
    }

    fn normalized(mut self) -> Self {
        for field in [
            &mut self.arn,
            &mut self.aws_kms_key_arn,
            &mut self.output_bucket,
        ] {
            clear_empty(field);
        }
        self.content_config = prune(
            self.content_config,
            OutputConfig::normalize,
            OutputConfig::is_empty,
        );
        self.thumbnail_config = prune(
            self.thumbnail_config,
            OutputConfig::normalize,
            OutputConfig::is_empty,
        );
        self.notifications = prune(
            self.notifications,
            Notifications::normalize,
            Notifications::is_empty,
        );
        self
    }

    fn diff(&self, observed: Option<&Self>) -> Vec<PipelineAttribute> {
        let empty = PipelineConfig::default();
        let observed = observed.unwrap_or(&empty);
        let mut changed = Vec::new();

        if computed_differs(&self.aws_kms_key_arn, &observed.aws_kms_key_arn) {
            changed.push(PipelineAttribute::AwsKmsKeyArn);
        }
        if let Some(content) = &self.content_config {
            let covered = observed
                .content_config
                .as_ref()
                .is_some_and(|o| content.covered_by(o));
            if !covered {
                changed.push(PipelineAttribute::ContentConfig);
            }
        }
        if self.input_bucket != observed.input_bucket {
            changed.push(PipelineAttribute::InputBucket);
        }
        if self.name != observed.name {
            changed.push(PipelineAttribute::Name);
        }
        if self.notifications != observed.notifications {
            changed.push(PipelineAttribute::Notifications);
        }
        if computed_differs(&self.output_bucket, &observed.output_bucket) {
            changed.push(PipelineAttribute::OutputBucket);
        }
        if self.role != observed.role {
            changed.push(PipelineAttribute::Role);
        }
        if let Some(thumbnails) = &self.thumbnail_config {
            let covered = observed
                .thumbnail_config
                .as_ref()
                .is_some_and(|o| thumbnails.covered_by(o));
            if !covered {
                changed.push(PipelineAttribute::ThumbnailConfig);
            }
        }

        changed
    }
}

// ============================================================================
// Preset
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioCodecOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed: Option<String>,
}

impl AudioCodecOptions {
    pub fn is_empty(&self) -> bool {
        self.bit_depth.is_none()
            && self.bit_order.is_none()
            && self.profile.is_none()
            && self.signed.is_none()
    }

    fn normalize(&mut self) {
        for field in [
            &mut self.bit_depth,
            &mut self.bit_order,
            &mut self.profile,
            &mut self.signed,
        ] {
            clear_empty(field);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_packing_mode: Option<String>,
    #[serde(default, rename = "bitrate", skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_options: Option<AudioCodecOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<String>,
}

impl AudioParams {
    pub fn is_empty(&self) -> bool {
        self == &AudioParams::default()
    }

    fn normalize(&mut self) {
        for field in [
            &mut self.audio_packing_mode,
            &mut self.bit_rate,
            &mut self.channels,
            &mut self.codec,
            &mut self.sample_rate,
        ] {
            clear_empty(field);
        }
        self.codec_options = prune(
            self.codec_options.take(),
            AudioCodecOptions::normalize,
            AudioCodecOptions::is_empty,
        );
    }
}

/// A watermark overlay on transcoded video.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Watermark {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_offset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_offset: Option<String>,
}

impl Watermark {
    fn normalize(&mut self) {
        for field in [
            &mut self.id,
            &mut self.horizontal_align,
            &mut self.horizontal_offset,
            &mut self.max_height,
            &mut self.max_width,
            &mut self.opacity,
            &mut self.sizing_policy,
            &mut self.target,
            &mut self.vertical_align,
            &mut self.vertical_offset,
        ] {
            clear_empty(field);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, rename = "bitrate", skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub codec_options: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_gop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframes_max_dist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_frame_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing_policy: Option<String>,
    /// Unordered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub watermarks: Vec<Watermark>,
}

impl VideoParams {
    /// Watermarks sorted.
    pub fn canonical(&self) -> Self {
        let mut watermarks = self.watermarks.clone();
        watermarks.sort();
        Self {
            watermarks,
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &VideoParams::default()
    }

    fn normalize(&mut self) {
        for field in [
            &mut self.aspect_ratio,
            &mut self.bit_rate,
            &mut self.codec,
            &mut self.display_aspect_ratio,
            &mut self.fixed_gop,
            &mut self.frame_rate,
            &mut self.keyframes_max_dist,
            &mut self.max_frame_rate,
            &mut self.max_height,
            &mut self.max_width,
            &mut self.padding_policy,
            &mut self.resolution,
            &mut self.sizing_policy,
        ] {
            clear_empty(field);
        }
        self.codec_options.retain(|_, v| !v.is_empty());
        for watermark in &mut self.watermarks {
            watermark.normalize();
        }
        self.watermarks.retain(|w| w != &Watermark::default());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThumbnailParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing_policy: Option<String>,
}

impl ThumbnailParams {
    pub fn is_empty(&self) -> bool {
        self == &ThumbnailParams::default()
    }

    fn normalize(&mut self) {
        for field in [
            &mut self.aspect_ratio,
            &mut self.format,
            &mut self.interval,
            &mut self.max_height,
            &mut self.max_width,
            &mut self.padding_policy,
            &mut self.resolution,
            &mut self.sizing_policy,
        ] {
            clear_empty(field);
        }
    }
}

/// A transcoding preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetConfig {
    /// Set from the service, never sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioParams>,
    pub container: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub name: String,
    /// "Custom" or "System". Set from the service, never sent.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub preset_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<ThumbnailParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoParams>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetAttribute {
    Audio,
    Container,
    Description,
    Name,
    Thumbnails,
    Video,
}

impl fmt::Display for PresetAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PresetAttribute::Audio => "audio",
            PresetAttribute::Container => "container",
            PresetAttribute::Description => "description",
            PresetAttribute::Name => "name",
            PresetAttribute::Thumbnails => "thumbnails",
            PresetAttribute::Video => "video",
        };
        f.write_str(name)
    }
}

impl ResourceConfig for PresetConfig {
    type Attribute = PresetAttribute;

    fn resource_name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> ModuleResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModuleError::MissingParameter("name".to_string()));
        }
        if self.container.trim().is_empty() {
            return Err(ModuleError::MissingParameter("container".to_string()));
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        for field in [&mut self.arn, &mut self.description, &mut self.preset_type] {
            clear_empty(field);
        }
        self.audio = prune(self.audio, AudioParams::normalize, AudioParams::is_empty);
        self.thumbnails = prune(
            self.thumbnails,
            ThumbnailParams::normalize,
            ThumbnailParams::is_empty,
        );
        self.video = prune(self.video, VideoParams::normalize, VideoParams::is_empty);
        self
    }

    fn diff(&self, observed: Option<&Self>) -> Vec<PresetAttribute> {
        let empty = PresetConfig::default();
        let observed = observed.unwrap_or(&empty);
        let mut changed = Vec::new();

        if self.audio != observed.audio {
            changed.push(PresetAttribute::Audio);
        }
        if self.container != observed.container {
            changed.push(PresetAttribute::Container);
        }
        if self.description != observed.description {
            changed.push(PresetAttribute::Description);
        }
        if self.name != observed.name {
            changed.push(PresetAttribute::Name);
        }
        if self.thumbnails != observed.thumbnails {
            changed.push(PresetAttribute::Thumbnails);
        }
        let declared_video = self.video.as_ref().map(VideoParams::canonical);
        let observed_video = observed.video.as_ref().map(VideoParams::canonical);
        if declared_video != observed_video {
            changed.push(PresetAttribute::Video);
        }

        changed
    }
}
