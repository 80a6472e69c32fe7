//! Conversions between the typed configuration and SDK structures.
//!
//! `expand_*` builds the nested SDK type from a config block; unset fields
//! stay unset and empty lists are omitted. `flatten_*` goes the other way and
//! returns `None` for a block with nothing in it, so an absent remote block
//! never shows up as an empty declared one.

use aws_sdk_elastictranscoder::types as sdk;
use std::collections::HashMap;

use super::types::{
    AudioCodecOptions, AudioParams, Notifications, OutputConfig, Permission, PipelineConfig,
    PresetConfig, ThumbnailParams, VideoParams, Watermark,
};

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn non_empty_vec<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

// ============================================================================
// Pipeline blocks
// ============================================================================

pub fn expand_notifications(notifications: &Notifications) -> sdk::Notifications {
    sdk::Notifications::builder()
        .set_completed(notifications.completed.clone())
        .set_error(notifications.error.clone())
        .set_progressing(notifications.progressing.clone())
        .set_warning(notifications.warning.clone())
        .build()
}

/// Notifications for an update request. Every topic is sent, with an empty
/// string for the ones not declared, so removed topics are cleared.
pub fn notifications_for_update(notifications: Option<&Notifications>) -> sdk::Notifications {
    let topic = |t: Option<&String>| Some(t.cloned().unwrap_or_default());
    sdk::Notifications::builder()
        .set_completed(topic(notifications.and_then(|n| n.completed.as_ref())))
        .set_error(topic(notifications.and_then(|n| n.error.as_ref())))
        .set_progressing(topic(notifications.and_then(|n| n.progressing.as_ref())))
        .set_warning(topic(notifications.and_then(|n| n.warning.as_ref())))
        .build()
}

pub fn flatten_notifications(notifications: Option<&sdk::Notifications>) -> Option<Notifications> {
    let n = notifications?;
    let flat = Notifications {
        completed: non_empty(n.completed()),
        error: non_empty(n.error()),
        progressing: non_empty(n.progressing()),
        warning: non_empty(n.warning()),
    };
    (!flat.is_empty()).then_some(flat)
}

pub fn expand_permissions(permissions: &[Permission]) -> Option<Vec<sdk::Permission>> {
    non_empty_vec(
        permissions
            .iter()
            .map(|p| {
                sdk::Permission::builder()
                    .set_access(non_empty_vec(p.access.clone()))
                    .set_grantee(p.grantee.clone())
                    .set_grantee_type(p.grantee_type.clone())
                    .build()
            })
            .collect(),
    )
}

pub fn flatten_permissions(permissions: &[sdk::Permission]) -> Vec<Permission> {
    permissions
        .iter()
        .map(|p| Permission {
            access: p
                .access()
                .iter()
                .filter(|a| !a.is_empty())
                .cloned()
                .collect(),
            grantee: non_empty(p.grantee()),
            grantee_type: non_empty(p.grantee_type()),
        })
        .collect()
}

pub fn expand_output_config(config: &OutputConfig) -> sdk::PipelineOutputConfig {
    sdk::PipelineOutputConfig::builder()
        .set_bucket(config.bucket.clone())
        .set_permissions(expand_permissions(&config.permissions))
        .set_storage_class(config.storage_class.clone())
        .build()
}

pub fn flatten_output_config(config: Option<&sdk::PipelineOutputConfig>) -> Option<OutputConfig> {
    let c = config?;
    let flat = OutputConfig {
        bucket: non_empty(c.bucket()),
        permissions: flatten_permissions(c.permissions()),
        storage_class: non_empty(c.storage_class()),
    };
    (!flat.is_empty()).then_some(flat)
}

/// Observed state of a pipeline.
pub fn flatten_pipeline(pipeline: &sdk::Pipeline) -> PipelineConfig {
    PipelineConfig {
        arn: non_empty(pipeline.arn()),
        aws_kms_key_arn: non_empty(pipeline.aws_kms_key_arn()),
        content_config: flatten_output_config(pipeline.content_config()),
        input_bucket: pipeline.input_bucket().unwrap_or_default().to_string(),
        name: pipeline.name().unwrap_or_default().to_string(),
        notifications: flatten_notifications(pipeline.notifications()),
        output_bucket: non_empty(pipeline.output_bucket()),
        role: pipeline.role().unwrap_or_default().to_string(),
        thumbnail_config: flatten_output_config(pipeline.thumbnail_config()),
    }
}

// ============================================================================
// Preset blocks
// ============================================================================

pub fn expand_audio_codec_options(options: &AudioCodecOptions) -> sdk::AudioCodecOptions {
    sdk::AudioCodecOptions::builder()
        .set_bit_depth(options.bit_depth.clone())
        .set_bit_order(options.bit_order.clone())
        .set_profile(options.profile.clone())
        .set_signed(options.signed.clone())
        .build()
}

pub fn flatten_audio_codec_options(
    options: Option<&sdk::AudioCodecOptions>,
) -> Option<AudioCodecOptions> {
    let o = options?;
    let flat = AudioCodecOptions {
        bit_depth: non_empty(o.bit_depth()),
        bit_order: non_empty(o.bit_order()),
        profile: non_empty(o.profile()),
        signed: non_empty(o.signed()),
    };
    (!flat.is_empty()).then_some(flat)
}

pub fn expand_audio(audio: &AudioParams) -> sdk::AudioParameters {
    sdk::AudioParameters::builder()
        .set_audio_packing_mode(audio.audio_packing_mode.clone())
        .set_bit_rate(audio.bit_rate.clone())
        .set_channels(audio.channels.clone())
        .set_codec(audio.codec.clone())
        .set_codec_options(audio.codec_options.as_ref().map(expand_audio_codec_options))
        .set_sample_rate(audio.sample_rate.clone())
        .build()
}

pub fn flatten_audio(audio: Option<&sdk::AudioParameters>) -> Option<AudioParams> {
    let a = audio?;
    let flat = AudioParams {
        audio_packing_mode: non_empty(a.audio_packing_mode()),
        bit_rate: non_empty(a.bit_rate()),
        channels: non_empty(a.channels()),
        codec: non_empty(a.codec()),
        codec_options: flatten_audio_codec_options(a.codec_options()),
        sample_rate: non_empty(a.sample_rate()),
    };
    (!flat.is_empty()).then_some(flat)
}

pub fn expand_watermark(watermark: &Watermark) -> sdk::PresetWatermark {
    sdk::PresetWatermark::builder()
        .set_id(watermark.id.clone())
        .set_horizontal_align(watermark.horizontal_align.clone())
        .set_horizontal_offset(watermark.horizontal_offset.clone())
        .set_max_height(watermark.max_height.clone())
        .set_max_width(watermark.max_width.clone())
        .set_opacity(watermark.opacity.clone())
        .set_sizing_policy(watermark.sizing_policy.clone())
        .set_target(watermark.target.clone())
        .set_vertical_align(watermark.vertical_align.clone())
        .set_vertical_offset(watermark.vertical_offset.clone())
        .build()
}

pub fn flatten_watermark(watermark: &sdk::PresetWatermark) -> Watermark {
    Watermark {
        id: non_empty(watermark.id()),
        horizontal_align: non_empty(watermark.horizontal_align()),
        horizontal_offset: non_empty(watermark.horizontal_offset()),
        max_height: non_empty(watermark.max_height()),
        max_width: non_empty(watermark.max_width()),
        opacity: non_empty(watermark.opacity()),
        sizing_policy: non_empty(watermark.sizing_policy()),
        target: non_empty(watermark.target()),
        vertical_align: non_empty(watermark.vertical_align()),
        vertical_offset: non_empty(watermark.vertical_offset()),
    }
}

pub fn expand_video(video: &VideoParams) -> sdk::VideoParameters {
    let codec_options: HashMap<String, String> = video
        .codec_options
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    sdk::VideoParameters::builder()
        .set_aspect_ratio(video.aspect_ratio.clone())
        .set_bit_rate(video.bit_rate.clone())
        .set_codec(video.codec.clone())
        .set_codec_options((!codec_options.is_empty()).then_some(codec_options))
        .set_display_aspect_ratio(video.display_aspect_ratio.clone())
        .set_fixed_gop(video.fixed_gop.clone())
        .set_frame_rate(video.frame_rate.clone())
        .set_keyframes_max_dist(video.keyframes_max_dist.clone())
        .set_max_frame_rate(video.max_frame_rate.clone())
        .set_max_height(video.max_height.clone())
        .set_max_width(video.max_width.clone())
        .set_padding_policy(video.padding_policy.clone())
        .set_resolution(video.resolution.clone())
        .set_sizing_policy(video.sizing_policy.clone())
        .set_watermarks(non_empty_vec(
            video.watermarks.iter().map(expand_watermark).collect(),
        ))
        .build()
}

pub fn flatten_video(video: Option<&sdk::VideoParameters>) -> Option<VideoParams> {
    let v = video?;
    let flat = VideoParams {
        aspect_ratio: non_empty(v.aspect_ratio()),
        bit_rate: non_empty(v.bit_rate()),
        codec: non_empty(v.codec()),
        codec_options: v
            .codec_options()
            .map(|o| {
                o.iter()
                    .filter(|(_, v)| !v.is_empty())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default(),
        display_aspect_ratio: non_empty(v.display_aspect_ratio()),
        fixed_gop: non_empty(v.fixed_gop()),
        frame_rate: non_empty(v.frame_rate()),
        keyframes_max_dist: non_empty(v.keyframes_max_dist()),
        max_frame_rate: non_empty(v.max_frame_rate()),
        max_height: non_empty(v.max_height()),
        max_width: non_empty(v.max_width()),
        padding_policy: non_empty(v.padding_policy()),
        resolution: non_empty(v.resolution()),
        sizing_policy: non_empty(v.sizing_policy()),
        watermarks: v.watermarks().iter().map(flatten_watermark).collect(),
    };
    (!flat.is_empty()).then_some(flat)
}

pub fn expand_thumbnails(thumbnails: &ThumbnailParams) -> sdk::Thumbnails {
    sdk::Thumbnails::builder()
        .set_aspect_ratio(thumbnails.aspect_ratio.clone())
        .set_format(thumbnails.format.clone())
        .set_interval(thumbnails.interval.clone())
        .set_max_height(thumbnails.max_height.clone())
        .set_max_width(thumbnails.max_width.clone())
        .set_padding_policy(thumbnails.padding_policy.clone())
        .set_resolution(thumbnails.resolution.clone())
        .set_sizing_policy(thumbnails.sizing_policy.clone())
        .build()
}

pub fn flatten_thumbnails(thumbnails: Option<&sdk::Thumbnails>) -> Option<ThumbnailParams> {
    let t = thumbnails?;
    let flat = ThumbnailParams {
        aspect_ratio: non_empty(t.aspect_ratio()),
        format: non_empty(t.format()),
        interval: non_empty(t.interval()),
        max_height: non_empty(t.max_height()),
        max_width: non_empty(t.max_width()),
        padding_policy: non_empty(t.padding_policy()),
        resolution: non_empty(t.resolution()),
        sizing_policy: non_empty(t.sizing_policy()),
    };
    (!flat.is_empty()).then_some(flat)
}

/// Observed state of a preset.
pub fn flatten_preset(preset: &sdk::Preset) -> PresetConfig {
    PresetConfig {
        arn: non_empty(preset.arn()),
        audio: flatten_audio(preset.audio()),
        container: preset.container().unwrap_or_default().to_string(),
        description: non_empty(preset.description()),
        name: preset.name().unwrap_or_default().to_string(),
        preset_type: non_empty(preset.r#type()),
        thumbnails: flatten_thumbnails(preset.thumbnails()),
        video: flatten_video(preset.video()),
    }
}
