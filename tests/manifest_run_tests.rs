//! Manifest-level runs: parse a manifest, apply it, re-apply it, destroy it.

#![cfg(feature = "aws")]

mod common;

use pretty_assertions::assert_eq;

use transcoder_iac::prelude::*;

use common::{context, FakeTranscoder};

const SITE: &str = r#"
- name: Media pipeline
  aws_elastictranscoder_pipeline:
    name: media
    input_bucket: uploads
    output_bucket: transcoded
    role: arn:aws:iam::123456789012:role/Elastic_Transcoder_Default_Role
    notifications:
      error: arn:aws:sns:us-east-1:123456789012:transcode-errors

- name: Web preset
  aws_elastictranscoder_preset:
    name: web-720p
    container: mp4
    audio:
      codec: AAC
      bitrate: 128
      channels: 2
      sample_rate: 44100
    thumbnails:
      format: png
      interval: 60
      max_width: 192
      max_height: 108
      sizing_policy: ShrinkToFit
      padding_policy: NoPad
"#;

fn run(
    executor: &Executor,
    manifest: &Manifest,
    mode: RunMode,
) -> (Recap, Vec<(String, ModuleStatus)>) {
    let mut seen = Vec::new();
    let recap = tokio::task::block_in_place(|| {
        executor.run(manifest, mode, |outcome| {
            seen.push((outcome.name.clone(), outcome.status()));
        })
    });
    (recap, seen)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_reapply_destroy() {
    let fake = FakeTranscoder::new();
    let manifest = Manifest::parse(SITE, "site.yml").unwrap();
    let executor = Executor::new(ModuleRegistry::with_builtins(), context(&fake));

    manifest.validate(&ModuleRegistry::with_builtins()).unwrap();

    let (recap, seen) = run(&executor, &manifest, RunMode::Apply);
    assert_eq!(recap.changed, 2);
    assert!(!recap.has_failures());
    assert_eq!(
        seen,
        vec![
            ("Media pipeline".to_string(), ModuleStatus::Changed),
            ("Web preset".to_string(), ModuleStatus::Changed),
        ]
    );
    assert_eq!(fake.pipelines().len(), 1);
    assert_eq!(fake.presets().len(), 1);

    let (recap, _) = run(&executor, &manifest, RunMode::Apply);
    assert_eq!(recap.ok, 2);
    assert_eq!(recap.changed, 0);

    let (recap, seen) = run(&executor, &manifest, RunMode::Destroy);
    assert_eq!(recap.changed, 2);
    assert_eq!(seen[0].0, "Web preset");
    assert_eq!(seen[1].0, "Media pipeline");
    assert!(fake.pipelines().is_empty());
    assert!(fake.presets().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_task_does_not_stop_the_run() {
    let fake = FakeTranscoder::new();
    let broken = SITE.replace("output_bucket: transcoded", "output_bucket: transcoded\n    content_config:\n      bucket: other");
    let manifest = Manifest::parse(&broken, "site.yml").unwrap();
    let executor = Executor::new(ModuleRegistry::with_builtins(), context(&fake));

    let (recap, seen) = run(&executor, &manifest, RunMode::Apply);

    assert_eq!(recap.failed, 1);
    assert_eq!(recap.changed, 1);
    assert_eq!(seen[0].1, ModuleStatus::Failed);
    assert!(fake.pipelines().is_empty());
    assert_eq!(fake.presets().len(), 1);
}

#[test]
fn test_validate_reports_invalid_task_offline() {
    let broken = SITE.replace("name: media\n", "name: media pipeline\n");
    let manifest = Manifest::parse(&broken, "site.yml").unwrap();

    let err = manifest
        .validate(&ModuleRegistry::with_builtins())
        .unwrap_err();

    assert!(matches!(err, Error::TaskFailed { .. }));
    assert!(err.to_string().contains("Media pipeline"));
}
