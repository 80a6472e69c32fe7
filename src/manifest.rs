//! Manifest parsing.
//!
//! A manifest is a YAML list of tasks. Each task names one module and its
//! parameters, plus an optional display name:
//!
//! ```yaml
//! - name: Media pipeline
//!   aws_elastictranscoder_pipeline:
//!     name: media
//!     input_bucket: uploads
//!     output_bucket: transcoded
//!     role: arn:aws:iam::123456789012:role/transcoder
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::modules::{ModuleParams, ModuleRegistry};

/// One task of a manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Display name
    pub name: String,
    /// Module to invoke
    pub module: String,
    /// Module parameters
    pub params: ModuleParams,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    name: Option<String>,
    #[serde(flatten)]
    rest: BTreeMap<String, serde_json::Value>,
}

/// A parsed manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    /// File the manifest was read from, if any
    pub path: Option<PathBuf>,
    pub tasks: Vec<Task>,
}

impl Manifest {
    /// Read and parse a manifest file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Parse manifest YAML; `path` is used for error messages.
    pub fn parse(content: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw: Vec<RawTask> = serde_yaml::from_str(content).map_err(|e| {
            Error::manifest_parse(path, "invalid YAML", Some(Box::new(e)))
        })?;

        let tasks = raw
            .into_iter()
            .enumerate()
            .map(|(index, task)| Self::parse_task(index, task))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            tasks,
        })
    }

    fn parse_task(index: usize, task: RawTask) -> Result<Task> {
        let mut entries = task.rest.into_iter();
        let (module, params) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => {
                return Err(Error::ManifestValidation(format!(
                    "task {} does not name a module",
                    index + 1
                )))
            }
            (Some((first, _)), Some((second, _))) => {
                return Err(Error::ManifestValidation(format!(
                    "task {} names more than one module ('{}', '{}')",
                    index + 1,
                    first,
                    second
                )))
            }
        };

        let params: ModuleParams = match params {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            serde_json::Value::Null => ModuleParams::new(),
            _ => {
                return Err(Error::module_args(
                    &module,
                    format!("parameters of task {} must be a mapping", index + 1),
                ))
            }
        };

        let name = task.name.unwrap_or_else(|| match params.get("name") {
            Some(serde_json::Value::String(n)) => format!("{} {}", module, n),
            _ => module.clone(),
        });

        Ok(Task {
            name,
            module,
            params,
        })
    }

    /// Check every task against the registry without running anything.
    pub fn validate(&self, registry: &ModuleRegistry) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(Error::ManifestValidation("manifest has no tasks".to_string()));
        }

        for task in &self.tasks {
            if !registry.contains(&task.module) {
                return Err(Error::ModuleNotFound(task.module.clone()));
            }
            registry
                .validate(&task.module, &task.params)
                .map_err(|e| Error::task_failed(&task.name, e))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"
- name: Media pipeline
  aws_elastictranscoder_pipeline:
    name: media
    input_bucket: uploads
    output_bucket: transcoded
    role: arn:aws:iam::123456789012:role/transcoder

- aws_elastictranscoder_preset:
    name: web-720p
    container: mp4
    audio:
      codec: AAC
      bitrate: 128
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(MANIFEST, "site.yml").unwrap();
        assert_eq!(manifest.tasks.len(), 2);

        let pipeline = &manifest.tasks[0];
        assert_eq!(pipeline.name, "Media pipeline");
        assert_eq!(pipeline.module, "aws_elastictranscoder_pipeline");
        assert_eq!(pipeline.params["input_bucket"], serde_json::json!("uploads"));

        let preset = &manifest.tasks[1];
        assert_eq!(preset.name, "aws_elastictranscoder_preset web-720p");
        assert_eq!(preset.params["audio"]["bitrate"], serde_json::json!(128));
    }

    #[test]
    fn test_task_must_name_exactly_one_module() {
        let err = Manifest::parse("- name: nothing\n", "m.yml").unwrap_err();
        assert!(err.to_string().contains("does not name a module"));

        let err = Manifest::parse("- a: {}\n  b: {}\n", "m.yml").unwrap_err();
        assert!(err.to_string().contains("more than one module"));
    }

    #[test]
    fn test_params_must_be_mapping() {
        let err = Manifest::parse("- aws_elastictranscoder_pipeline: [1, 2]\n", "m.yml")
            .unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Manifest::parse("- [unclosed", "broken.yml").unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
        assert!(err.to_string().contains("broken.yml"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.yml");
        std::fs::write(&path, MANIFEST).unwrap();

        let manifest = Manifest::from_file(&path).unwrap();
        assert_eq!(manifest.path.as_deref(), Some(path.as_path()));
        assert!(matches!(
            Manifest::from_file(dir.path().join("missing.yml")),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_module() {
        let manifest = Manifest::parse("- aws_s3: {bucket: x}\n", "m.yml").unwrap();
        let err = manifest.validate(&ModuleRegistry::new()).unwrap_err();
        assert!(matches!(err, Error::ModuleNotFound(m) if m == "aws_s3"));
    }

    #[test]
    fn test_validate_rejects_empty_manifest() {
        let manifest = Manifest::parse("[]", "m.yml").unwrap();
        assert!(manifest.validate(&ModuleRegistry::new()).is_err());
    }
}
