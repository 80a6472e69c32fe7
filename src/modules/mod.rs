//! Module system for transcoder-iac
//!
//! This module provides the core traits, types, and registry for the module system.
//! Modules are the units a manifest task invokes; each one drives the lifecycle of
//! one kind of remote resource.

pub mod cloud;

#[cfg(feature = "aws")]
use crate::modules::cloud::aws::elastic_transcoder::{ApiError, TranscoderApi};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during module execution
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[cfg(feature = "aws")]
    #[error("Error {operation} {resource}: {source}")]
    ApiCall {
        /// What the lifecycle was doing, e.g. "creating"
        operation: &'static str,
        /// Resource description, e.g. "Elastic Transcoder pipeline 'media'"
        resource: String,
        #[source]
        source: ApiError,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl ModuleError {
    /// Returns true for errors raised before any remote call was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ModuleError::InvalidParameter(_)
                | ModuleError::MissingParameter(_)
                | ModuleError::ParseError(_)
        )
    }
}

/// Result type for module operations
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Status of a module execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    /// Module executed successfully and made changes
    Changed,
    /// Module executed successfully but no changes were needed
    Ok,
    /// Module execution failed
    Failed,
    /// Module was skipped (e.g., condition not met)
    Skipped,
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleStatus::Changed => write!(f, "changed"),
            ModuleStatus::Ok => write!(f, "ok"),
            ModuleStatus::Failed => write!(f, "failed"),
            ModuleStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Represents a difference between current and desired state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diff {
    /// Description of what will change
    pub before: String,
    /// Description of what it will change to
    pub after: String,
    /// Optional detailed diff (e.g., the list of changed attributes)
    pub details: Option<String>,
}

impl Diff {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Result of a module execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleOutput {
    /// Whether the module changed anything
    pub changed: bool,
    /// Human-readable message about what happened
    pub msg: String,
    /// Status of the execution
    pub status: ModuleStatus,
    /// Optional diff showing what changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<Diff>,
    /// Additional data returned by the module
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, serde_json::Value>,
}

impl ModuleOutput {
    fn with_status(changed: bool, msg: impl Into<String>, status: ModuleStatus) -> Self {
        Self {
            changed,
            msg: msg.into(),
            status,
            diff: None,
            data: HashMap::new(),
        }
    }

    /// Create a new successful output with no changes
    pub fn ok(msg: impl Into<String>) -> Self {
        Self::with_status(false, msg, ModuleStatus::Ok)
    }

    /// Create a new successful output with changes
    pub fn changed(msg: impl Into<String>) -> Self {
        Self::with_status(true, msg, ModuleStatus::Changed)
    }

    /// Create a failed output
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::with_status(false, msg, ModuleStatus::Failed)
    }

    /// Create a skipped output
    pub fn skipped(msg: impl Into<String>) -> Self {
        Self::with_status(false, msg, ModuleStatus::Skipped)
    }

    /// Add a diff to the output
    pub fn with_diff(mut self, diff: Diff) -> Self {
        self.diff = Some(diff);
        self
    }

    /// Add data to the output
    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

/// Parameters passed to a module
pub type ModuleParams = HashMap<String, serde_json::Value>;

/// Context for module execution
#[derive(Clone, Default)]
pub struct ModuleContext {
    /// Whether to run in check mode (dry run)
    pub check_mode: bool,
    /// Whether to show diffs
    pub diff_mode: bool,
    /// Region used when a task does not name one
    pub region: Option<String>,
    /// Client to use for remote operations; built from the region when unset
    #[cfg(feature = "aws")]
    pub client: Option<Arc<dyn TranscoderApi>>,
}

impl std::fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ModuleContext");
        s.field("check_mode", &self.check_mode)
            .field("diff_mode", &self.diff_mode)
            .field("region", &self.region);
        #[cfg(feature = "aws")]
        s.field("client", &self.client.as_ref().map(|_| "<transcoder client>"));
        s.finish()
    }
}

impl ModuleContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    pub fn with_diff_mode(mut self, diff_mode: bool) -> Self {
        self.diff_mode = diff_mode;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[cfg(feature = "aws")]
    pub fn with_client(mut self, client: Arc<dyn TranscoderApi>) -> Self {
        self.client = Some(client);
        self
    }
}

/// Trait that all modules must implement
pub trait Module: Send + Sync {
    /// Returns the name of the module
    fn name(&self) -> &'static str;

    /// Returns a description of what the module does
    fn description(&self) -> &'static str;

    /// Execute the module with the given parameters
    fn execute(&self, params: &ModuleParams, context: &ModuleContext)
        -> ModuleResult<ModuleOutput>;

    /// Check what would change without making changes (for check mode)
    fn check(&self, params: &ModuleParams, context: &ModuleContext) -> ModuleResult<ModuleOutput> {
        let check_context = ModuleContext {
            check_mode: true,
            ..context.clone()
        };
        self.execute(params, &check_context)
    }

    /// Validate the parameters before execution
    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        let _ = params;
        Ok(())
    }

    /// Returns the list of required parameters
    fn required_params(&self) -> &[&'static str] {
        &[]
    }
}

/// Helper trait for extracting parameters
pub trait ParamExt {
    fn get_string(&self, key: &str) -> ModuleResult<Option<String>>;

    /// Deserialize every parameter except `reserved` into a typed config.
    ///
    /// Scalars are stringified first, since every leaf of the Elastic
    /// Transcoder model is a string while YAML happily reads `bitrate: 128`
    /// as a number. Numbers are re-rendered from their parsed value, so
    /// `frame_rate: 29.970` is sent as `"29.97"`; a value that must reach the
    /// service exactly as written has to be quoted. Whole-number floats such
    /// as `interval: 1e2` are sent as integers.
    fn get_typed<T: DeserializeOwned>(&self, reserved: &[&str]) -> ModuleResult<T>;
}

impl ParamExt for ModuleParams {
    fn get_string(&self, key: &str) -> ModuleResult<Option<String>> {
        match self.get(key) {
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(serde_json::Value::Null) | None => Ok(None),
            Some(v @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => {
                Ok(Some(v.to_string()))
            }
            Some(_) => Err(ModuleError::InvalidParameter(format!(
                "{} must be a string",
                key
            ))),
        }
    }

    fn get_typed<T: DeserializeOwned>(&self, reserved: &[&str]) -> ModuleResult<T> {
        let object: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .filter(|(k, _)| !reserved.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), stringify_scalars(v.clone())))
            .collect();

        serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| ModuleError::InvalidParameter(e.to_string()))
    }
}

fn render_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

fn stringify_scalars(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Number(n) => Value::String(render_number(&n)),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(stringify_scalars).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, stringify_scalars(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Registry for looking up modules by name
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Create a registry with all built-in modules
    pub fn with_builtins() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "aws")]
        {
            use crate::modules::cloud::aws::elastic_transcoder::{
                ElasticTranscoderPipelineModule, ElasticTranscoderPresetModule,
            };
            registry.register(Arc::new(ElasticTranscoderPipelineModule));
            registry.register(Arc::new(ElasticTranscoderPresetModule));
        }

        registry
    }

    /// Register a module
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.insert(module.name().to_string(), module);
    }

    /// Get a module by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules.get(name).cloned()
    }

    /// Check if a module exists
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Get all module names
    pub fn names(&self) -> Vec<&str> {
        self.modules.keys().map(|s| s.as_str()).collect()
    }

    /// Validate parameters for a module without executing it
    pub fn validate(&self, name: &str, params: &ModuleParams) -> ModuleResult<()> {
        let module = self
            .get(name)
            .ok_or_else(|| ModuleError::NotFound(name.to_string()))?;

        for param in module.required_params() {
            if !params.contains_key(*param) {
                return Err(ModuleError::MissingParameter((*param).to_string()));
            }
        }

        module.validate_params(params)
    }

    /// Execute a module by name
    pub fn execute(
        &self,
        name: &str,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        self.validate(name, params)?;

        let module = self
            .get(name)
            .ok_or_else(|| ModuleError::NotFound(name.to_string()))?;

        if context.check_mode {
            module.check(params, context)
        } else {
            module.execute(params, context)
        }
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestModule;

    impl Module for TestModule {
        fn name(&self) -> &'static str {
            "test"
        }

        fn description(&self) -> &'static str {
            "A test module"
        }

        fn execute(
            &self,
            params: &ModuleParams,
            context: &ModuleContext,
        ) -> ModuleResult<ModuleOutput> {
            if context.check_mode {
                return Ok(ModuleOutput::ok("Would do something"));
            }

            let msg = params
                .get_string("msg")?
                .unwrap_or_else(|| "Hello".to_string());
            Ok(ModuleOutput::changed(msg))
        }

        fn required_params(&self) -> &[&'static str] {
            &["msg"]
        }
    }

    #[test]
    fn test_module_registry() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule));

        assert!(registry.contains("test"));
        assert!(!registry.contains("nonexistent"));

        let module = registry.get("test").unwrap();
        assert_eq!(module.name(), "test");
    }

    #[test]
    fn test_registry_checks_required_params() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule));

        let err = registry
            .execute("test", &ModuleParams::new(), &ModuleContext::new())
            .unwrap_err();
        assert!(matches!(err, ModuleError::MissingParameter(p) if p == "msg"));
    }

    #[test]
    fn test_registry_dispatches_check_mode() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule));

        let mut params = ModuleParams::new();
        params.insert("msg".to_string(), serde_json::json!("hi"));

        let output = registry
            .execute("test", &params, &ModuleContext::new().with_check_mode(true))
            .unwrap();
        assert!(!output.changed);

        let output = registry
            .execute("test", &params, &ModuleContext::new())
            .unwrap();
        assert!(output.changed);
        assert_eq!(output.msg, "hi");
    }

    #[test]
    fn test_module_output() {
        let output = ModuleOutput::changed("Something changed")
            .with_data("key", serde_json::json!("value"))
            .with_diff(Diff::new("old", "new"));

        assert!(output.changed);
        assert_eq!(output.status, ModuleStatus::Changed);
        assert!(output.diff.is_some());
        assert!(output.data.contains_key("key"));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Sample {
        name: String,
        bitrate: Option<String>,
        tags: Vec<String>,
    }

    #[test]
    fn test_get_typed_stringifies_scalars_and_skips_reserved() {
        let mut params = ModuleParams::new();
        params.insert("name".to_string(), serde_json::json!("web"));
        params.insert("bitrate".to_string(), serde_json::json!(128));
        params.insert("tags".to_string(), serde_json::json!([1, true, "x"]));
        params.insert("state".to_string(), serde_json::json!("present"));

        let sample: Sample = params.get_typed(&["state"]).unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "web".to_string(),
                bitrate: Some("128".to_string()),
                tags: vec!["1".to_string(), "true".to_string(), "x".to_string()],
            }
        );
    }

    #[test]
    fn test_get_typed_renders_numbers() {
        let params: ModuleParams = serde_yaml::from_str(
            "name: web\nbitrate: 128.0\ntags: [29.970, \"29.970\", -2.0, 0.5]\n",
        )
        .unwrap();

        let sample: Sample = params.get_typed(&[]).unwrap();
        assert_eq!(sample.bitrate.as_deref(), Some("128"));
        assert_eq!(sample.tags, vec!["29.97", "29.970", "-2", "0.5"]);
    }

    #[test]
    fn test_get_typed_rejects_unknown_keys() {
        let mut params = ModuleParams::new();
        params.insert("name".to_string(), serde_json::json!("web"));
        params.insert("tags".to_string(), serde_json::json!([]));
        params.insert("colour".to_string(), serde_json::json!("blue"));

        let err = params.get_typed::<Sample>(&[]).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_get_string() {
        let mut params = ModuleParams::new();
        params.insert("s".to_string(), serde_json::json!("hello"));
        params.insert("n".to_string(), serde_json::json!(42));
        params.insert("a".to_string(), serde_json::json!(["x"]));

        assert_eq!(params.get_string("s").unwrap(), Some("hello".to_string()));
        assert_eq!(params.get_string("n").unwrap(), Some("42".to_string()));
        assert_eq!(params.get_string("missing").unwrap(), None);
        assert!(params.get_string("a").is_err());
    }
}
