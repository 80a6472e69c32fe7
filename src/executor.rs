//! Sequential manifest execution.

use serde::Serialize;

use crate::manifest::{Manifest, Task};
use crate::modules::{ModuleContext, ModuleError, ModuleOutput, ModuleRegistry, ModuleStatus};

/// How a manifest is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Tasks in order, as declared.
    Apply,
    /// Tasks in reverse order with `state: absent`.
    Destroy,
}

/// Result of one task.
#[derive(Debug)]
pub struct TaskOutcome {
    pub name: String,
    pub module: String,
    pub result: Result<ModuleOutput, ModuleError>,
}

impl TaskOutcome {
    pub fn status(&self) -> ModuleStatus {
        match &self.result {
            Ok(output) => output.status,
            Err(_) => ModuleStatus::Failed,
        }
    }
}

/// Per-status task counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Recap {
    pub ok: usize,
    pub changed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Recap {
    pub fn record(&mut self, status: ModuleStatus) {
        match status {
            ModuleStatus::Ok => self.ok += 1,
            ModuleStatus::Changed => self.changed += 1,
            ModuleStatus::Failed => self.failed += 1,
            ModuleStatus::Skipped => self.skipped += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Runs manifest tasks one after another through a [`ModuleRegistry`].
pub struct Executor {
    registry: ModuleRegistry,
    context: ModuleContext,
}

impl Executor {
    pub fn new(registry: ModuleRegistry, context: ModuleContext) -> Self {
        Self { registry, context }
    }

    pub fn context(&self) -> &ModuleContext {
        &self.context
    }

    /// Run every task, reporting each outcome through `on_task` as it
    /// completes. A failed task does not stop the run.
    pub fn run<F>(&self, manifest: &Manifest, mode: RunMode, mut on_task: F) -> Recap
    where
        F: FnMut(&TaskOutcome),
    {
        let tasks: Vec<&Task> = match mode {
            RunMode::Apply => manifest.tasks.iter().collect(),
            RunMode::Destroy => manifest.tasks.iter().rev().collect(),
        };

        let mut recap = Recap::default();
        for task in tasks {
            let outcome = self.run_task(task, mode);
            recap.record(outcome.status());
            on_task(&outcome);
        }
        recap
    }

    fn run_task(&self, task: &Task, mode: RunMode) -> TaskOutcome {
        let mut params = task.params.clone();
        if mode == RunMode::Destroy {
            params.insert("state".to_string(), serde_json::json!("absent"));
        }

        tracing::info!("Running task '{}' ({})", task.name, task.module);
        let result = self.registry.execute(&task.module, &params, &self.context);
        if let Err(e) = &result {
            tracing::error!("Task '{}' failed: {}", task.name, e);
        }

        TaskOutcome {
            name: task.name.clone(),
            module: task.module.clone(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{Module, ModuleParams, ModuleResult, ParamExt};
    use std::sync::{Arc, Mutex};

    struct Recorder {
        seen: Arc<Mutex<Vec<(String, Option<String>)>>>,
    }

    impl Module for Recorder {
        fn name(&self) -> &'static str {
            "record"
        }

        fn description(&self) -> &'static str {
            "Records invocations"
        }

        fn execute(
            &self,
            params: &ModuleParams,
            _context: &ModuleContext,
        ) -> ModuleResult<ModuleOutput> {
            let id = params.get_string("id")?.unwrap_or_default();
            let state = params.get_string("state")?;
            self.seen.lock().unwrap().push((id.clone(), state));
            if id == "bad" {
                return Err(ModuleError::ExecutionFailed("boom".to_string()));
            }
            Ok(ModuleOutput::changed(id))
        }
    }

    fn executor() -> (Executor, Arc<Mutex<Vec<(String, Option<String>)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(Recorder { seen: seen.clone() }));
        (Executor::new(registry, ModuleContext::new()), seen)
    }

    fn manifest(ids: &[&str]) -> Manifest {
        let yaml: String = ids
            .iter()
            .map(|id| format!("- record: {{id: {}}}\n", id))
            .collect();
        Manifest::parse(&yaml, "test.yml").unwrap()
    }

    #[test]
    fn test_apply_runs_in_order_and_continues_after_failure() {
        let (executor, seen) = executor();
        let mut names = Vec::new();

        let recap = executor.run(&manifest(&["a", "bad", "c"]), RunMode::Apply, |outcome| {
            names.push(outcome.name.clone());
        });

        assert_eq!(recap.changed, 2);
        assert_eq!(recap.failed, 1);
        assert!(recap.has_failures());
        assert_eq!(names.len(), 3);

        let ids: Vec<String> = seen.lock().unwrap().iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(ids, vec!["a", "bad", "c"]);
    }

    #[test]
    fn test_destroy_reverses_and_forces_absent() {
        let (executor, seen) = executor();

        let recap = executor.run(&manifest(&["a", "b"]), RunMode::Destroy, |_| {});
        assert!(!recap.has_failures());

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                ("b".to_string(), Some("absent".to_string())),
                ("a".to_string(), Some("absent".to_string())),
            ]
        );
    }
}
