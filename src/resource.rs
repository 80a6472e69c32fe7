//! Resource records and the reconciliation loop.
//!
//! [`reconcile`] is the host side of the lifecycle: it refreshes the record,
//! diffs declared against observed state and runs whichever of
//! create/update/delete is needed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::modules::{ModuleError, ModuleResult};
use crate::traits::{Resource, ResourceConfig};

/// Identity, declared configuration and observed state of one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceData<C> {
    id: Option<String>,
    config: C,
    state: Option<C>,
    warnings: Vec<String>,
}

impl<C: ResourceConfig> ResourceData<C> {
    pub fn new(config: C) -> Self {
        Self {
            id: None,
            config,
            state: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The id, or an error naming the operation that needed it.
    pub fn require_id(&self, operation: &str) -> ModuleResult<&str> {
        self.id().ok_or_else(|| {
            ModuleError::ExecutionFailed(format!("cannot {} a resource without an id", operation))
        })
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Forget the remote object: clears both the id and the observed state.
    pub fn clear_id(&mut self) {
        self.id = None;
        self.state = None;
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn state(&self) -> Option<&C> {
        self.state.as_ref()
    }

    pub fn set_state(&mut self, state: C) {
        self.state = Some(state);
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Declared attributes that differ from the observed state.
    pub fn changed_attributes(&self) -> Vec<C::Attribute> {
        self.config.diff(self.state.as_ref())
    }
}

/// Whether a resource should exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

impl FromStr for DesiredState {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(DesiredState::Present),
            "absent" => Ok(DesiredState::Absent),
            _ => Err(ModuleError::InvalidParameter(format!(
                "Invalid state '{}'. Valid states: present, absent",
                s
            ))),
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesiredState::Present => write!(f, "present"),
            DesiredState::Absent => write!(f, "absent"),
        }
    }
}

/// What reconciliation did (or, in check mode, would do).
#[derive(Debug, Clone, PartialEq)]
pub enum Action<A> {
    Created,
    Updated(Vec<A>),
    Deleted,
    Unchanged,
    /// The resource should not exist and does not.
    Absent,
}

impl<A> Action<A> {
    pub fn changed(&self) -> bool {
        matches!(self, Action::Created | Action::Updated(_) | Action::Deleted)
    }
}

/// Outcome of [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation<C: ResourceConfig> {
    pub action: Action<C::Attribute>,
    /// Observed state after the refresh and before any change.
    pub before: Option<C>,
}

/// Bring one resource to its desired state.
///
/// Validation happens before any remote call. When `check_mode` is set the
/// refresh still runs but no mutating operation is issued.
pub async fn reconcile<R>(
    resource: &R,
    data: &mut ResourceData<R::Config>,
    desired: DesiredState,
    check_mode: bool,
) -> ModuleResult<Reconciliation<R::Config>>
where
    R: Resource + ?Sized,
{
    if desired == DesiredState::Present {
        data.config().validate()?;
    }

    if data.id().is_none() {
        let name = data.config().resource_name().to_string();
        if let Some(id) = resource.find_id_by_name(&name).await? {
            tracing::debug!("Found {} '{}' with id {}", resource.type_name(), name, id);
            data.set_id(id);
        }
    }

    if data.id().is_some() {
        resource.read(data).await?;
    }

    let before = data.state().cloned();

    let action = match (desired, data.id().is_some()) {
        (DesiredState::Present, false) => {
            if !check_mode {
                resource.create(data).await?;
            }
            Action::Created
        }
        (DesiredState::Present, true) => {
            let changed = data.changed_attributes();
            if changed.is_empty() {
                Action::Unchanged
            } else {
                if !check_mode {
                    resource.update(data).await?;
                }
                Action::Updated(changed)
            }
        }
        (DesiredState::Absent, true) => {
            if !check_mode {
                resource.delete(data).await?;
            }
            Action::Deleted
        }
        (DesiredState::Absent, false) => Action::Absent,
    };

    Ok(Reconciliation { action, before })
}
