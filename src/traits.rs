//! Core traits for managed resources.
//!
//! A resource type is described by two halves: its declarative configuration
//! ([`ResourceConfig`]) and the lifecycle that maps that configuration onto a
//! remote API ([`Resource`]). The host in [`crate::resource`] drives the
//! lifecycle and decides which of the four operations to run.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::{Debug, Display};

use crate::modules::ModuleResult;
use crate::resource::ResourceData;

/// Declarative configuration of one resource.
///
/// The same type doubles as the observed state: Read flattens the remote
/// object into a value of this type, and [`ResourceConfig::diff`] compares the
/// declared value against it.
pub trait ResourceConfig:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// One top-level attribute; the unit of change for partial updates.
    type Attribute: Copy + Debug + Display + PartialEq + Send + Sync + 'static;

    /// Name used to find an existing resource when no id is known.
    fn resource_name(&self) -> &str;

    /// Checks that must pass before any remote call is made.
    fn validate(&self) -> ModuleResult<()>;

    /// The declared value with empty strings and empty blocks treated as
    /// unset, the same shape Read produces for the observed state.
    fn normalized(self) -> Self {
        self
    }

    /// Attributes whose declared value differs from `observed`.
    ///
    /// With no observed state every declared attribute is reported.
    fn diff(&self, observed: Option<&Self>) -> Vec<Self::Attribute>;
}

/// The four-operation lifecycle of a remote resource.
///
/// Every operation works on a [`ResourceData`] record: `create` sets its id,
/// `read` refreshes (or clears) its observed state, `update` pushes the
/// declared changes and `delete` clears the id.
#[async_trait]
pub trait Resource: Send + Sync {
    type Config: ResourceConfig;

    /// Human-readable type name, used in messages and errors.
    fn type_name(&self) -> &'static str;

    async fn create(&self, data: &mut ResourceData<Self::Config>) -> ModuleResult<()>;

    /// Refresh observed state. A resource that no longer exists clears the
    /// record's identity instead of failing.
    async fn read(&self, data: &mut ResourceData<Self::Config>) -> ModuleResult<()>;

    async fn update(&self, data: &mut ResourceData<Self::Config>) -> ModuleResult<()>;

    async fn delete(&self, data: &mut ResourceData<Self::Config>) -> ModuleResult<()>;

    /// Look up the id of an existing resource by name.
    ///
    /// More than one match is an error.
    async fn find_id_by_name(&self, name: &str) -> ModuleResult<Option<String>>;
}
