//! Azure DevOps integration.
//!
//! Raw work items come back from the REST API as a loosely typed field bag
//! plus a list of typed relation links. [`WorkItemProjector`] turns one of
//! those into a [`WorkItemModel`] tree, expanding children, parents,
//! commits and pull requests as selected by [`LoadOptions`].
//!
//! # Configuration
//!
//! - `AZURE_DEVOPS_PAT`: Personal access token (default variable name)

mod client;
pub mod fields;
mod gateway;
mod models;
mod options;
mod projector;
pub mod relations;

pub use client::AzureDevOpsClient;
pub use fields::{FieldLookup, FromFieldValue};
pub use gateway::WorkItemGateway;
pub use models::*;
pub use options::LoadOptions;
pub use projector::{WorkItemProjector, DEFAULT_MAX_DEPTH};
pub use relations::{classify, ClassifiedRelation};
