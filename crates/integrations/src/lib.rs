//! Azure DevOps and JIRA integration for SDLC automation.
//!
//! This crate provides:
//! - REST client for Azure DevOps work items (fetch, batch fetch, WIQL query, update)
//! - Work item projection: a bounded tree of children, parents, commits and pull requests
//! - REST client for JIRA Data Center issues with pre-flight validation
//! - Translation of an Azure DevOps work item into a JIRA issue

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Many async API methods can fail

pub mod cancel;
pub mod config;
pub mod error;
pub mod migration;
pub mod pm;

pub use config::{AdoConnection, JiraConnection};
pub use error::{IntegrationError, IntegrationResult, ValidationError};
pub use pm::azure_devops::{
    AzureDevOpsClient, LoadOptions, WorkItemGateway, WorkItemModel, WorkItemProjector,
    WorkItemType,
};
pub use pm::jira::JiraClient;
