//! Issue tracker integrations.
//!
//! - **Azure DevOps** - Work item fetch, WIQL query, update and hierarchy projection
//! - **Jira** - Atlassian Jira Data Center issue creation and lookup
//!
//! # Example
//!
//! ```no_run
//! use sdlc_integrations::pm::azure_devops::{AzureDevOpsClient, LoadOptions};
//! use sdlc_integrations::AdoConnection;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> sdlc_integrations::IntegrationResult<()> {
//! let conn = AdoConnection::from_env("https://dev.azure.com/acme", "Web", "AZURE_DEVOPS_PAT")?;
//! let client = AzureDevOpsClient::new(conn)?;
//! let item = client
//!     .get_work_item_model(100, LoadOptions::all(), &CancellationToken::new())
//!     .await?;
//! println!("{} has {} children", item.id, item.children.map_or(0, |c| c.len()));
//! # Ok(())
//! # }
//! ```

pub mod azure_devops;
pub mod jira;
