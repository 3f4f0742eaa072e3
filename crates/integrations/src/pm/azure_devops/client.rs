//! Azure DevOps REST client.
//!
//! API Documentation: <https://learn.microsoft.com/en-us/rest/api/azure/devops/wit/work-items>

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::gateway::WorkItemGateway;
use super::models::{
    PatchOperation, RawWorkItem, WiqlRequest, WiqlResult, WorkItemList, WorkItemModel, WorkItemType,
};
use super::options::LoadOptions;
use super::projector::{WorkItemProjector, DEFAULT_MAX_DEPTH};
use crate::cancel::guarded;
use crate::config::AdoConnection;
use crate::error::{IntegrationError, IntegrationResult};

const API_VERSION: &str = "7.0";

/// Maximum IDs the batch endpoint accepts per request.
const BATCH_LIMIT: usize = 200;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const JSON_PATCH: &str = "application/json-patch+json";

/// Azure DevOps work item client.
#[derive(Clone)]
pub struct AzureDevOpsClient {
    client: Client,
    connection: AdoConnection,
    max_depth: usize,
}

impl AzureDevOpsClient {
    /// Create a client for the organization and project in `connection`.
    pub fn new(connection: AdoConnection) -> IntegrationResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            connection,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    /// Projection depth used by the `*_model*` methods.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn project(&self) -> &str {
        &self.connection.project
    }

    fn project_url(&self, path: &str) -> String {
        format!(
            "{}/{}/_apis/wit/{path}",
            self.connection.organization_url,
            urlencoding::encode(&self.connection.project)
        )
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .basic_auth("", Some(&self.connection.pat))
            .query(&[("api-version", API_VERSION)])
    }

    /// Fetch one work item with its relations.
    #[instrument(skip(self))]
    pub async fn get_work_item(&self, id: i32) -> IntegrationResult<RawWorkItem> {
        let url = self.project_url(&format!("workitems/{id}"));
        debug!(url = %url, "GET work item");

        let response = self
            .authed(self.client.get(&url))
            .query(&[("$expand", "relations")])
            .send()
            .await?;

        handle_response(response).await
    }

    /// Fetch several work items with their relations, in input order.
    ///
    /// Requests are split into chunks of 200 IDs. An empty slice returns
    /// an empty list without a request.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_work_items(&self, ids: &[i32]) -> IntegrationResult<Vec<RawWorkItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let chunks = try_join_all(ids.chunks(BATCH_LIMIT).map(|chunk| self.get_batch(chunk))).await?;
        Ok(chunks.into_iter().flatten().collect())
    }

    async fn get_batch(&self, ids: &[i32]) -> IntegrationResult<Vec<RawWorkItem>> {
        let url = self.project_url("workitems");
        let joined = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        debug!(url = %url, count = ids.len(), "GET work item batch");

        let response = self
            .authed(self.client.get(&url))
            .query(&[("ids", joined.as_str()), ("$expand", "relations")])
            .send()
            .await?;

        let list: WorkItemList = handle_response(response).await?;
        Ok(list.value)
    }

    /// Run a WIQL query for every work item of `work_item_type` in the
    /// project and fetch the matches.
    #[instrument(skip(self))]
    pub async fn query_work_items_by_type(
        &self,
        work_item_type: WorkItemType,
    ) -> IntegrationResult<Vec<RawWorkItem>> {
        let query = format!(
            "SELECT [System.Id] FROM WorkItems WHERE [System.TeamProject] = '{}' AND [System.WorkItemType] = '{}'",
            escape_wiql(&self.connection.project),
            escape_wiql(work_item_type.as_str())
        );
        let url = self.project_url("wiql");
        debug!(url = %url, query = %query, "POST WIQL query");

        let response = self
            .authed(self.client.post(&url))
            .json(&WiqlRequest { query })
            .send()
            .await?;

        let result: WiqlResult = handle_response(response).await?;
        let ids: Vec<i32> = result.work_items.iter().map(|r| r.id).collect();
        info!(count = ids.len(), work_item_type = %work_item_type, "WIQL query matched");

        self.get_work_items(&ids).await
    }

    /// Set `fields` on a work item.
    #[instrument(skip(self, fields), fields(count = fields.len()))]
    pub async fn update_work_item(
        &self,
        id: i32,
        fields: &BTreeMap<String, Value>,
    ) -> IntegrationResult<RawWorkItem> {
        if fields.is_empty() {
            return Err(IntegrationError::InvalidArgument(
                "at least one field must be provided to update".to_string(),
            ));
        }

        let operations: Vec<PatchOperation> = fields
            .iter()
            .map(|(name, value)| PatchOperation::set_field(name, value.clone()))
            .collect();
        let url = format!(
            "{}/_apis/wit/workitems/{id}",
            self.connection.organization_url
        );
        debug!(url = %url, "PATCH work item");

        let response = self
            .authed(self.client.patch(&url))
            .header(CONTENT_TYPE, JSON_PATCH)
            .body(serde_json::to_vec(&operations)?)
            .send()
            .await?;

        let updated = handle_response(response).await?;
        info!(work_item_id = id, "Updated work item");
        Ok(updated)
    }

    /// Fetch a work item and project it with `options`.
    pub async fn get_work_item_model(
        &self,
        id: i32,
        options: LoadOptions,
        cancel: &CancellationToken,
    ) -> IntegrationResult<WorkItemModel> {
        self.projector(cancel).fetch_and_project(id, options).await
    }

    /// Query by type and project every match concurrently, keeping query
    /// order.
    pub async fn query_work_item_models_by_type(
        &self,
        work_item_type: WorkItemType,
        options: LoadOptions,
        cancel: &CancellationToken,
    ) -> IntegrationResult<Vec<WorkItemModel>> {
        let items = guarded(cancel, self.query_work_items_by_type(work_item_type)).await?;
        let projector = self.projector(cancel);
        try_join_all(items.iter().map(|item| projector.project(item, options))).await
    }

    fn projector(&self, cancel: &CancellationToken) -> WorkItemProjector<'_, Self> {
        WorkItemProjector::new(self)
            .with_max_depth(self.max_depth)
            .with_cancellation(cancel.clone())
    }
}

#[async_trait]
impl WorkItemGateway for AzureDevOpsClient {
    async fn get_by_id(&self, id: i32) -> IntegrationResult<RawWorkItem> {
        self.get_work_item(id).await
    }

    async fn get_by_ids(&self, ids: &[i32]) -> IntegrationResult<Vec<RawWorkItem>> {
        self.get_work_items(ids).await
    }
}

impl std::fmt::Debug for AzureDevOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDevOpsClient")
            .field("connection", &self.connection)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

fn escape_wiql(value: &str) -> String {
    value.replace('\'', "''")
}

/// Handle API response, parsing JSON or error.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> IntegrationResult<T> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, "Failed to parse Azure DevOps response");
            IntegrationError::Serialization(e)
        })
    } else if status == StatusCode::NOT_FOUND {
        Err(IntegrationError::NotFound(text))
    } else {
        warn!(status = status.as_u16(), "Azure DevOps request failed");
        Err(IntegrationError::Api {
            status: status.as_u16(),
            message: text,
        })
    }
}
