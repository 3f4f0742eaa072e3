//! Work item fetch interface consumed by the projector.

use async_trait::async_trait;

use super::models::RawWorkItem;
use crate::error::IntegrationResult;

/// Source of raw work items with relation data included.
///
/// Implementations must return relations inline (the equivalent of
/// `$expand=relations`) and must return an empty list for an empty ID set
/// without touching the network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkItemGateway: Send + Sync {
    /// Fetch one work item.
    async fn get_by_id(&self, id: i32) -> IntegrationResult<RawWorkItem>;

    /// Fetch several work items, in the order of `ids`.
    async fn get_by_ids(&self, ids: &[i32]) -> IntegrationResult<Vec<RawWorkItem>>;
}
