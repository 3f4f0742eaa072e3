//! Work item projection.
//!
//! Turns a [`RawWorkItem`] into a [`WorkItemModel`] tree. Depth is bounded
//! explicitly: the root sits at depth 0 and only nodes shallower than
//! `max_depth` expand their relations. With the default bound of 1 the
//! root's children and parents are projected once more with every
//! expansion switched off, so the tree never exceeds two levels.
//!
//! Work items already on the path from the root, the root included, are
//! never expanded again, so self-links and hierarchy loops terminate.
//!
//! Children and parents are fetched concurrently. Each branch writes its
//! own field of the model, and every network call honours the projector's
//! cancellation token.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::fields::{self, get_field, FieldLookup, FromFieldValue};
use super::gateway::WorkItemGateway;
use super::models::{CommitInfo, PullRequestInfo, RawWorkItem, Relation, WorkItemModel};
use super::options::LoadOptions;
use super::relations::{classify, ClassifiedRelation};
use crate::cancel::guarded;
use crate::error::IntegrationResult;

/// Root plus one level of related items.
pub const DEFAULT_MAX_DEPTH: usize = 1;

#[derive(Debug, Clone, Copy)]
enum Hierarchy {
    Children,
    Parents,
}

impl Hierarchy {
    const fn label(self) -> &'static str {
        match self {
            Self::Children => "children",
            Self::Parents => "parents",
        }
    }

    /// Related IDs in relation order, deduplicated.
    fn related_ids(self, item: &RawWorkItem) -> Vec<i32> {
        let mut seen = HashSet::new();
        item.relations
            .iter()
            .filter_map(|rel| match (self, classify(rel)) {
                (Self::Children, Some(ClassifiedRelation::Child(id)))
                | (Self::Parents, Some(ClassifiedRelation::Parent(id))) => Some(id),
                _ => None,
            })
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Builds bounded work item trees from a [`WorkItemGateway`].
pub struct WorkItemProjector<'a, G: WorkItemGateway + ?Sized> {
    gateway: &'a G,
    max_depth: usize,
    cancel: CancellationToken,
}

impl<'a, G: WorkItemGateway + ?Sized> WorkItemProjector<'a, G> {
    #[must_use]
    pub fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: CancellationToken::new(),
        }
    }

    /// Set how many levels below the root may expand their relations.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Abort in-flight and pending fetches when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Fetch a work item by ID and project it.
    #[instrument(skip(self, options), fields(work_item_id = id))]
    pub async fn fetch_and_project(
        &self,
        id: i32,
        options: LoadOptions,
    ) -> IntegrationResult<WorkItemModel> {
        let raw = guarded(&self.cancel, self.gateway.get_by_id(id)).await?;
        self.project(&raw, options).await
    }

    /// Project an already fetched work item.
    pub async fn project(
        &self,
        item: &RawWorkItem,
        options: LoadOptions,
    ) -> IntegrationResult<WorkItemModel> {
        let ancestors = [item.id];
        self.project_at(item, options, 0, &ancestors).await
    }

    fn project_at<'f>(
        &'f self,
        item: &'f RawWorkItem,
        options: LoadOptions,
        depth: usize,
        ancestors: &'f [i32],
    ) -> BoxFuture<'f, IntegrationResult<WorkItemModel>> {
        async move {
            let mut model = project_scalars(item);

            let effective = if depth < self.max_depth {
                options
            } else {
                LoadOptions::none()
            };
            if !effective.any() {
                return Ok(model);
            }

            debug!(work_item_id = item.id, depth, "Expanding work item relations");

            let (children, parents) = tokio::try_join!(
                self.expand_hierarchy(
                    item,
                    Hierarchy::Children,
                    effective.load_children,
                    options,
                    depth,
                    ancestors
                ),
                self.expand_hierarchy(
                    item,
                    Hierarchy::Parents,
                    effective.load_parents,
                    options,
                    depth,
                    ancestors
                ),
            )?;
            model.children = children;
            model.parents = parents;

            if effective.load_commits {
                model.commits = collect_commits(item);
            }
            if effective.load_pull_requests {
                model.pull_requests = collect_pull_requests(item);
            }

            Ok(model)
        }
        .boxed()
    }

    async fn expand_hierarchy(
        &self,
        item: &RawWorkItem,
        hierarchy: Hierarchy,
        requested: bool,
        options: LoadOptions,
        depth: usize,
        ancestors: &[i32],
    ) -> IntegrationResult<Option<Vec<WorkItemModel>>> {
        if !requested {
            return Ok(None);
        }

        let ids: Vec<i32> = hierarchy
            .related_ids(item)
            .into_iter()
            .filter(|id| !ancestors.contains(id))
            .collect();
        if ids.is_empty() {
            return Ok(None);
        }

        debug!(
            work_item_id = item.id,
            count = ids.len(),
            "Fetching {}",
            hierarchy.label()
        );
        let related = guarded(&self.cancel, self.gateway.get_by_ids(&ids)).await?;

        let paths: Vec<Vec<i32>> = related
            .iter()
            .map(|r| {
                let mut path = ancestors.to_vec();
                path.push(r.id);
                path
            })
            .collect();

        let models = try_join_all(
            related
                .iter()
                .zip(&paths)
                .map(|(r, path)| self.project_at(r, options, depth + 1, path)),
        )
        .await?;

        Ok(Some(models))
    }
}

fn project_scalars(item: &RawWorkItem) -> WorkItemModel {
    WorkItemModel {
        id: item.id,
        title: scalar(item, fields::TITLE),
        description: scalar(item, fields::DESCRIPTION),
        acceptance_criteria: scalar(item, fields::ACCEPTANCE_CRITERIA),
        assigned_to: scalar(item, fields::ASSIGNED_TO),
        work_item_type: scalar(item, fields::WORK_ITEM_TYPE),
        state: scalar(item, fields::STATE),
        created_date: scalar(item, fields::CREATED_DATE),
        changed_date: scalar(item, fields::CHANGED_DATE),
        closed_date: scalar(item, fields::CLOSED_DATE),
        resolved_date: scalar(item, fields::RESOLVED_DATE),
        activated_date: scalar(item, fields::ACTIVATED_DATE),
        state_change_date: scalar(item, fields::STATE_CHANGE_DATE),
        ..WorkItemModel::default()
    }
}

fn scalar<T: FromFieldValue>(item: &RawWorkItem, name: &str) -> Option<T> {
    match get_field(item, name) {
        FieldLookup::Mismatch { expected, actual } => {
            debug!(
                work_item_id = item.id,
                field = name,
                expected,
                actual,
                "Field type mismatch, treating as absent"
            );
            None
        }
        lookup => lookup.ok(),
    }
}

fn attribute_date(relation: &Relation, names: &[&str]) -> Option<DateTime<Utc>> {
    names
        .iter()
        .filter_map(|name| relation.attributes.get(*name))
        .find_map(DateTime::<Utc>::from_field_value)
}

fn attribute_string(relation: &Relation, name: &str) -> Option<String> {
    relation.attribute_str(name).map(str::to_string)
}

fn collect_commits(item: &RawWorkItem) -> Option<Vec<CommitInfo>> {
    let commits: Vec<CommitInfo> = item
        .relations
        .iter()
        .filter_map(|rel| match classify(rel) {
            Some(ClassifiedRelation::Commit {
                commit_id,
                relation,
            }) => Some(CommitInfo {
                commit_id,
                comment: attribute_string(relation, "comment"),
                author: None,
                commit_date: attribute_date(relation, &["authorizedDate", "resourceCreatedDate"]),
                remote_url: Some(relation.url.clone()),
            }),
            _ => None,
        })
        .collect();

    (!commits.is_empty()).then_some(commits)
}

fn collect_pull_requests(item: &RawWorkItem) -> Option<Vec<PullRequestInfo>> {
    let pull_requests: Vec<PullRequestInfo> = item
        .relations
        .iter()
        .filter_map(|rel| match classify(rel) {
            Some(ClassifiedRelation::PullRequest {
                reference,
                relation,
            }) => Some(PullRequestInfo {
                pull_request_id: reference.and_then(|r| r.parse().ok()),
                title: attribute_string(relation, "name"),
                description: attribute_string(relation, "comment"),
                creation_date: attribute_date(relation, &["resourceCreatedDate"]),
                remote_url: Some(relation.url.clone()),
                ..PullRequestInfo::default()
            }),
            _ => None,
        })
        .collect();

    (!pull_requests.is_empty()).then_some(pull_requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntegrationError;
    use crate::pm::azure_devops::gateway::MockWorkItemGateway;
    use crate::pm::azure_devops::relations::{ARTIFACT_LINK, HIERARCHY_FORWARD, HIERARCHY_REVERSE};

    const WI_URL: &str = "https://dev.azure.com/acme/_apis/wit/workItems";

    fn child_link(id: i32) -> Relation {
        Relation::new(HIERARCHY_FORWARD, format!("{WI_URL}/{id}"))
    }

    fn parent_link(id: i32) -> Relation {
        Relation::new(HIERARCHY_REVERSE, format!("{WI_URL}/{id}"))
    }

    fn titled(id: i32, title: &str) -> RawWorkItem {
        RawWorkItem::new(id).with_field(fields::TITLE, title)
    }

    fn assert_leaf(model: &WorkItemModel) {
        assert!(model.children.is_none());
        assert!(model.parents.is_none());
        assert!(model.commits.is_none());
        assert!(model.pull_requests.is_none());
    }

    #[tokio::test]
    async fn test_default_options_expand_nothing() {
        // No expectations: any gateway call panics.
        let gateway = MockWorkItemGateway::new();
        let item = titled(1, "Root")
            .with_relation(child_link(2))
            .with_relation(parent_link(3))
            .with_relation(Relation::new(ARTIFACT_LINK, "vstfs:///Git/Commit/abc"));

        let model = WorkItemProjector::new(&gateway)
            .project(&item, LoadOptions::default())
            .await
            .unwrap();

        assert_eq!(model.title.as_deref(), Some("Root"));
        assert_leaf(&model);
    }

    #[tokio::test]
    async fn test_login_bug_scenario() {
        let mut gateway = MockWorkItemGateway::new();
        gateway
            .expect_get_by_ids()
            .withf(|ids: &[i32]| ids == [101])
            .times(1)
            .returning(|_| Ok(vec![titled(101, "Add login test")]));

        let item = titled(100, "Fix login bug")
            .with_field(fields::STATE, "Active")
            .with_relation(child_link(101));
        let options = LoadOptions {
            load_children: true,
            ..LoadOptions::none()
        };

        let model = WorkItemProjector::new(&gateway)
            .project(&item, options)
            .await
            .unwrap();

        assert_eq!(model.id, 100);
        assert_eq!(model.title.as_deref(), Some("Fix login bug"));
        assert_eq!(model.state.as_deref(), Some("Active"));
        assert!(model.parents.is_none());

        let children = model.children.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, 101);
        assert_eq!(children[0].title.as_deref(), Some("Add login test"));
        assert!(children[0].children.is_none());
    }

    #[tokio::test]
    async fn test_all_options_stop_after_one_level() {
        let mut gateway = MockWorkItemGateway::new();
        // The child links onward; those links must not be followed.
        let child = titled(42, "Child")
            .with_relation(child_link(43))
            .with_relation(parent_link(1))
            .with_relation(Relation::new(ARTIFACT_LINK, "vstfs:///Git/Commit/abc"));
        gateway
            .expect_get_by_ids()
            .withf(|ids: &[i32]| ids == [42])
            .times(1)
            .returning(move |_| Ok(vec![child.clone()]));

        let item = titled(1, "Root").with_relation(child_link(42));
        let model = WorkItemProjector::new(&gateway)
            .project(&item, LoadOptions::all())
            .await
            .unwrap();

        let children = model.children.unwrap();
        assert_eq!(children.len(), 1);
        assert_leaf(&children[0]);
        // Requested but no relations of that kind.
        assert!(model.parents.is_none());
        assert!(model.commits.is_none());
        assert!(model.pull_requests.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_links_fetch_once() {
        let mut gateway = MockWorkItemGateway::new();
        gateway
            .expect_get_by_ids()
            .withf(|ids: &[i32]| ids == [42])
            .times(1)
            .returning(|_| Ok(vec![titled(42, "Child")]));

        let item = titled(1, "Root")
            .with_relation(child_link(42))
            .with_relation(child_link(42));

        let model = WorkItemProjector::new(&gateway)
            .project(&item, LoadOptions::all())
            .await
            .unwrap();
        assert_eq!(model.children.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_children_keep_gateway_order() {
        let mut gateway = MockWorkItemGateway::new();
        gateway
            .expect_get_by_ids()
            .withf(|ids: &[i32]| ids == [5, 3, 9])
            .times(1)
            .returning(|_| Ok(vec![titled(5, "e"), titled(3, "c"), titled(9, "i")]));

        let item = titled(1, "Root")
            .with_relation(child_link(5))
            .with_relation(child_link(3))
            .with_relation(child_link(5))
            .with_relation(child_link(9));

        let model = WorkItemProjector::new(&gateway)
            .project(&item, LoadOptions::all())
            .await
            .unwrap();
        let ids: Vec<i32> = model.children.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![5, 3, 9]);
    }

    #[tokio::test]
    async fn test_parents_and_children_fetched_separately() {
        let mut gateway = MockWorkItemGateway::new();
        gateway
            .expect_get_by_ids()
            .withf(|ids: &[i32]| ids == [2])
            .times(1)
            .returning(|_| Ok(vec![titled(2, "Task")]));
        gateway
            .expect_get_by_ids()
            .withf(|ids: &[i32]| ids == [10])
            .times(1)
            .returning(|_| Ok(vec![titled(10, "Epic")]));

        let item = titled(1, "Story")
            .with_relation(child_link(2))
            .with_relation(parent_link(10));

        let model = WorkItemProjector::new(&gateway)
            .project(&item, LoadOptions::all())
            .await
            .unwrap();

        assert_eq!(model.children.unwrap()[0].title.as_deref(), Some("Task"));
        assert_eq!(model.parents.unwrap()[0].title.as_deref(), Some("Epic"));
    }

    #[tokio::test]
    async fn test_malformed_hierarchy_links_are_skipped() {
        let gateway = MockWorkItemGateway::new();
        let item = titled(1, "Root").with_relation(Relation::new(
            HIERARCHY_FORWARD,
            format!("{WI_URL}/not-a-number"),
        ));

        let model = WorkItemProjector::new(&gateway)
            .project(&item, LoadOptions::all())
            .await
            .unwrap();
        assert!(model.children.is_none());
    }

    #[tokio::test]
    async fn test_commits_and_pull_requests_from_attributes() {
        let gateway = MockWorkItemGateway::new();
        let item = titled(1, "Root")
            .with_relation(
                Relation::new(ARTIFACT_LINK, "vstfs:///Git/Commit/p%2Fr%2Fabc123")
                    .with_attribute("name", "Fixed in Commit")
                    .with_attribute("comment", "fix null check")
                    .with_attribute("authorizedDate", "2024-05-01T08:00:00Z"),
            )
            .with_relation(
                Relation::new(ARTIFACT_LINK, "vstfs:///Git/PullRequestId/p%2Fr%2F77")
                    .with_attribute("name", "Pull Request")
                    .with_attribute("resourceCreatedDate", "2024-05-02T09:00:00Z"),
            );

        let options = LoadOptions {
            load_commits: true,
            load_pull_requests: true,
            ..LoadOptions::none()
        };
        let model = WorkItemProjector::new(&gateway)
            .project(&item, options)
            .await
            .unwrap();

        let commits = model.commits.unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].commit_id.as_deref(), Some("abc123"));
        assert_eq!(commits[0].comment.as_deref(), Some("fix null check"));
        assert!(commits[0].commit_date.is_some());
        assert!(commits[0].author.is_none());

        let prs = model.pull_requests.unwrap();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].pull_request_id, Some(77));
        assert_eq!(prs[0].title.as_deref(), Some("Pull Request"));
        assert!(prs[0].creation_date.is_some());
        assert!(model.children.is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let mut gateway = MockWorkItemGateway::new();
        gateway.expect_get_by_ids().returning(|_| {
            Err(IntegrationError::Api {
                status: 500,
                message: "boom".into(),
            })
        });

        let item = titled(1, "Root").with_relation(child_link(2));
        let err = WorkItemProjector::new(&gateway)
            .project(&item, LoadOptions::all())
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrationError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_cancelled_projection_makes_no_calls() {
        let gateway = MockWorkItemGateway::new();
        let token = CancellationToken::new();
        token.cancel();

        let item = titled(1, "Root").with_relation(child_link(2));
        let err = WorkItemProjector::new(&gateway)
            .with_cancellation(token)
            .project(&item, LoadOptions::all())
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrationError::Cancelled));
    }

    #[tokio::test]
    async fn test_fetch_and_project_uses_single_fetch() {
        let mut gateway = MockWorkItemGateway::new();
        gateway
            .expect_get_by_id()
            .withf(|id| *id == 100)
            .times(1)
            .returning(|id| Ok(titled(id, "Fix login bug")));

        let model = WorkItemProjector::new(&gateway)
            .fetch_and_project(100, LoadOptions::none())
            .await
            .unwrap();
        assert_eq!(model.title.as_deref(), Some("Fix login bug"));
    }

    #[tokio::test]
    async fn test_deeper_bound_skips_ancestors() {
        let mut gateway = MockWorkItemGateway::new();
        let child = titled(2, "Child")
            .with_relation(parent_link(1))
            .with_relation(child_link(3));
        let grandchild = titled(3, "Grandchild").with_relation(child_link(4));
        gateway
            .expect_get_by_ids()
            .withf(|ids: &[i32]| ids == [2])
            .times(1)
            .returning(move |_| Ok(vec![child.clone()]));
        gateway
            .expect_get_by_ids()
            .withf(|ids: &[i32]| ids == [3])
            .times(1)
            .returning(move |_| Ok(vec![grandchild.clone()]));

        let item = titled(1, "Root").with_relation(child_link(2));
        let model = WorkItemProjector::new(&gateway)
            .with_max_depth(2)
            .project(&item, LoadOptions::all())
            .await
            .unwrap();

        let child = &model.children.unwrap()[0];
        // The back link to the root is not followed.
        assert!(child.parents.is_none());
        let grandchild = &child.children.as_ref().unwrap()[0];
        assert_eq!(grandchild.id, 3);
        assert_leaf(grandchild);
    }

    #[tokio::test]
    async fn test_root_self_link_is_skipped() {
        let mut gateway = MockWorkItemGateway::new();
        gateway
            .expect_get_by_ids()
            .withf(|ids: &[i32]| ids == [2])
            .times(1)
            .returning(|ids| Ok(ids.iter().map(|id| titled(*id, "Child")).collect()));

        let item = titled(1, "Root")
            .with_relation(child_link(1))
            .with_relation(child_link(2));
        let model = WorkItemProjector::new(&gateway)
            .project(&item, LoadOptions::all())
            .await
            .unwrap();

        let ids: Vec<i32> = model.children.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test]
    async fn test_mistyped_fields_degrade_to_absent() {
        let gateway = MockWorkItemGateway::new();
        let item = RawWorkItem::new(9)
            .with_field(fields::TITLE, "Still here")
            .with_field(fields::CREATED_DATE, "not a date")
            .with_field(fields::STATE, serde_json::json!(["bad"]));

        let model = WorkItemProjector::new(&gateway)
            .project(&item, LoadOptions::none())
            .await
            .unwrap();
        assert_eq!(model.title.as_deref(), Some("Still here"));
        assert!(model.created_date.is_none());
        assert!(model.state.is_none());
    }
}
