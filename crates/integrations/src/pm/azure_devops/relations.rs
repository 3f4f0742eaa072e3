//! Relation link classification.
//!
//! Each relation kind implies how its target URL is read:
//!
//! - Hierarchy links (`System.LinkTypes.Hierarchy-Forward`/`-Reverse`):
//!   the last path segment is the related work item ID.
//! - Artifact links (`ArtifactLink`): the segment following the first
//!   segment containing `Commit` or `PullRequest` is the artifact
//!   reference, e.g. `vstfs:///Git/Commit/<project>%2F<repo>%2F<sha>`.
//!
//! Extraction never fails the caller. A relation that cannot be read is
//! skipped (hierarchy) or carried with an absent ID (artifact).

use tracing::debug;

use super::models::Relation;

/// Parent to child link.
pub const HIERARCHY_FORWARD: &str = "System.LinkTypes.Hierarchy-Forward";
/// Child to parent link.
pub const HIERARCHY_REVERSE: &str = "System.LinkTypes.Hierarchy-Reverse";
/// Version control artifact link.
pub const ARTIFACT_LINK: &str = "ArtifactLink";

const COMMIT_MARKER: &str = "Commit";
const PULL_REQUEST_MARKER: &str = "PullRequest";

/// A relation with its extracted reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedRelation<'a> {
    /// Hierarchy-forward link to a child work item.
    Child(i32),
    /// Hierarchy-reverse link to a parent work item.
    Parent(i32),
    /// Artifact link to a commit.
    Commit {
        commit_id: Option<String>,
        relation: &'a Relation,
    },
    /// Artifact link to a pull request.
    PullRequest {
        reference: Option<String>,
        relation: &'a Relation,
    },
}

/// Classify a relation, returning `None` for unknown kinds and for
/// hierarchy links whose target is not a numeric work item ID.
#[must_use]
pub fn classify(relation: &Relation) -> Option<ClassifiedRelation<'_>> {
    match relation.rel.as_str() {
        HIERARCHY_FORWARD => work_item_id(&relation.url).map(ClassifiedRelation::Child),
        HIERARCHY_REVERSE => work_item_id(&relation.url).map(ClassifiedRelation::Parent),
        ARTIFACT_LINK if relation.url.contains(COMMIT_MARKER) => Some(ClassifiedRelation::Commit {
            commit_id: artifact_reference(&relation.url, COMMIT_MARKER),
            relation,
        }),
        ARTIFACT_LINK if relation.url.contains(PULL_REQUEST_MARKER) => {
            Some(ClassifiedRelation::PullRequest {
                reference: artifact_reference(&relation.url, PULL_REQUEST_MARKER),
                relation,
            })
        }
        _ => None,
    }
}

/// Work item ID from the last `/`-delimited segment of `url`.
#[must_use]
pub fn work_item_id(url: &str) -> Option<i32> {
    let segment = url.rsplit('/').next()?;
    match segment.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            debug!(url = %url, "Skipping hierarchy relation with non-numeric target");
            None
        }
    }
}

/// Artifact reference following the first segment containing `marker`
/// (case-insensitive).
///
/// The reference is percent-decoded; when it is a `project/repo/id`
/// triple only the trailing component is returned.
#[must_use]
pub fn artifact_reference(url: &str, marker: &str) -> Option<String> {
    let marker = marker.to_ascii_lowercase();
    let mut segments = url.trim_end_matches('/').split('/');
    segments.find(|s| s.to_ascii_lowercase().contains(&marker))?;

    let raw = segments.next().filter(|s| !s.is_empty())?;
    let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |d| d.into_owned());
    decoded
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
