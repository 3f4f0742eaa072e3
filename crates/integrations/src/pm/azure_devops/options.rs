//! Expansion options for work item projection.

/// Which relation categories to expand when projecting a work item.
///
/// The default expands nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct LoadOptions {
    /// Load child work items.
    pub load_children: bool,
    /// Load parent work items.
    pub load_parents: bool,
    /// Load linked commits.
    pub load_commits: bool,
    /// Load linked pull requests.
    pub load_pull_requests: bool,
}

impl LoadOptions {
    /// Nothing expanded.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            load_children: false,
            load_parents: false,
            load_commits: false,
            load_pull_requests: false,
        }
    }

    /// Everything expanded.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            load_children: true,
            load_parents: true,
            load_commits: true,
            load_pull_requests: true,
        }
    }

    /// Whether any category is selected.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.load_children || self.load_parents || self.load_commits || self.load_pull_requests
    }
}
