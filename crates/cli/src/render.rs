//! Tables and trees for work items and organizations.

use comfy_table::{Cell, Color, ContentArrangement, Table};
use sdlc_integrations::pm::azure_devops::{CommitInfo, PullRequestInfo};
use sdlc_integrations::{LoadOptions, WorkItemModel};

use crate::settings::CliSettings;

const NO_TITLE: &str = "(no title)";
const NO_STATE: &str = "(no state)";
const UNASSIGNED: &str = "(unassigned)";

fn header(titles: &[&str]) -> Vec<Cell> {
    titles.iter().map(|t| Cell::new(t).fg(Color::Cyan)).collect()
}

fn count<T>(items: Option<&Vec<T>>) -> String {
    items.map_or(0, Vec::len).to_string()
}

/// Table of the first `limit` work items, with a count column per
/// requested collection.
#[must_use]
pub fn work_item_table(models: &[WorkItemModel], options: LoadOptions, limit: usize) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut columns = vec!["ID", "Title", "State", "Assigned To"];
    if options.load_children {
        columns.push("Children");
    }
    if options.load_parents {
        columns.push("Parents");
    }
    if options.load_commits {
        columns.push("Commits");
    }
    if options.load_pull_requests {
        columns.push("PRs");
    }
    table.set_header(header(&columns));

    for model in models.iter().take(limit) {
        let mut row = vec![
            Cell::new(model.id),
            Cell::new(model.title.as_deref().unwrap_or(NO_TITLE)),
            Cell::new(model.state.as_deref().unwrap_or(NO_STATE)),
            Cell::new(model.assigned_to.as_deref().unwrap_or(UNASSIGNED)),
        ];
        if options.load_children {
            row.push(Cell::new(count(model.children.as_ref())));
        }
        if options.load_parents {
            row.push(Cell::new(count(model.parents.as_ref())));
        }
        if options.load_commits {
            row.push(Cell::new(count(model.commits.as_ref())));
        }
        if options.load_pull_requests {
            row.push(Cell::new(count(model.pull_requests.as_ref())));
        }
        table.add_row(row);
    }

    table
}

fn headline(model: &WorkItemModel) -> String {
    let mut line = format!("#{} {}", model.id, model.title.as_deref().unwrap_or(NO_TITLE));
    if let Some(state) = &model.state {
        line.push_str(&format!(" [{state}]"));
    }
    if let Some(kind) = &model.work_item_type {
        line.push_str(&format!(" ({kind})"));
    }
    line
}

fn commit_line(commit: &CommitInfo) -> String {
    let id = commit.commit_id.as_deref().unwrap_or("(unknown)");
    let short = id.get(..8).unwrap_or(id);
    match commit.comment.as_deref() {
        Some(comment) => format!("{short} {}", comment.lines().next().unwrap_or_default()),
        None => short.to_string(),
    }
}

fn pull_request_line(pr: &PullRequestInfo) -> String {
    let id = pr
        .pull_request_id
        .map_or_else(|| "(unknown)".to_string(), |id| format!("!{id}"));
    match pr.title.as_deref() {
        Some(title) => format!("{id} {title}"),
        None => id,
    }
}

fn branch(lines: &mut Vec<String>, indent: &str, label: &str, items: Vec<Vec<String>>) {
    lines.push(format!("{indent}{label} ({})", items.len()));
    let last = items.len().saturating_sub(1);
    for (i, item) in items.into_iter().enumerate() {
        let (first, rest) = if i == last {
            ("└─ ", "   ")
        } else {
            ("├─ ", "│  ")
        };
        for (j, text) in item.into_iter().enumerate() {
            let marker = if j == 0 { first } else { rest };
            lines.push(format!("{indent}{marker}{text}"));
        }
    }
}

/// Plain-text tree of a projected work item.
#[must_use]
pub fn work_item_tree(model: &WorkItemModel) -> Vec<String> {
    let mut lines = vec![headline(model)];
    tree_body(model, "  ", &mut lines);
    lines
}

fn tree_body(model: &WorkItemModel, indent: &str, lines: &mut Vec<String>) {
    if let Some(assignee) = &model.assigned_to {
        lines.push(format!("{indent}Assigned to: {assignee}"));
    }

    for (label, related) in [("Children", &model.children), ("Parents", &model.parents)] {
        if let Some(related) = related {
            let items = related
                .iter()
                .map(|m| {
                    let mut nested = vec![headline(m)];
                    tree_body(m, "", &mut nested);
                    nested
                })
                .collect();
            branch(lines, indent, label, items);
        }
    }

    if let Some(commits) = &model.commits {
        let items = commits.iter().map(|c| vec![commit_line(c)]).collect();
        branch(lines, indent, "Commits", items);
    }
    if let Some(prs) = &model.pull_requests {
        let items = prs.iter().map(|p| vec![pull_request_line(p)]).collect();
        branch(lines, indent, "Pull Requests", items);
    }
}

/// Table of configured organizations.
#[must_use]
pub fn organization_table(settings: &CliSettings) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header(&[
        "Name",
        "Description",
        "GitHub",
        "JIRA",
        "Azure DevOps",
        "Default",
    ]));

    let mark = |b: bool| if b { "✓" } else { "-" };
    for org in &settings.organizations {
        table.add_row(vec![
            Cell::new(&org.name),
            Cell::new(org.description.as_deref().unwrap_or_default()),
            Cell::new(mark(org.github.is_some())),
            Cell::new(mark(org.jira.is_some())),
            Cell::new(mark(org.azure_devops.is_some())),
            Cell::new(mark(settings.is_default(&org.name))).fg(Color::Green),
        ]);
    }

    table
}
