//! Pure filtering and sorting over task and workspace collections.
//!
//! Everything in this module is deterministic and side-effect free: the
//! input slice is never mutated and the returned vector is a fresh,
//! filtered/ordered copy. Ties sort stably, preserving input order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::models::{
    requests::WorkspaceDto,
    tasks::{Task, TaskPriority, TaskStatus},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Assignee predicate: a concrete user, the caller ("me"), or unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssigneeFilter {
    Me,
    Unassigned,
    User(Uuid),
}

impl std::str::FromStr for AssigneeFilter {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "me" => Ok(AssigneeFilter::Me),
            "unassigned" => Ok(AssigneeFilter::Unassigned),
            other => Uuid::parse_str(other).map(AssigneeFilter::User),
        }
    }
}

/// Filter predicate over a task collection.
///
/// Empty/absent fields do not constrain; every present field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<Vec<TaskStatus>>,
    pub priority: Option<Vec<TaskPriority>>,
    /// Task must carry at least one of these tags.
    pub tags_include: Option<Vec<String>>,
    /// Task must carry none of these tags.
    pub tags_exclude: Option<Vec<String>>,
    pub assignee: Option<AssigneeFilter>,
    /// Case-insensitive substring over title and description.
    pub search: Option<String>,
    /// Inclusive due-date bounds; an open end is unbounded. Tasks without a
    /// due date never match a bounded range.
    pub due_after: Option<DateTime<Utc>>,
    pub due_before: Option<DateTime<Utc>>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TaskSortField {
    Title,
    Priority,
    DueDate,
    #[default]
    CreatedAt,
    UpdatedAt,
    Status,
    OrderInList,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TaskSort {
    pub field: TaskSortField,
    pub direction: SortDirection,
}

/// Applies the filter, returning matching tasks in input order.
///
/// `viewer` resolves the `me` assignee sentinel against the calling user.
pub fn filter_tasks(tasks: &[Task], filter: &TaskFilter, viewer: Uuid) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task_matches(task, filter, viewer))
        .cloned()
        .collect()
}

fn task_matches(task: &Task, filter: &TaskFilter, viewer: Uuid) -> bool {
    if let Some(statuses) = &filter.status {
        if !statuses.contains(&task.status) {
            return false;
        }
    }
    if let Some(priorities) = &filter.priority {
        if !priorities.contains(&task.priority) {
            return false;
        }
    }
    if let Some(include) = &filter.tags_include {
        if !include.is_empty() && !include.iter().any(|tag| task.tags.contains(tag)) {
            return false;
        }
    }
    if let Some(exclude) = &filter.tags_exclude {
        if exclude.iter().any(|tag| task.tags.contains(tag)) {
            return false;
        }
    }
    if let Some(assignee) = &filter.assignee {
        let matches = match assignee {
            AssigneeFilter::Me => task.assignee_id == Some(viewer),
            AssigneeFilter::Unassigned => task.assignee_id.is_none(),
            AssigneeFilter::User(id) => task.assignee_id == Some(*id),
        };
        if !matches {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        if !needle.is_empty() {
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_ref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
    }
    if filter.due_after.is_some() || filter.due_before.is_some() {
        let Some(due) = task.due_date else {
            return false;
        };
        if let Some(after) = filter.due_after {
            if due < after {
                return false;
            }
        }
        if let Some(before) = filter.due_before {
            if due > before {
                return false;
            }
        }
    }
    true
}

/// Sorts tasks by the given field and direction.
///
/// Stable: equal keys keep their input order. Tasks missing a nullable key
/// (e.g. no due date) sort last regardless of direction.
pub fn sort_tasks(mut tasks: Vec<Task>, sort: &TaskSort) -> Vec<Task> {
    tasks.sort_by(|a, b| compare_tasks(a, b, sort));
    tasks
}

fn compare_tasks(a: &Task, b: &Task, sort: &TaskSort) -> Ordering {
    let direction = sort.direction;
    match sort.field {
        TaskSortField::Title => {
            direction.apply(a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
        TaskSortField::Priority => direction.apply(a.priority.cmp(&b.priority)),
        TaskSortField::DueDate => cmp_nullable(&a.due_date, &b.due_date, direction),
        TaskSortField::CreatedAt => direction.apply(a.created_at.cmp(&b.created_at)),
        TaskSortField::UpdatedAt => direction.apply(a.updated_at.cmp(&b.updated_at)),
        TaskSortField::Status => direction.apply(status_rank(a.status).cmp(&status_rank(b.status))),
        TaskSortField::OrderInList => direction.apply(a.order_in_list.cmp(&b.order_in_list)),
    }
}

// Pipeline position, only meaningful for sorting.
fn status_rank(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Todo => 0,
        TaskStatus::InProgress => 1,
        TaskStatus::Done => 2,
    }
}

/// Missing values sort after present ones in both directions.
fn cmp_nullable<T: Ord>(a: &Option<T>, b: &Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => direction.apply(x.cmp(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filter predicate over a workspace listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceFilter {
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    /// Workspace must carry at least one of these default tags.
    pub tags: Option<Vec<String>>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WorkspaceSortField {
    Name,
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WorkspaceSort {
    pub field: WorkspaceSortField,
    pub direction: SortDirection,
}

pub fn filter_workspaces(workspaces: &[WorkspaceDto], filter: &WorkspaceFilter) -> Vec<WorkspaceDto> {
    workspaces
        .iter()
        .filter(|ws| workspace_matches(ws, filter))
        .cloned()
        .collect()
}

fn workspace_matches(workspace: &WorkspaceDto, filter: &WorkspaceFilter) -> bool {
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        if !needle.is_empty() {
            let in_name = workspace.name.to_lowercase().contains(&needle);
            let in_description = workspace
                .description
                .as_ref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_name && !in_description {
                return false;
            }
        }
    }
    if let Some(tags) = &filter.tags {
        if !tags.is_empty() && !tags.iter().any(|tag| workspace.default_tags.contains(tag)) {
            return false;
        }
    }
    true
}

pub fn sort_workspaces(mut workspaces: Vec<WorkspaceDto>, sort: &WorkspaceSort) -> Vec<WorkspaceDto> {
    workspaces.sort_by(|a, b| {
        let ordering = match sort.field {
            WorkspaceSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            WorkspaceSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            WorkspaceSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        sort.direction.apply(ordering)
    });
    workspaces
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(title: &str) -> Task {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Task {
            id: Uuid::now_v7(),
            title: title.to_string(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: None,
            completed_at: None,
            creator_id: Uuid::now_v7(),
            assignee_id: None,
            workspace_id: Uuid::now_v7(),
            tags: Vec::new(),
            pomodoro_estimated_cycles: None,
            pomodoro_estimated_minutes: None,
            pomodoro_count: 0,
            approach_params: None,
            order_in_list: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let tasks = vec![task("one"), task("two"), task("three")];
        let viewer = Uuid::now_v7();
        let result = filter_tasks(&tasks, &TaskFilter::default(), viewer);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_status_and_priority_sets() {
        let mut a = task("a");
        a.status = TaskStatus::Done;
        let mut b = task("b");
        b.status = TaskStatus::InProgress;
        b.priority = TaskPriority::Critical;
        let tasks = vec![a, b];

        let filter = TaskFilter {
            status: Some(vec![TaskStatus::InProgress, TaskStatus::Todo]),
            priority: Some(vec![TaskPriority::Critical]),
            ..Default::default()
        };
        let result = filter_tasks(&tasks, &filter, Uuid::now_v7());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "b");
    }

    #[test]
    fn test_tag_include_exclude() {
        let mut a = task("a");
        a.tags = vec!["work".to_string(), "urgent".to_string()];
        let mut b = task("b");
        b.tags = vec!["work".to_string(), "later".to_string()];
        let tasks = vec![a, b];

        let filter = TaskFilter {
            tags_include: Some(vec!["work".to_string()]),
            tags_exclude: Some(vec!["later".to_string()]),
            ..Default::default()
        };
        let result = filter_tasks(&tasks, &filter, Uuid::now_v7());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "a");
    }

    #[test]
    fn test_assignee_sentinels() {
        let viewer = Uuid::now_v7();
        let someone = Uuid::now_v7();
        let mut mine = task("mine");
        mine.assignee_id = Some(viewer);
        let mut theirs = task("theirs");
        theirs.assignee_id = Some(someone);
        let unowned = task("unowned");
        let tasks = vec![mine, theirs, unowned];

        let me = TaskFilter {
            assignee: Some(AssigneeFilter::Me),
            ..Default::default()
        };
        assert_eq!(filter_tasks(&tasks, &me, viewer)[0].title, "mine");

        let unassigned = TaskFilter {
            assignee: Some(AssigneeFilter::Unassigned),
            ..Default::default()
        };
        assert_eq!(filter_tasks(&tasks, &unassigned, viewer)[0].title, "unowned");

        let explicit = TaskFilter {
            assignee: Some(AssigneeFilter::User(someone)),
            ..Default::default()
        };
        assert_eq!(filter_tasks(&tasks, &explicit, viewer)[0].title, "theirs");
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_and_description() {
        let mut a = task("Write Report");
        a.description = Some("quarterly numbers".to_string());
        let b = task("unrelated");
        let tasks = vec![a, b];

        let by_title = TaskFilter {
            search: Some("REPORT".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_tasks(&tasks, &by_title, Uuid::now_v7()).len(), 1);

        let by_description = TaskFilter {
            search: Some("Quarterly".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter_tasks(&tasks, &by_description, Uuid::now_v7()).len(),
            1
        );
    }

    #[test]
    fn test_due_date_range_inclusive_and_excludes_undated() {
        let mut early = task("early");
        early.due_date = Some(day(5));
        let mut edge = task("edge");
        edge.due_date = Some(day(10));
        let mut late = task("late");
        late.due_date = Some(day(20));
        let undated = task("undated");
        let tasks = vec![early, edge, late, undated];

        let filter = TaskFilter {
            due_after: Some(day(10)),
            due_before: Some(day(20)),
            ..Default::default()
        };
        let result = filter_tasks(&tasks, &filter, Uuid::now_v7());
        let titles: Vec<_> = result.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["edge", "late"]);
    }

    #[test]
    fn test_filter_is_subset_and_idempotent() {
        let mut a = task("a");
        a.tags = vec!["x".to_string()];
        let b = task("b");
        let tasks = vec![a, b];
        let viewer = Uuid::now_v7();
        let filter = TaskFilter {
            tags_include: Some(vec!["x".to_string()]),
            ..Default::default()
        };

        let once = filter_tasks(&tasks, &filter, viewer);
        assert!(once.iter().all(|t| tasks.iter().any(|o| o.id == t.id)));

        let twice = filter_tasks(&once, &filter, viewer);
        let once_ids: Vec<_> = once.iter().map(|t| t.id).collect();
        let twice_ids: Vec<_> = twice.iter().map(|t| t.id).collect();
        assert_eq!(once_ids, twice_ids);
    }

    #[test]
    fn test_sort_is_permutation_and_monotonic() {
        let mut a = task("banana");
        a.priority = TaskPriority::Low;
        let mut b = task("apple");
        b.priority = TaskPriority::Critical;
        let mut c = task("cherry");
        c.priority = TaskPriority::High;
        let tasks = vec![a, b, c];

        let sorted = sort_tasks(
            tasks.clone(),
            &TaskSort {
                field: TaskSortField::Priority,
                direction: SortDirection::Desc,
            },
        );
        assert_eq!(sorted.len(), tasks.len());
        for original in &tasks {
            assert!(sorted.iter().any(|t| t.id == original.id));
        }
        for window in sorted.windows(2) {
            assert!(window[0].priority >= window[1].priority);
        }
    }

    #[test]
    fn test_sort_by_title_is_case_insensitive() {
        let tasks = vec![task("banana"), task("Apple"), task("cherry")];
        let sorted = sort_tasks(
            tasks,
            &TaskSort {
                field: TaskSortField::Title,
                direction: SortDirection::Asc,
            },
        );
        let titles: Vec<_> = sorted.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_sort_ties_keep_input_order() {
        let mut first = task("first");
        first.order_in_list = 7;
        let mut second = task("second");
        second.order_in_list = 7;
        let mut third = task("third");
        third.order_in_list = 1;
        let sorted = sort_tasks(
            vec![first, second, third],
            &TaskSort {
                field: TaskSortField::OrderInList,
                direction: SortDirection::Asc,
            },
        );
        let titles: Vec<_> = sorted.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "first", "second"]);
    }

    #[test]
    fn test_missing_due_dates_sort_last_in_both_directions() {
        let mut dated = task("dated");
        dated.due_date = Some(day(5));
        let undated = task("undated");

        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sorted = sort_tasks(
                vec![undated.clone(), dated.clone()],
                &TaskSort {
                    field: TaskSortField::DueDate,
                    direction,
                },
            );
            assert_eq!(sorted.last().unwrap().title, "undated");
        }
    }
}
