//! Filter/sort engine tests against the public API.

use chrono::{TimeZone, Utc};
use questline::filters::{
    SortDirection, WorkspaceFilter, WorkspaceSort, WorkspaceSortField, filter_workspaces,
    sort_workspaces,
};
use questline::models::{
    requests::WorkspaceDto,
    workspace_members::WorkspaceRole,
    workspaces::{WorkApproach, WorkspaceSettings},
};
use uuid::Uuid;

fn workspace(name: &str, day: u32) -> WorkspaceDto {
    let created = Utc.with_ymd_and_hms(2026, 1, day, 9, 0, 0).unwrap();
    WorkspaceDto {
        id: Uuid::now_v7(),
        name: name.to_string(),
        description: None,
        owner_id: Uuid::now_v7(),
        is_personal: false,
        team_id: None,
        active_approach: WorkApproach::Calendar,
        default_tags: Vec::new(),
        settings: WorkspaceSettings::default(),
        created_at: created,
        updated_at: created,
        current_user_role: Some(WorkspaceRole::Owner),
    }
}

#[test]
fn test_search_matches_name_and_description() {
    let mut alpha = workspace("Alpha Team", 1);
    alpha.description = Some("quarterly planning".to_string());
    let beta = workspace("Beta", 2);
    let workspaces = vec![alpha, beta];

    let by_name = WorkspaceFilter {
        search: Some("alpha".to_string()),
        ..Default::default()
    };
    assert_eq!(filter_workspaces(&workspaces, &by_name).len(), 1);

    let by_description = WorkspaceFilter {
        search: Some("PLANNING".to_string()),
        ..Default::default()
    };
    let matched = filter_workspaces(&workspaces, &by_description);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "Alpha Team");
}

#[test]
fn test_tag_filter_requires_intersection() {
    let mut tagged = workspace("Tagged", 1);
    tagged.default_tags = vec!["work".to_string(), "team".to_string()];
    let untagged = workspace("Untagged", 2);
    let workspaces = vec![tagged, untagged];

    let filter = WorkspaceFilter {
        tags: Some(vec!["team".to_string(), "missing".to_string()]),
        ..Default::default()
    };
    let matched = filter_workspaces(&workspaces, &filter);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "Tagged");
}

#[test]
fn test_filter_never_fabricates_and_is_idempotent() {
    let workspaces = vec![workspace("One", 1), workspace("Two", 2)];
    let filter = WorkspaceFilter {
        search: Some("one".to_string()),
        ..Default::default()
    };

    let once = filter_workspaces(&workspaces, &filter);
    assert!(once.iter().all(|w| workspaces.iter().any(|o| o.id == w.id)));

    let twice = filter_workspaces(&once, &filter);
    let once_ids: Vec<_> = once.iter().map(|w| w.id).collect();
    let twice_ids: Vec<_> = twice.iter().map(|w| w.id).collect();
    assert_eq!(once_ids, twice_ids);
}

#[test]
fn test_sort_by_name_and_created_at() {
    let workspaces = vec![
        workspace("banana", 3),
        workspace("Apple", 1),
        workspace("cherry", 2),
    ];

    let by_name = sort_workspaces(
        workspaces.clone(),
        &WorkspaceSort {
            field: WorkspaceSortField::Name,
            direction: SortDirection::Asc,
        },
    );
    let names: Vec<_> = by_name.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["Apple", "banana", "cherry"]);

    let by_created_desc = sort_workspaces(
        workspaces,
        &WorkspaceSort {
            field: WorkspaceSortField::CreatedAt,
            direction: SortDirection::Desc,
        },
    );
    let names: Vec<_> = by_created_desc.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["banana", "cherry", "Apple"]);
}

#[test]
fn test_sort_is_a_permutation() {
    let workspaces = vec![
        workspace("a", 1),
        workspace("b", 2),
        workspace("c", 3),
        workspace("d", 4),
    ];
    let sorted = sort_workspaces(
        workspaces.clone(),
        &WorkspaceSort {
            field: WorkspaceSortField::UpdatedAt,
            direction: SortDirection::Desc,
        },
    );
    assert_eq!(sorted.len(), workspaces.len());
    for original in &workspaces {
        assert!(sorted.iter().any(|w| w.id == original.id));
    }
}
