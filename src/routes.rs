//! API router assembly.
//!
//! Authentication is layered per route group: everything below `/api/v1`
//! except `/health` requires a valid JWT; workspace-scoped routes
//! additionally resolve the caller's membership through the workspace-access
//! middleware.
//!
//! Workspace deletion deliberately skips the membership middleware: it
//! authorizes against the workspace row's recorded owner, and probing a
//! missing workspace must report not-found rather than permission-denied.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers,
    middleware::{auth::jwt_auth_middleware, workspace_access::workspace_access_middleware},
    state::AppState,
};

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let workspace_access =
        middleware::from_fn_with_state(state.clone(), workspace_access_middleware);

    let protected = Router::new()
        .route("/me", get(handlers::users::get_profile))
        .route(
            "/workspaces",
            post(handlers::workspaces::create_workspace).get(handlers::workspaces::list_workspaces),
        )
        .route(
            "/workspaces/{id}",
            get(handlers::workspaces::get_workspace)
                .patch(handlers::workspaces::update_workspace)
                .route_layer(workspace_access.clone())
                .delete(handlers::workspaces::delete_workspace),
        )
        .route(
            "/workspaces/{id}/members",
            get(handlers::members::list_members)
                .post(handlers::members::add_member)
                .route_layer(workspace_access.clone()),
        )
        .route(
            "/workspaces/{id}/members/{user_id}",
            axum::routing::patch(handlers::members::update_member_role)
                .delete(handlers::members::remove_member)
                .route_layer(workspace_access),
        )
        .route(
            "/tasks",
            post(handlers::tasks::create_task).get(handlers::tasks::list_tasks),
        )
        .route(
            "/tasks/{id}",
            get(handlers::tasks::get_task)
                .patch(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route("/tasks/{id}/status", put(handlers::tasks::update_task_status))
        .route(
            "/tasks/{id}/pomodoro",
            post(handlers::tasks::record_pomodoro),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let api = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(protected);

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
