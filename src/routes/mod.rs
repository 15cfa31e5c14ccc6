pub mod auth;
pub mod family;
pub mod health;
pub mod users;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::AppState;

/// Build the full API router. Used by `main` and by the integration tests so
/// both exercise the same routing table.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/users", get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/family/invite-code", post(family::create_invite_code))
        .route(
            "/family/invite-code/group",
            post(family::create_group_invite_code),
        )
        .route("/family/invite-code/:code", get(family::invite_code_status))
        .route("/family/connect", post(family::connect_family))
        .route("/family/members", get(family::family_members))
        .route("/family/invitations", get(family::list_invitations))
        .route(
            "/family/invitations/:id",
            delete(family::delete_invitation),
        )
        .route("/family/cleanup", post(family::cleanup_invitations))
        .route(
            "/family/relationship-types",
            get(family::list_relationship_types),
        )
        .with_state(state)
}
