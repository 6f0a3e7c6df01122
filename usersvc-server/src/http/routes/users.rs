//! User endpoints
//!
//! Form input (url-encoded, multipart or query string), JSON output. Store failures surface as the
//! per-route messages below; details go to the log.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::http::error::{ApiError, StoreResultExt};
use crate::http::extractors::{FormData, ValidUserId};
use crate::http::server::AppState;
use crate::models::{NewUser, User, UserPatch};

/// Acknowledgement body for deletes
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: &'static str,
}

/// GET / - every user, in insertion order
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.list().await.or_store_error("Failed to fetch users")?;
    Ok(Json(users))
}

/// POST / and POST /create-user
async fn create_user(
    State(state): State<AppState>,
    FormData(new): FormData<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .users
        .create(new)
        .await
        .or_store_error("Error creating new user.")?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /user/{id}
async fn get_user(
    State(state): State<AppState>,
    ValidUserId(id): ValidUserId,
) -> Result<Json<User>, ApiError> {
    let user = state.users.get(id).await.or_store_error("Error fetching user")?;
    Ok(Json(user))
}

/// PUT|POST /update/{id} - empty fields keep their stored value
async fn update_user(
    State(state): State<AppState>,
    ValidUserId(id): ValidUserId,
    FormData(patch): FormData<UserPatch>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .users
        .update(id, patch)
        .await
        .or_store_error("Error updating user")?;

    Ok(Json(user))
}

/// POST /delete/{id} and DELETE /user/{id}
async fn delete_user(
    State(state): State<AppState>,
    ValidUserId(id): ValidUserId,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .users
        .delete(id)
        .await
        .or_store_error("Error deleting user")?;

    Ok(Json(SuccessResponse {
        success: "User deleted.",
    }))
}

/// POST /delete-all
async fn delete_all_users(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .users
        .delete_all()
        .await
        .or_store_error("Error deleting all users")?;

    Ok(Json(SuccessResponse {
        success: "All Users deleted.",
    }))
}

/// User routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/create-user", post(create_user))
        .route("/user/{id}", get(get_user).delete(delete_user))
        .route("/update/{id}", post(update_user).put(update_user))
        .route("/delete/{id}", post(delete_user))
        .route("/delete-all", post(delete_all_users))
}
