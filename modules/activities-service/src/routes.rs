//! Axum route handlers for the activities HTTP API.

use crate::error::StoreError;
use crate::store::ActivityStore;
use activities_types::*;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::{delete, get, post};
use axum::Router;
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub const INDEX_PATH: &str = "/static/index.html";

pub struct AppState {
    pub store: Arc<ActivityStore>,
}

pub fn router(state: Arc<AppState>, static_dir: &FsPath) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/activities", get(list_activities).post(create_activity))
        .route("/activities/all", get(list_all_activities))
        .route(
            "/activities/:name",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
        .route("/activities/:name/publish", post(publish_activity))
        .route("/activities/:name/unpublish", post(unpublish_activity))
        .route("/activities/:name/signup", post(signup))
        .route("/activities/:name/unregister", delete(unregister))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// `?email=` with no value counts as missing.
fn required_email(query: Result<Query<ParticipantQuery>, QueryRejection>) -> Result<String, StoreError> {
    let Query(query) = query?;
    query
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| StoreError::BadRequest("Missing 'email' query parameter".to_string()))
}

// GET /
pub async fn root() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, INDEX_PATH)])
}

// GET /activities?published_only=bool
pub async fn list_activities(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListActivitiesQuery>, QueryRejection>,
) -> Result<Json<ActivityMap>, StoreError> {
    let Query(query) = query?;
    let published_only = query.published_only.unwrap_or(true);
    Ok(Json(state.store.list(published_only)))
}

// GET /activities/all
pub async fn list_all_activities(State(state): State<Arc<AppState>>) -> Json<ActivityMap> {
    Json(state.store.list_all())
}

// POST /activities
pub async fn create_activity(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateActivityRequest>, JsonRejection>,
) -> Result<Json<ActivityResponse>, StoreError> {
    let Json(req) = payload?;
    let name = req.name.unwrap_or_default();
    let activity = state.store.create(&name, req.fields)?;
    Ok(Json(ActivityResponse {
        message: format!("Created activity '{}'", name),
        activity,
    }))
}

// GET /activities/{name}
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Activity>, StoreError> {
    Ok(Json(state.store.get(&name)?))
}

// PUT /activities/{name}
pub async fn update_activity(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    payload: Result<Json<ActivityFields>, JsonRejection>,
) -> Result<Json<ActivityResponse>, StoreError> {
    let Json(fields) = payload?;
    let activity = state.store.update(&name, fields)?;
    Ok(Json(ActivityResponse {
        message: format!("Updated activity '{}'", name),
        activity,
    }))
}

// DELETE /activities/{name}
pub async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ActivityResponse>, StoreError> {
    let activity = state.store.delete(&name)?;
    Ok(Json(ActivityResponse {
        message: format!("Deleted activity '{}'", name),
        activity,
    }))
}

// POST /activities/{name}/publish
pub async fn publish_activity(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, StoreError> {
    state.store.publish(&name)?;
    Ok(Json(MessageResponse {
        message: format!("Published activity '{}'", name),
    }))
}

// POST /activities/{name}/unpublish
pub async fn unpublish_activity(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, StoreError> {
    state.store.unpublish(&name)?;
    Ok(Json(MessageResponse {
        message: format!("Unpublished activity '{}'", name),
    }))
}

// POST /activities/{name}/signup?email=...
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    query: Result<Query<ParticipantQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, StoreError> {
    let email = required_email(query)?;
    state.store.signup(&name, &email)?;
    Ok(Json(MessageResponse {
        message: format!("Signed up {} for {}", email, name),
    }))
}

// DELETE /activities/{name}/unregister?email=...
pub async fn unregister(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    query: Result<Query<ParticipantQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, StoreError> {
    let email = required_email(query)?;
    state.store.unregister(&name, &email)?;
    Ok(Json(MessageResponse {
        message: format!("Unregistered {} from {}", email, name),
    }))
}
