use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use graph::{Envelope, User, UserLookup, UsersResult};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, state::State as AppState};

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

#[derive(Deserialize)]
pub struct FidParams {
    fid: Option<String>,
}

#[derive(Deserialize)]
pub struct UserParams {
    fid: Option<String>,
    username: Option<String>,
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Envelope<UsersResult>>, AppError> {
    let users = state
        .gateway
        .search(params.q.as_deref().unwrap_or_default())
        .await
        .map_err(AppError::fetching("search results"))?;

    Ok(Json(Envelope::users(users)))
}

pub async fn followers_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FidParams>,
) -> Result<Json<Envelope<UsersResult>>, AppError> {
    let users = state
        .gateway
        .followers(params.fid.as_deref().unwrap_or_default())
        .await
        .map_err(AppError::fetching("followers"))?;

    Ok(Json(Envelope::users(users)))
}

pub async fn following_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FidParams>,
) -> Result<Json<Envelope<UsersResult>>, AppError> {
    let users = state
        .gateway
        .following(params.fid.as_deref().unwrap_or_default())
        .await
        .map_err(AppError::fetching("following"))?;

    Ok(Json(Envelope::users(users)))
}

/// Answers `{ "result": User }`, with upstream's `{ user }` wrapper taken off.
pub async fn user_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserParams>,
) -> Result<Json<Envelope<User>>, AppError> {
    let lookup = UserLookup::parse(params.fid.as_deref(), params.username.as_deref())
        .map_err(AppError::BadRequest)?;

    let user = state
        .gateway
        .user(&lookup)
        .await
        .map_err(AppError::fetching("user"))?;

    Ok(Json(Envelope { result: user }))
}
