use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::db::follows::{self, FollowToggle};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

#[derive(Serialize)]
pub struct FollowResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/follow/{user_id}", post(follow))
}

async fn follow(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<FollowResponse>> {
    let response = match follows::toggle(&state.db, &user.id, &user_id) {
        Ok(FollowToggle::Followed { followers }) => FollowResponse {
            status: "followed",
            followers: Some(followers),
        },
        Ok(FollowToggle::Unfollowed { followers }) => FollowResponse {
            status: "unfollowed",
            followers: Some(followers),
        },
        // The operation rejects self-follows; the endpoint reports it as
        // a status rather than an error
        Err(AppError::SelfFollow) => FollowResponse {
            status: "cannot_follow_self",
            followers: None,
        },
        Err(e) => return Err(e),
    };
    Ok(Json(response))
}
