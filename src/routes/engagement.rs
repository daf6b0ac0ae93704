use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::comments;
use crate::db::likes::{self, LikeToggle};
use crate::db::videos;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

// -- Request/Response types --

#[derive(Serialize)]
pub struct LikeResponse {
    pub status: &'static str,
    pub likes: i64,
}

#[derive(Deserialize)]
pub struct CommentForm {
    pub content: String,
    pub parent_id: Option<String>,
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub status: &'static str,
    pub comment: CommentPayload,
}

#[derive(Serialize)]
pub struct CommentPayload {
    pub id: String,
    pub content: String,
    pub user: CommentAuthor,
    pub created_at: String,
    /// Always empty on creation; clients re-fetch for nested replies.
    pub replies: Vec<CommentPayload>,
}

#[derive(Serialize)]
pub struct CommentAuthor {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize)]
pub struct ShareResponse {
    pub status: &'static str,
    pub share_url: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/like/{video_id}", post(like))
        .route("/comment/{video_id}", post(comment))
        .route("/share/{video_id}", get(share))
}

async fn like(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(video_id): Path<String>,
) -> AppResult<Json<LikeResponse>> {
    let response = match likes::toggle(&state.db, &user.id, &video_id)? {
        LikeToggle::Liked { likes } => LikeResponse {
            status: "liked",
            likes,
        },
        LikeToggle::Unliked { likes } => LikeResponse {
            status: "unliked",
            likes,
        },
    };
    Ok(Json(response))
}

async fn comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(video_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> AppResult<Json<CommentResponse>> {
    // HTML forms submit an empty string for "no parent"
    let parent_id = form.parent_id.as_deref().filter(|p| !p.is_empty());

    let created = comments::create(&state.db, &user.id, &video_id, &form.content, parent_id)?;

    Ok(Json(CommentResponse {
        status: "success",
        comment: CommentPayload {
            id: created.comment.id,
            content: created.comment.content,
            user: CommentAuthor {
                first_name: created.author_first_name,
                last_name: created.author_last_name,
            },
            created_at: created.comment.created_at,
            replies: Vec::new(),
        },
    }))
}

/// Build a shareable link for a video. Nothing is persisted.
async fn share(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(video_id): Path<String>,
) -> AppResult<Json<ShareResponse>> {
    let video = videos::find_by_id(&state.db, &video_id)?;
    let share_url = format!(
        "{}/feed/for_you#video-{}",
        state.config.base_url(),
        video.id
    );
    Ok(Json(ShareResponse {
        status: "success",
        share_url,
    }))
}
