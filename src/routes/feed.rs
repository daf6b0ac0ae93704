use askama::Template;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::db::comments;
use crate::db::feed::{compose, FeedEntry, FeedMode};
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::routes::avatar_url;
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/feed.html")]
struct FeedTemplate {
    tab: &'static str,
    viewer_name: String,
    viewer_id: String,
    videos: Vec<FeedRow>,
}

/// A feed entry flattened for rendering.
struct FeedRow {
    video_id: String,
    media_url: String,
    caption: String,
    author_id: String,
    author_name: String,
    author_avatar: String,
    like_count: i64,
    liked_by_viewer: bool,
    comment_count: i64,
    comments: Vec<CommentRow>,
}

struct CommentRow {
    author_name: String,
    content: String,
    reply_count: i64,
}

fn feed_row(state: &AppState, entry: FeedEntry) -> AppResult<FeedRow> {
    let comments = comments::top_level_for_video(&state.db, &entry.video_id)?
        .into_iter()
        .map(|c| CommentRow {
            author_name: c.author_name,
            content: c.content,
            reply_count: c.reply_count,
        })
        .collect();

    Ok(FeedRow {
        media_url: format!("/uploads/{}", entry.filename),
        caption: entry.caption.unwrap_or_default(),
        author_avatar: avatar_url(&entry.author_picture),
        video_id: entry.video_id,
        author_id: entry.author_id,
        author_name: entry.author_name,
        like_count: entry.like_count,
        liked_by_viewer: entry.liked_by_viewer,
        comment_count: entry.comment_count,
        comments,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/feed/{tab}", get(feed_page))
}

async fn feed_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(tab): Path<String>,
) -> AppResult<impl IntoResponse> {
    let mode = FeedMode::from_tab(&tab);
    let entries = compose(&state.db, &user.id, mode)?;

    let videos = entries
        .into_iter()
        .map(|entry| feed_row(&state, entry))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Html(FeedTemplate {
        tab: mode.tab(),
        viewer_name: user.display_name(),
        viewer_id: user.id,
        videos,
    }))
}
