use askama::Template;
use axum::extract::{Multipart, Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::db::models::DEFAULT_PROFILE_PICTURE;
use crate::db::videos;
use crate::db::{follows, users};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::media;
use crate::routes::avatar_url;
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/profile.html")]
struct ProfileTemplate {
    user_id: String,
    name: String,
    avatar: String,
    followers: i64,
    following: i64,
    video_count: i64,
    like_count: i64,
    is_self: bool,
    viewer_follows: bool,
    videos: Vec<VideoCard>,
    error: String,
}

struct VideoCard {
    media_url: String,
    caption: String,
    like_count: i64,
}

#[derive(Deserialize)]
struct ProfileQuery {
    error: Option<String>,
}

fn error_message(code: &str) -> String {
    match code {
        "invalid_picture" => {
            "Invalid file format. Please upload a JPG, JPEG, or PNG image.".to_string()
        }
        "no_file" => "No file selected.".to_string(),
        _ => String::new(),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/{user_id}", get(profile_page))
        .route("/update_profile", post(update_profile))
}

async fn profile_page(
    State(state): State<AppState>,
    viewer: CurrentUser,
    Path(user_id): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> AppResult<impl IntoResponse> {
    let user = users::find_by_id(&state.db, &user_id)?;
    let stats = users::profile_stats(&state.db, &user.id)?;
    let is_self = viewer.id == user.id;
    let viewer_follows = if is_self {
        false
    } else {
        follows::is_following(&state.db, &viewer.id, &user.id)?
    };

    let videos = videos::list_by_user(&state.db, &user.id)?
        .into_iter()
        .map(|v| {
            let like_count = videos::like_count(&state.db, &v.id)?;
            Ok(VideoCard {
                media_url: format!("/uploads/{}", v.filename),
                caption: v.caption.unwrap_or_default(),
                like_count,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Html(ProfileTemplate {
        user_id: user.id.clone(),
        name: user.display_name(),
        avatar: avatar_url(&user.profile_picture),
        followers: stats.followers,
        following: stats.following,
        video_count: stats.videos,
        like_count: stats.likes,
        is_self,
        viewer_follows,
        videos,
        error: query.error.as_deref().map(error_message).unwrap_or_default(),
    }))
}

/// Replace the profile picture: persist the new file, commit the metadata
/// change, then best-effort delete the superseded file. The default
/// sentinel is never deleted, and an already-absent file is not an error.
async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("profile_picture") {
            let original = field
                .file_name()
                .ok_or_else(|| AppError::BadRequest("No file selected".into()))?
                .to_string();
            let bytes = field.bytes().await?.to_vec();
            upload = Some((original, bytes));
        }
    }

    // Validation failures bounce back to the profile page with a message
    let Some((original, bytes)) = upload else {
        return Ok(Redirect::to(&format!("/profile/{}?error=no_file", user.id)).into_response());
    };
    if let Err(AppError::UnsupportedMedia(_)) =
        media::validate_extension(&original, media::IMAGE_EXTENSIONS)
    {
        return Ok(
            Redirect::to(&format!("/profile/{}?error=invalid_picture", user.id)).into_response(),
        );
    }

    let stored = media::stored_filename(&original);
    media::save(state.config.uploads_path(), &stored, &bytes)?;

    let previous = users::update_profile_picture(&state.db, &user.id, &stored)?;
    if previous != DEFAULT_PROFILE_PICTURE {
        if let Err(e) = media::remove(state.config.uploads_path(), &previous) {
            tracing::warn!("Could not remove superseded profile picture: {}", e);
        }
    }

    Ok(Redirect::to(&format!("/profile/{}", user.id)).into_response())
}
