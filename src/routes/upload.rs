use askama::Template;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use crate::db::videos;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::media;
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/upload.html")]
struct UploadTemplate {
    error: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/upload", get(upload_page).post(upload))
}

async fn upload_page(_user: CurrentUser) -> Html<impl Template> {
    Html(UploadTemplate {
        error: String::new(),
    })
}

async fn upload(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut caption: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("video") => {
                let original = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?.to_vec();
                file = Some((original, bytes));
            }
            Some("caption") => {
                caption = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let Some((original, bytes)) = file else {
        return Ok(Html(UploadTemplate {
            error: "No video file".to_string(),
        })
        .into_response());
    };

    // Recover the unsupported-type case into the page; anything else bubbles
    if let Err(AppError::UnsupportedMedia(_)) =
        media::validate_extension(&original, media::ALLOWED_EXTENSIONS)
    {
        return Ok(Html(UploadTemplate {
            error: "Invalid file format".to_string(),
        })
        .into_response());
    }

    // Persist the file first, then the record pointing at it
    let stored = media::stored_filename(&original);
    media::save(state.config.uploads_path(), &stored, &bytes)?;

    let caption = caption
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let video = videos::create_video(&state.db, &user.id, &stored, caption)?;
    tracing::info!("User {} uploaded video {}", user.id, video.id);

    Ok(Redirect::to(&format!("/profile/{}", user.id)).into_response())
}
