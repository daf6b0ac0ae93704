use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::Video;
use crate::db::now_rfc3339;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

fn video_from_row(row: &Row) -> rusqlite::Result<Video> {
    Ok(Video {
        id: row.get(0)?,
        filename: row.get(1)?,
        caption: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn create_video(
    pool: &DbPool,
    owner_id: &str,
    stored_filename: &str,
    caption: Option<&str>,
) -> AppResult<Video> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();
    let created_at = now_rfc3339();

    conn.execute(
        "INSERT INTO videos (id, filename, caption, user_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, stored_filename, caption, owner_id, created_at],
    )?;
    drop(conn);

    find_by_id(pool, &id)
}

pub fn find_by_id(pool: &DbPool, video_id: &str) -> AppResult<Video> {
    let conn = pool.get()?;
    conn.query_row(
        "SELECT id, filename, caption, user_id, created_at FROM videos WHERE id = ?1",
        params![video_id],
        video_from_row,
    )
    .optional()?
    .ok_or(AppError::NotFound)
}

/// A user's own videos, newest first, for the profile page.
pub fn list_by_user(pool: &DbPool, user_id: &str) -> AppResult<Vec<Video>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT id, filename, caption, user_id, created_at
         FROM videos WHERE user_id = ?1
         ORDER BY created_at DESC, id DESC",
    )?;
    let videos = stmt
        .query_map(params![user_id], video_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(videos)
}

pub fn like_count(pool: &DbPool, video_id: &str) -> AppResult<i64> {
    let conn = pool.get()?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM likes WHERE video_id = ?1",
        params![video_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
