use rusqlite::{params, OptionalExtension};

use crate::db::models::Comment;
use crate::db::now_rfc3339;
use crate::db::videos;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// A created comment together with its author's name, denormalized for
/// immediate display without a second fetch.
#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author_first_name: String,
    pub author_last_name: String,
}

/// A top-level comment as rendered on a video, with its reply count.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub author_name: String,
    pub created_at: String,
    pub reply_count: i64,
}

/// Create a comment on a video. A supplied parent must be an existing
/// comment on the same video; replies across videos are rejected.
pub fn create(
    pool: &DbPool,
    actor_id: &str,
    video_id: &str,
    content: &str,
    parent_id: Option<&str>,
) -> AppResult<CommentWithAuthor> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Comment cannot be empty".into()));
    }

    videos::find_by_id(pool, video_id)?;

    let conn = pool.get()?;

    if let Some(parent) = parent_id {
        let parent_video: Option<String> = conn
            .query_row(
                "SELECT video_id FROM comments WHERE id = ?1",
                params![parent],
                |row| row.get(0),
            )
            .optional()?;
        match parent_video {
            None => {
                return Err(AppError::BadRequest("Parent comment does not exist".into()))
            }
            Some(ref v) if v.as_str() != video_id => {
                return Err(AppError::BadRequest(
                    "Parent comment belongs to a different video".into(),
                ))
            }
            Some(_) => {}
        }
    }

    let id = uuid::Uuid::now_v7().to_string();
    let created_at = now_rfc3339();
    conn.execute(
        "INSERT INTO comments (id, content, user_id, video_id, parent_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, content, actor_id, video_id, parent_id, created_at],
    )?;

    let row = conn.query_row(
        "SELECT c.id, c.content, c.user_id, c.video_id, c.parent_id, c.created_at,
                u.first_name, u.last_name
         FROM comments c JOIN users u ON u.id = c.user_id
         WHERE c.id = ?1",
        params![id],
        |row| {
            Ok(CommentWithAuthor {
                comment: Comment {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    user_id: row.get(2)?,
                    video_id: row.get(3)?,
                    parent_id: row.get(4)?,
                    created_at: row.get(5)?,
                },
                author_first_name: row.get(6)?,
                author_last_name: row.get(7)?,
            })
        },
    )?;

    Ok(row)
}

/// Top-level comments for a video, oldest first, with reply counts.
pub fn top_level_for_video(pool: &DbPool, video_id: &str) -> AppResult<Vec<CommentView>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT c.id, c.content, u.first_name || ' ' || u.last_name, c.created_at,
                (SELECT COUNT(*) FROM comments r WHERE r.parent_id = c.id)
         FROM comments c JOIN users u ON u.id = c.user_id
         WHERE c.video_id = ?1 AND c.parent_id IS NULL
         ORDER BY c.created_at ASC, c.id ASC",
    )?;
    let comments = stmt
        .query_map(params![video_id], |row| {
            Ok(CommentView {
                id: row.get(0)?,
                content: row.get(1)?,
                author_name: row.get(2)?,
                created_at: row.get(3)?,
                reply_count: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

pub fn count_for_video(pool: &DbPool, video_id: &str) -> AppResult<i64> {
    let conn = pool.get()?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE video_id = ?1",
        params![video_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
