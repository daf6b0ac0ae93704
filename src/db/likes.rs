use rusqlite::params;

use crate::db::now_rfc3339;
use crate::db::videos;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Result of a like toggle, carrying the video's updated like count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeToggle {
    Liked { likes: i64 },
    Unliked { likes: i64 },
}

/// Toggle the actor's like on a video: delete-if-exists, else create.
/// The unique (user, video) index backstops concurrent duplicates.
pub fn toggle(pool: &DbPool, actor_id: &str, video_id: &str) -> AppResult<LikeToggle> {
    // 404 for likes on videos that do not exist
    videos::find_by_id(pool, video_id)?;

    let conn = pool.get()?;
    let removed = conn.execute(
        "DELETE FROM likes WHERE user_id = ?1 AND video_id = ?2",
        params![actor_id, video_id],
    )?;

    let toggled_on = removed == 0;
    if toggled_on {
        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT INTO likes (id, user_id, video_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, actor_id, video_id, now_rfc3339()],
        )?;
    }
    drop(conn);

    let likes = videos::like_count(pool, video_id)?;
    Ok(if toggled_on {
        LikeToggle::Liked { likes }
    } else {
        LikeToggle::Unliked { likes }
    })
}

pub fn is_liked_by(pool: &DbPool, actor_id: &str, video_id: &str) -> AppResult<bool> {
    let conn = pool.get()?;
    let liked: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM likes WHERE user_id = ?1 AND video_id = ?2",
        params![actor_id, video_id],
        |row| row.get(0),
    )?;
    Ok(liked)
}
