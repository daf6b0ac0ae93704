use rusqlite::params;

use crate::db::now_rfc3339;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Result of a follow toggle, carrying the target's updated follower count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowToggle {
    Followed { followers: i64 },
    Unfollowed { followers: i64 },
}

/// Toggle the follow edge actor -> target. An existing edge is removed,
/// a missing edge is created; two identical calls restore the original
/// state. Self-follows are rejected regardless of prior state.
pub fn toggle(pool: &DbPool, actor_id: &str, target_id: &str) -> AppResult<FollowToggle> {
    if actor_id == target_id {
        return Err(AppError::SelfFollow);
    }

    let conn = pool.get()?;

    // Target must exist before we touch the edge
    let target_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE id = ?1",
        params![target_id],
        |row| row.get(0),
    )?;
    if !target_exists {
        return Err(AppError::NotFound);
    }

    // Delete-if-exists is both the existence check and the toggle's off
    // branch; the unique pair index backstops concurrent inserts.
    let removed = conn.execute(
        "DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
        params![actor_id, target_id],
    )?;

    let toggled_on = removed == 0;
    if toggled_on {
        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT INTO follows (id, follower_id, followed_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, actor_id, target_id, now_rfc3339()],
        )?;
    }

    let followers = follower_count(&conn, target_id)?;
    Ok(if toggled_on {
        FollowToggle::Followed { followers }
    } else {
        FollowToggle::Unfollowed { followers }
    })
}

fn follower_count(
    conn: &rusqlite::Connection,
    user_id: &str,
) -> Result<i64, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(*) FROM follows WHERE followed_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

pub fn is_following(pool: &DbPool, actor_id: &str, target_id: &str) -> AppResult<bool> {
    let conn = pool.get()?;
    let following: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
        params![actor_id, target_id],
        |row| row.get(0),
    )?;
    Ok(following)
}

/// Ids of everyone the viewer actively follows, for feed scoping.
pub fn following_ids(pool: &DbPool, viewer_id: &str) -> AppResult<Vec<String>> {
    let conn = pool.get()?;
    let mut stmt =
        conn.prepare("SELECT followed_id FROM follows WHERE follower_id = ?1")?;
    let ids = stmt
        .query_map(params![viewer_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}
