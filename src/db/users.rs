use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::User;
use crate::db::now_rfc3339;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Fields required to register a new identity. The password arrives
/// already hashed; plaintext never reaches this layer.
#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Aggregated counters shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileStats {
    pub followers: i64,
    pub following: i64,
    pub videos: i64,
    pub likes: i64,
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        password_hash: row.get(4)?,
        profile_picture: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, profile_picture, created_at";

pub fn create_user(pool: &DbPool, new_user: NewUser) -> AppResult<User> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();
    let created_at = now_rfc3339();

    conn.execute(
        "INSERT INTO users (id, first_name, last_name, email, password_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            new_user.first_name,
            new_user.last_name,
            new_user.email,
            new_user.password_hash,
            created_at
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            AppError::Conflict("An account with this email already exists".into())
        }
        other => AppError::Database(other),
    })?;
    drop(conn);

    find_by_id(pool, &id)
}

pub fn find_by_id(pool: &DbPool, user_id: &str) -> AppResult<User> {
    let conn = pool.get()?;
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![user_id],
        user_from_row,
    )
    .optional()?
    .ok_or(AppError::NotFound)
}

pub fn find_by_email(pool: &DbPool, email: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

/// Point the profile at a new stored picture and hand back the previous
/// reference so the caller can clean up the superseded file.
pub fn update_profile_picture(
    pool: &DbPool,
    user_id: &str,
    stored_name: &str,
) -> AppResult<String> {
    let conn = pool.get()?;
    let previous: String = conn
        .query_row(
            "SELECT profile_picture FROM users WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(AppError::NotFound)?;

    conn.execute(
        "UPDATE users SET profile_picture = ?1 WHERE id = ?2",
        params![stored_name, user_id],
    )?;

    Ok(previous)
}

pub fn profile_stats(pool: &DbPool, user_id: &str) -> AppResult<ProfileStats> {
    let conn = pool.get()?;
    let followers: i64 = conn.query_row(
        "SELECT COUNT(*) FROM follows WHERE followed_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    let following: i64 = conn.query_row(
        "SELECT COUNT(*) FROM follows WHERE follower_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    let videos: i64 = conn.query_row(
        "SELECT COUNT(*) FROM videos WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    // Total likes received across every video this user owns
    let likes: i64 = conn.query_row(
        "SELECT COUNT(*) FROM likes l JOIN videos v ON v.id = l.video_id WHERE v.user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;

    Ok(ProfileStats {
        followers,
        following,
        videos,
        likes,
    })
}
