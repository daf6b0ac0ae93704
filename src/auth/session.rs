use rand::Rng;
use rusqlite::params;

use crate::error::AppResult;
use crate::state::DbPool;

/// Create a new session for a user. Returns the session token.
pub fn create_session(pool: &DbPool, user_id: &str, hours: u64) -> AppResult<String> {
    let conn = pool.get()?;

    let token = generate_token();
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO sessions (id, user_id, token, expires_at) VALUES (?1, ?2, ?3, datetime('now', ?4))",
        params![id, user_id, token, format!("+{} hours", hours)],
    )?;

    Ok(token)
}

/// Delete a session by token.
pub fn delete_session(pool: &DbPool, token: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::db::users::{create_user, NewUser};

    #[test]
    fn generate_token_is_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_token_is_unique() {
        let t1 = generate_token();
        let t2 = generate_token();
        assert_ne!(t1, t2);
    }

    #[test]
    fn create_session_persists_row() {
        let pool = test_pool();
        let user = create_user(
            &pool,
            NewUser {
                first_name: "Alice".into(),
                last_name: "Lee".into(),
                email: "alice@example.com".into(),
                password_hash: "hash".into(),
            },
        )
        .unwrap();

        let token = create_session(&pool, &user.id, 24).unwrap();

        let conn = pool.get().unwrap();
        let (stored_user, live): (String, bool) = conn
            .query_row(
                "SELECT user_id, expires_at > datetime('now') FROM sessions WHERE token = ?1",
                params![token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(stored_user, user.id);
        assert!(live);
    }

    #[test]
    fn delete_session_removes_row() {
        let pool = test_pool();
        let user = create_user(
            &pool,
            NewUser {
                first_name: "Alice".into(),
                last_name: "Lee".into(),
                email: "alice@example.com".into(),
                password_hash: "hash".into(),
            },
        )
        .unwrap();

        let token = create_session(&pool, &user.id, 24).unwrap();
        delete_session(&pool, &token).unwrap();

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sessions WHERE token = ?1",
                params![token],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 0);
        drop(conn);

        // Deleting again is a no-op, not an error
        delete_session(&pool, &token).unwrap();
    }
}
