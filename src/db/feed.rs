use rusqlite::params;

use crate::error::AppResult;
use crate::state::DbPool;

/// Which view of the catalog the feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Every video, unrestricted.
    ForYou,
    /// Only videos owned by identities the viewer actively follows.
    Following,
}

impl FeedMode {
    /// Parse the path segment; unknown tabs fall back to the for-you view.
    pub fn from_tab(tab: &str) -> Self {
        match tab {
            "following" => FeedMode::Following,
            _ => FeedMode::ForYou,
        }
    }

    pub fn tab(&self) -> &'static str {
        match self {
            FeedMode::ForYou => "for_you",
            FeedMode::Following => "following",
        }
    }
}

/// One feed row: a video joined with its author and engagement counters,
/// shaped for direct rendering.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub video_id: String,
    pub filename: String,
    pub caption: Option<String>,
    pub created_at: String,
    pub author_id: String,
    pub author_name: String,
    pub author_picture: String,
    pub like_count: i64,
    pub liked_by_viewer: bool,
    pub comment_count: i64,
}

const FEED_SELECT: &str = "
    SELECT v.id, v.filename, v.caption, v.created_at,
           u.id, u.first_name || ' ' || u.last_name, u.profile_picture,
           (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id),
           (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id AND l.user_id = ?1) > 0,
           (SELECT COUNT(*) FROM comments c WHERE c.video_id = v.id)
    FROM videos v
    JOIN users u ON u.id = v.user_id";

const FEED_ORDER: &str = " ORDER BY v.created_at DESC, v.id DESC";

fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<FeedEntry> {
    Ok(FeedEntry {
        video_id: row.get(0)?,
        filename: row.get(1)?,
        caption: row.get(2)?,
        created_at: row.get(3)?,
        author_id: row.get(4)?,
        author_name: row.get(5)?,
        author_picture: row.get(6)?,
        like_count: row.get(7)?,
        liked_by_viewer: row.get(8)?,
        comment_count: row.get(9)?,
    })
}

/// Compose the feed for a viewer. Recency-ordered full scan; the
/// following view scopes the catalog to the viewer's active follow set.
pub fn compose(pool: &DbPool, viewer_id: &str, mode: FeedMode) -> AppResult<Vec<FeedEntry>> {
    let conn = pool.get()?;
    let sql = match mode {
        FeedMode::ForYou => format!("{FEED_SELECT}{FEED_ORDER}"),
        FeedMode::Following => format!(
            "{FEED_SELECT}
             WHERE v.user_id IN (SELECT followed_id FROM follows WHERE follower_id = ?1)
             {FEED_ORDER}"
        ),
    };
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(params![viewer_id], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::follows;
    use crate::db::likes;
    use crate::db::test_pool;
    use crate::db::users::{create_user, NewUser};
    use crate::db::videos::create_video;

    fn seed_user(pool: &DbPool, email: &str) -> String {
        create_user(
            pool,
            NewUser {
                first_name: "Test".into(),
                last_name: "User".into(),
                email: email.into(),
                password_hash: "hash".into(),
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn tab_parsing_defaults_to_for_you() {
        assert_eq!(FeedMode::from_tab("following"), FeedMode::Following);
        assert_eq!(FeedMode::from_tab("for_you"), FeedMode::ForYou);
        assert_eq!(FeedMode::from_tab("anything-else"), FeedMode::ForYou);
    }

    #[test]
    fn for_you_orders_newest_first() {
        let pool = test_pool();
        let alice = seed_user(&pool, "alice@example.com");
        let bob = seed_user(&pool, "bob@example.com");

        let older = create_video(&pool, &alice, "older.mp4", None).unwrap();
        let newer = create_video(&pool, &bob, "newer.mp4", Some("hi")).unwrap();

        let feed = compose(&pool, &alice, FeedMode::ForYou).unwrap();
        let ids: Vec<&str> = feed.iter().map(|e| e.video_id.as_str()).collect();
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);
    }

    #[test]
    fn following_feed_scopes_to_active_follows() {
        let pool = test_pool();
        let alice = seed_user(&pool, "alice@example.com");
        let bob = seed_user(&pool, "bob@example.com");
        let carol = seed_user(&pool, "carol@example.com");

        let bobs = create_video(&pool, &bob, "bob.mp4", None).unwrap();
        create_video(&pool, &carol, "carol.mp4", None).unwrap();

        follows::toggle(&pool, &alice, &bob).unwrap();

        let feed = compose(&pool, &alice, FeedMode::Following).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].video_id, bobs.id);

        // Unfollow empties the scoped view
        follows::toggle(&pool, &alice, &bob).unwrap();
        let feed = compose(&pool, &alice, FeedMode::Following).unwrap();
        assert!(feed.is_empty());
    }

    #[test]
    fn following_feed_is_subset_of_for_you() {
        let pool = test_pool();
        let alice = seed_user(&pool, "alice@example.com");
        let bob = seed_user(&pool, "bob@example.com");
        let carol = seed_user(&pool, "carol@example.com");

        create_video(&pool, &bob, "bob.mp4", None).unwrap();
        create_video(&pool, &carol, "carol.mp4", None).unwrap();
        follows::toggle(&pool, &alice, &bob).unwrap();

        let for_you: Vec<String> = compose(&pool, &alice, FeedMode::ForYou)
            .unwrap()
            .into_iter()
            .map(|e| e.video_id)
            .collect();
        let following = compose(&pool, &alice, FeedMode::Following).unwrap();

        assert!(following.len() < for_you.len());
        for entry in &following {
            assert!(for_you.contains(&entry.video_id));
            assert_eq!(entry.author_id, bob);
        }
    }

    #[test]
    fn entries_carry_engagement_counters() {
        let pool = test_pool();
        let alice = seed_user(&pool, "alice@example.com");
        let bob = seed_user(&pool, "bob@example.com");
        let video = create_video(&pool, &alice, "clip.mp4", Some("hi")).unwrap();

        likes::toggle(&pool, &bob, &video.id).unwrap();

        let feed = compose(&pool, &bob, FeedMode::ForYou).unwrap();
        assert_eq!(feed[0].like_count, 1);
        assert!(feed[0].liked_by_viewer);
        assert_eq!(feed[0].comment_count, 0);
        assert_eq!(feed[0].author_name, "Test User");

        // A different viewer sees the count but not the liked flag
        let feed = compose(&pool, &alice, FeedMode::ForYou).unwrap();
        assert_eq!(feed[0].like_count, 1);
        assert!(!feed[0].liked_by_viewer);
    }

    #[test]
    fn empty_follow_set_gives_empty_following_feed() {
        let pool = test_pool();
        let alice = seed_user(&pool, "alice@example.com");
        let bob = seed_user(&pool, "bob@example.com");
        create_video(&pool, &bob, "bob.mp4", None).unwrap();

        let feed = compose(&pool, &alice, FeedMode::Following).unwrap();
        assert!(feed.is_empty());
    }
}
