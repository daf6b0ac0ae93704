use clipstream::auth::password::{hash_password, verify_password};
use clipstream::auth::session;
use clipstream::db::{self, comments, follows, likes, videos};
use clipstream::db::feed::{compose, FeedMode};
use clipstream::db::follows::FollowToggle;
use clipstream::db::likes::LikeToggle;
use clipstream::db::users::{self, NewUser, ProfileStats};
use clipstream::error::AppError;
use clipstream::state::DbPool;
use tempfile::TempDir;

fn test_db(temp_dir: &TempDir) -> DbPool {
    let db_path = temp_dir.path().join("test.db");
    let pool = db::create_pool(&db_path).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");
    pool
}

fn register(pool: &DbPool, first: &str, last: &str, email: &str, password: &str) -> String {
    users::create_user(
        pool,
        NewUser {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            password_hash: hash_password(password).unwrap(),
        },
    )
    .unwrap()
    .id
}

#[test]
fn registration_then_authentication_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let pool = test_db(&temp_dir);

    let alice = register(&pool, "Alice", "Lee", "alice@example.com", "pw-alice");

    // The stored credential verifies the original password and nothing else
    let stored = users::find_by_email(&pool, "alice@example.com")
        .unwrap()
        .expect("registered user should be found by email");
    assert_eq!(stored.id, alice);
    assert_ne!(stored.password_hash, "pw-alice");
    assert!(verify_password("pw-alice", &stored.password_hash));
    assert!(!verify_password("pw-bob", &stored.password_hash));

    // A session can be established and torn down
    let token = session::create_session(&pool, &alice, 24).unwrap();
    session::delete_session(&pool, &token).unwrap();

    // Re-registering the same email is a distinct conflict
    let err = users::create_user(
        &pool,
        NewUser {
            first_name: "Alice".into(),
            last_name: "Impostor".into(),
            email: "alice@example.com".into(),
            password_hash: "whatever".into(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[test]
fn upload_like_follow_walkthrough() {
    let temp_dir = TempDir::new().unwrap();
    let pool = test_db(&temp_dir);

    let alice = register(&pool, "Alice", "Lee", "alice@example.com", "pw");
    let bob = register(&pool, "Bob", "Ng", "bob@example.com", "pw");

    // A fresh profile starts with every counter at zero
    assert_eq!(
        users::profile_stats(&pool, &alice).unwrap(),
        ProfileStats {
            followers: 0,
            following: 0,
            videos: 0,
            likes: 0
        }
    );

    // Uploading puts the video at the top of the for-you feed
    let earlier = videos::create_video(&pool, &bob, "a_earlier.mp4", None).unwrap();
    let clip = videos::create_video(&pool, &alice, "b_clip.mp4", Some("hi")).unwrap();

    let feed = compose(&pool, &alice, FeedMode::ForYou).unwrap();
    assert_eq!(feed[0].video_id, clip.id);
    assert_eq!(feed[1].video_id, earlier.id);

    // Double-like returns to the original count with alternating status
    let first = likes::toggle(&pool, &bob, &clip.id).unwrap();
    assert_eq!(first, LikeToggle::Liked { likes: 1 });
    let second = likes::toggle(&pool, &bob, &clip.id).unwrap();
    assert_eq!(second, LikeToggle::Unliked { likes: 0 });

    // Follow scopes Bob's following feed to Alice's videos
    let followed = follows::toggle(&pool, &bob, &alice).unwrap();
    assert_eq!(followed, FollowToggle::Followed { followers: 1 });

    let following_feed = compose(&pool, &bob, FeedMode::Following).unwrap();
    let for_you_feed = compose(&pool, &bob, FeedMode::ForYou).unwrap();
    assert_eq!(following_feed.len(), 1);
    assert_eq!(following_feed[0].video_id, clip.id);
    assert!(following_feed.len() <= for_you_feed.len());

    // Stats reflect the activity
    likes::toggle(&pool, &bob, &clip.id).unwrap();
    let stats = users::profile_stats(&pool, &alice).unwrap();
    assert_eq!(
        stats,
        ProfileStats {
            followers: 1,
            following: 0,
            videos: 1,
            likes: 1
        }
    );
}

#[test]
fn comment_thread_stays_on_one_video() {
    let temp_dir = TempDir::new().unwrap();
    let pool = test_db(&temp_dir);

    let alice = register(&pool, "Alice", "Lee", "alice@example.com", "pw");
    let bob = register(&pool, "Bob", "Ng", "bob@example.com", "pw");

    let clip = videos::create_video(&pool, &alice, "clip.mp4", Some("hi")).unwrap();
    let other = videos::create_video(&pool, &alice, "other.mp4", None).unwrap();

    let top = comments::create(&pool, &bob, &clip.id, "nice one", None).unwrap();
    assert_eq!(top.author_first_name, "Bob");
    assert!(top.comment.parent_id.is_none());

    // Replying on the same video threads under the parent
    let reply = comments::create(&pool, &alice, &clip.id, "thanks!", Some(&top.comment.id)).unwrap();
    assert_eq!(reply.comment.parent_id.as_deref(), Some(top.comment.id.as_str()));

    // Replying from another video is rejected outright
    let err = comments::create(&pool, &alice, &other.id, "stray", Some(&top.comment.id))
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let listed = comments::top_level_for_video(&pool, &clip.id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].reply_count, 1);
}
