pub mod assets;
pub mod auth;
pub mod engagement;
pub mod feed;
pub mod home;
pub mod profile;
pub mod social;
pub mod upload;

use crate::db::models::DEFAULT_PROFILE_PICTURE;

/// Resolve a profile picture reference to a servable URL. The sentinel
/// default lives in embedded assets, everything else in the uploads dir.
pub fn avatar_url(profile_picture: &str) -> String {
    if profile_picture == DEFAULT_PROFILE_PICTURE {
        "/assets/img/default-avatar.svg".to_string()
    } else {
        format!("/uploads/{}", profile_picture)
    }
}
