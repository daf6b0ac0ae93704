//! Stored-media handling: extension validation, generated filenames, and
//! the uploads directory.

use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// File types accepted for video upload.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "jpg", "jpeg", "png"];

/// Subset accepted for profile pictures.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Check a user-supplied filename against an allow-list, case-insensitively.
pub fn is_allowed(filename: &str, allowed: &[&str]) -> bool {
    match extension_of(filename) {
        Some(ext) => allowed.contains(&ext.as_str()),
        None => false,
    }
}

/// Validate an upload's filename, returning `UnsupportedMedia` when the
/// extension is missing or not on the allow-list.
pub fn validate_extension(filename: &str, allowed: &[&str]) -> AppResult<()> {
    if is_allowed(filename, allowed) {
        Ok(())
    } else {
        Err(AppError::UnsupportedMedia(format!(
            "File type not allowed: {}",
            filename
        )))
    }
}

/// Strip everything but alphanumerics, dots, dashes and underscores from a
/// user-supplied filename. Path separators never survive.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect()
}

/// Generate the stored name for an upload: a random token prefix keeps
/// names collision-free and decoupled from user input.
pub fn stored_filename(original: &str) -> String {
    format!("{}_{}", uuid::Uuid::now_v7(), sanitize_filename(original))
}

/// Write uploaded bytes under the uploads directory.
pub fn save(uploads_dir: &Path, stored_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    std::fs::create_dir_all(uploads_dir)?;
    let path = uploads_dir.join(stored_name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Best-effort removal of a superseded stored file. Absence is a no-op;
/// names carrying path separators are refused outright.
pub fn remove(uploads_dir: &Path, stored_name: &str) -> AppResult<()> {
    if stored_name.contains('/') || stored_name.contains('\\') {
        return Err(AppError::BadRequest("Invalid stored filename".into()));
    }
    let path = uploads_dir.join(stored_name);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_is_case_insensitive() {
        assert!(is_allowed("clip.mp4", ALLOWED_EXTENSIONS));
        assert!(is_allowed("clip.MP4", ALLOWED_EXTENSIONS));
        assert!(is_allowed("clip.MoV", ALLOWED_EXTENSIONS));
        assert!(is_allowed("photo.JPEG", ALLOWED_EXTENSIONS));
        assert!(!is_allowed("malware.exe", ALLOWED_EXTENSIONS));
        assert!(!is_allowed("script.mp4.sh", ALLOWED_EXTENSIONS));
        assert!(!is_allowed("noextension", ALLOWED_EXTENSIONS));
        assert!(!is_allowed("trailingdot.", ALLOWED_EXTENSIONS));
    }

    #[test]
    fn image_subset_excludes_video_types() {
        assert!(is_allowed("avatar.png", IMAGE_EXTENSIONS));
        assert!(is_allowed("avatar.JPG", IMAGE_EXTENSIONS));
        assert!(!is_allowed("avatar.mp4", IMAGE_EXTENSIONS));
        assert!(!is_allowed("avatar.mov", IMAGE_EXTENSIONS));
    }

    #[test]
    fn validate_extension_maps_to_unsupported_media() {
        assert!(validate_extension("clip.mp4", ALLOWED_EXTENSIONS).is_ok());
        let err = validate_extension("clip.avi", ALLOWED_EXTENSIONS).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMedia(_)));
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("my clip (1).mp4"), "myclip1.mp4");
        assert_eq!(sanitize_filename("clean-name_01.mp4"), "clean-name_01.mp4");
    }

    #[test]
    fn stored_filenames_are_unique_per_call() {
        let a = stored_filename("clip.mp4");
        let b = stored_filename("clip.mp4");
        assert_ne!(a, b);
        assert!(a.ends_with("_clip.mp4"));
        assert!(!a.contains('/'));
    }

    #[test]
    fn save_and_remove_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let name = stored_filename("clip.mp4");

        let path = save(tmp.path(), &name, b"fake video bytes").unwrap();
        assert!(path.exists());

        remove(tmp.path(), &name).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn remove_tolerates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        remove(tmp.path(), "never-existed.mp4").unwrap();
    }

    #[test]
    fn remove_refuses_path_separators() {
        let tmp = tempfile::tempdir().unwrap();
        let err = remove(tmp.path(), "../outside.mp4").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn save_creates_uploads_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("uploads");
        let path = save(&nested, "a_clip.mp4", b"bytes").unwrap();
        assert!(path.exists());
    }
}
