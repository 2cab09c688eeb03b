//! Namespace path codec.
//!
//! Pure functions converting between human-supplied path strings and the
//! canonical internal form. Canonical paths always start and end with `/`;
//! the root of a user's namespace is the bare `"/"`. No I/O, no state.

use crate::error::AppError;
use crate::result::AppResult;

/// The canonical root path.
pub const ROOT: &str = "/";

/// Normalize a raw path string into canonical form.
///
/// Missing, empty, and `"/"` inputs all normalize to the root. Any other
/// input gets exactly one leading and one trailing slash. Inputs containing
/// `..`, a backslash, or an embedded empty segment are rejected with
/// `InvalidPath`.
pub fn normalize(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == ROOT {
        return Ok(ROOT.to_string());
    }

    if trimmed.contains('\\') {
        return Err(AppError::invalid_path("Path must not contain backslashes"));
    }

    let mut path = String::with_capacity(trimmed.len() + 2);
    if !trimmed.starts_with('/') {
        path.push('/');
    }
    path.push_str(trimmed);
    if !path.ends_with('/') {
        path.push('/');
    }

    if path.contains("//") {
        return Err(AppError::invalid_path("Path contains an empty segment"));
    }
    if segments(&path).iter().any(|s| *s == "..") {
        return Err(AppError::invalid_path("Path must not contain '..'"));
    }

    Ok(path)
}

/// Split a canonical path into its ordered segment names.
///
/// The root path yields no segments.
pub fn segments(canonical: &str) -> Vec<&str> {
    canonical.split('/').filter(|s| !s.is_empty()).collect()
}

/// Validate a single folder or file name.
///
/// Names must be non-empty after trimming and must not contain path
/// separators or `..`.
pub fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::invalid_name("Name cannot be empty"));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(AppError::invalid_name(
            "Name contains invalid characters",
        ));
    }
    Ok(())
}

/// Compute the canonical path of a child named `name` under `parent_path`.
///
/// `parent_path` must already be canonical (ends with `/`); the root
/// parent is `"/"`.
pub fn child_path(parent_path: &str, name: &str) -> String {
    format!("{parent_path}{name}/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_normalize_root_forms() {
        assert_eq!(normalize("").unwrap(), "/");
        assert_eq!(normalize("/").unwrap(), "/");
        assert_eq!(normalize("   ").unwrap(), "/");
    }

    #[test]
    fn test_normalize_adds_brackets() {
        assert_eq!(normalize("docs").unwrap(), "/docs/");
        assert_eq!(normalize("/docs").unwrap(), "/docs/");
        assert_eq!(normalize("docs/").unwrap(), "/docs/");
        assert_eq!(normalize("/docs/2024/").unwrap(), "/docs/2024/");
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        for bad in ["/a//b/", "a/../b", "..", "a\\b"] {
            let err = normalize(bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidPath, "input: {bad}");
        }
    }

    #[test]
    fn test_segments() {
        assert!(segments("/").is_empty());
        assert_eq!(segments("/docs/"), vec!["docs"]);
        assert_eq!(segments("/docs/2024/q3/"), vec!["docs", "2024", "q3"]);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("report.pdf").is_ok());
        assert!(validate_name("2024").is_ok());
        assert_eq!(
            validate_name("").unwrap_err().kind,
            ErrorKind::InvalidName
        );
        assert_eq!(
            validate_name("a/b").unwrap_err().kind,
            ErrorKind::InvalidName
        );
        assert_eq!(
            validate_name("a\\b").unwrap_err().kind,
            ErrorKind::InvalidName
        );
        assert_eq!(
            validate_name("..").unwrap_err().kind,
            ErrorKind::InvalidName
        );
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("/", "docs"), "/docs/");
        assert_eq!(child_path("/docs/", "2024"), "/docs/2024/");
    }

    #[test]
    fn test_normalize_then_segments_round_trip() {
        let canonical = normalize("docs/2024").unwrap();
        let rebuilt = format!("/{}/", segments(&canonical).join("/"));
        assert_eq!(rebuilt, canonical);
    }
}
