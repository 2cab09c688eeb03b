//! Materialized-path arithmetic for subtree renames.

use drivebox_core::path;

/// Compute the canonical path a folder gets when its own segment is
/// replaced by `new_name`.
///
/// `current_path` is the folder's materialized path and `depth` the index
/// of its own name within it; ancestors stay untouched. The result is
/// both the folder's new path and the new prefix for rewriting every
/// descendant's path.
pub fn renamed_prefix(current_path: &str, depth: i32, new_name: &str) -> String {
    let mut segments = path::segments(current_path);
    let idx = depth as usize;
    debug_assert!(idx < segments.len(), "depth out of range for {current_path}");
    segments[idx] = new_name;
    format!("/{}/", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_level_rename() {
        assert_eq!(renamed_prefix("/docs/", 0, "archive"), "/archive/");
    }

    #[test]
    fn test_nested_rename_keeps_ancestors() {
        assert_eq!(
            renamed_prefix("/docs/2024/q3/", 2, "q4"),
            "/docs/2024/q4/"
        );
        assert_eq!(
            renamed_prefix("/docs/2024/q3/", 1, "2025"),
            "/docs/2025/q3/"
        );
    }

    #[test]
    fn test_rename_round_trip_restores_path() {
        let original = "/docs/2024/";
        let renamed = renamed_prefix(original, 0, "archive");
        assert_eq!(renamed, "/archive/2024/");
        let restored = renamed_prefix(&renamed, 0, "docs");
        assert_eq!(restored, original);
    }

    #[test]
    fn test_rename_to_same_name_is_identity() {
        assert_eq!(renamed_prefix("/docs/2024/", 1, "2024"), "/docs/2024/");
    }
}
