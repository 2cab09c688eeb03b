//! Repository implementations.
//!
//! Repositories take the pool for plain reads and `&mut PgConnection`
//! for mutations that must share a caller-owned transaction.

pub mod file;
pub mod folder;
pub mod quota;

use drivebox_core::error::{AppError, ErrorKind};

/// Serialization failure / deadlock codes that signal a lost race rather
/// than a data error. Callers retry these with backoff.
const CONFLICT_CODES: [&str; 2] = ["40001", "40P01"];

/// Map a sqlx error into an [`AppError`], detecting transaction conflicts.
///
/// Public so the service layer can map `begin`/`commit` failures the same
/// way the repositories map statement failures.
pub fn map_db_err(context: &'static str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        if let Some(code) = db_err.code() {
            if CONFLICT_CODES.contains(&code.as_ref()) {
                return AppError::with_source(
                    ErrorKind::TransactionConflict,
                    "Structural mutation lost a race; retry",
                    e,
                );
            }
        }
    }
    AppError::with_source(ErrorKind::Database, context, e)
}

/// Whether a sqlx error is a unique violation on the named constraint.
pub(crate) fn violates_constraint(e: &sqlx::Error, constraint: &str) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.constraint() == Some(constraint))
}

/// Escape a string for use as the fixed prefix of a `LIKE ... ESCAPE '\'`
/// pattern. Folder names may legitimately contain `%` and `_`.
pub(crate) fn escape_like(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passthrough() {
        assert_eq!(escape_like("/docs/2024/"), "/docs/2024/");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("/100%_done/"), "/100\\%\\_done/");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
