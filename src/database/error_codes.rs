//! PostgreSQL Error Codes
//!
//! SQLSTATE codes the workflow store reacts to. Only codes actually matched on are
//! listed here.
//!
//! Full list: <https://www.postgresql.org/docs/current/errcodes-appendix.html>

/// PostgreSQL SQLSTATE error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PgErrorCode;

impl PgErrorCode {
    /// Unique violation (duplicate key) - Code 23505
    ///
    /// Raised when a second stage is inserted for an existing (sop_id, user_id) pair.
    pub const UNIQUE_VIOLATION: &'static str = "23505";

    /// Check if the error code is a unique constraint violation
    #[inline]
    pub fn is_unique_violation(code: &str) -> bool {
        code == Self::UNIQUE_VIOLATION
    }
}
