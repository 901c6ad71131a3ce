//! Domain error kinds shared across the order store, use-case, outbox and
//! gateway layers.
//!
//! `PvzError` carries the four kinds from the specification's error-handling
//! design: callers are expected to inspect [`PvzError::kind`], never the
//! rendered message, which is why every variant also exists as a
//! [`PvzErrorKind`] for pattern matching without cloning the payload.

use thiserror::Error;

/// Coarse classification of a [`PvzError`], used by callers that only need to
/// branch on "what kind of failure was this" (the gateway's transport-code
/// mapping, the command server's error line, metrics labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PvzErrorKind {
    /// Entity absent (missing order, missing event on mark-sent).
    NotFound,
    /// Uniqueness violation (duplicate order id).
    AlreadyExists,
    /// Request violates a business rule (storage not expired, packaging/film
    /// conflict, weight over limit, malformed input).
    InvalidArgument,
    /// Unexpected failure from a collaborator (store or bus I/O).
    Internal,
}

/// Domain-level error type propagated by the order store, event store, order
/// use-case, and outbox relay.
#[derive(Debug, Error)]
pub enum PvzError {
    /// Entity absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Request violates a business rule.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unexpected failure from a collaborator. The kind is preserved even
    /// though the underlying cause is opaque to the caller.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PvzError {
    /// Classify this error without consuming it.
    #[must_use]
    pub const fn kind(&self) -> PvzErrorKind {
        match self {
            Self::NotFound(_) => PvzErrorKind::NotFound,
            Self::AlreadyExists(_) => PvzErrorKind::AlreadyExists,
            Self::InvalidArgument(_) => PvzErrorKind::InvalidArgument,
            Self::Internal(_) => PvzErrorKind::Internal,
        }
    }

    /// Build a [`PvzError::NotFound`] from any displayable context.
    pub fn not_found(context: impl std::fmt::Display) -> Self {
        Self::NotFound(context.to_string())
    }

    /// Build a [`PvzError::AlreadyExists`] from any displayable context.
    pub fn already_exists(context: impl std::fmt::Display) -> Self {
        Self::AlreadyExists(context.to_string())
    }

    /// Build a [`PvzError::InvalidArgument`] from any displayable context.
    pub fn invalid_argument(context: impl std::fmt::Display) -> Self {
        Self::InvalidArgument(context.to_string())
    }

    /// Build a [`PvzError::Internal`] from any displayable context.
    pub fn internal(context: impl std::fmt::Display) -> Self {
        Self::Internal(context.to_string())
    }
}

impl From<sqlx::Error> for PvzError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("row not found".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::AlreadyExists(db_err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Gateway-facing mapping from a domain error to a gRPC status code, per the
/// central error-classification interceptor described in the specification
/// (`NotFound -> NOT_FOUND`, `AlreadyExists -> ALREADY_EXISTS`,
/// `InvalidArgument -> INVALID_ARGUMENT`, else `Internal`). Unknown/opaque
/// error sources never reach this impl directly: the use-case layer already
/// collapsed them to a `PvzError::Internal` before they left the core.
impl From<PvzError> for tonic::Status {
    fn from(err: PvzError) -> Self {
        let message = err.to_string();
        match err.kind() {
            PvzErrorKind::NotFound => Self::not_found(message),
            PvzErrorKind::AlreadyExists => Self::already_exists(message),
            PvzErrorKind::InvalidArgument => Self::invalid_argument(message),
            PvzErrorKind::Internal => Self::internal(message),
        }
    }
}

/// Result alias used throughout the workspace's domain layers.
pub type PvzResult<T> = Result<T, PvzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_display() {
        let err = PvzError::not_found("order ord1");
        assert_eq!(err.kind(), PvzErrorKind::NotFound);
        assert!(err.to_string().contains("ord1"));
    }

    #[test]
    fn status_mapping_matches_spec_table() {
        assert_eq!(
            tonic::Status::from(PvzError::not_found("x")).code(),
            tonic::Code::NotFound
        );
        assert_eq!(
            tonic::Status::from(PvzError::already_exists("x")).code(),
            tonic::Code::AlreadyExists
        );
        assert_eq!(
            tonic::Status::from(PvzError::invalid_argument("x")).code(),
            tonic::Code::InvalidArgument
        );
        assert_eq!(
            tonic::Status::from(PvzError::internal("x")).code(),
            tonic::Code::Internal
        );
    }
}
