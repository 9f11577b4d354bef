//! Common error type shared by every stage of the pipeline.
//!
//! Transient vs. fatal is encoded in the variant, not discovered by the
//! caller: [`Error::is_transient`] is what backoff loops consult.

/// Common error type for movies-etl.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A connection to the content store or search engine could not be
    /// established or was reset mid-request. Retryable.
    #[error("connection error: {0}")]
    Connection(String),

    /// A request timed out waiting to connect or to read a response.
    /// Retryable.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The search engine returned a transient 5xx status. Retryable.
    #[error("search engine returned {status}: {body}")]
    SearchTransient { status: u16, body: String },

    /// The search engine rejected the request outright (4xx). Fatal for the
    /// current tick.
    #[error("search engine rejected request ({status}): {body}")]
    SearchRejected { status: u16, body: String },

    /// A SQL statement failed for a reason other than a transient
    /// connection problem (syntax error, unknown column, ...). Fatal for
    /// the process.
    #[error("SQL error: {0}")]
    Sql(String),

    /// The cursor store failed to read or write its backing file. Fatal;
    /// without a durable cursor the pipeline would reprocess unbounded data.
    #[error("cursor store error: {0}")]
    CursorStore(String),

    /// A source row was missing a required field (e.g. a null primary key)
    /// and was skipped.
    #[error("malformed row: {0}")]
    MalformedRow(String),

    /// Invalid configuration supplied at startup.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for conditions that don't fit the categories above.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn sql<S: Into<String>>(msg: S) -> Self {
        Self::Sql(msg.into())
    }

    pub fn cursor_store<S: Into<String>>(msg: S) -> Self {
        Self::CursorStore(msg.into())
    }

    pub fn malformed_row<S: Into<String>>(msg: S) -> Self {
        Self::MalformedRow(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether a backoff loop should retry this error: connection/timeout/5xx
    /// are transient, everything else is fatal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::Timeout(_) | Error::SearchTransient { .. }
        )
    }

    /// Whether this error must abort the whole process rather than just
    /// the current tick. §7: SQL syntax/unknown-column errors are fatal
    /// for the process; a cursor store write failure is fatal because
    /// without a durably advanced cursor the pipeline would reprocess
    /// unbounded data. Everything else (a rejected document, a malformed
    /// row) surfaces to the driver, which logs it and retries next
    /// interval.
    pub fn is_process_fatal(&self) -> bool {
        matches!(self, Error::Sql(_) | Error::CursorStore(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::connection("refused");
        assert_eq!(err.to_string(), "connection error: refused");

        let err = Error::SearchRejected {
            status: 400,
            body: "bad mapping".into(),
        };
        assert_eq!(
            err.to_string(),
            "search engine rejected request (400): bad mapping"
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(Error::connection("x").is_transient());
        assert!(Error::timeout("x").is_transient());
        assert!(Error::SearchTransient {
            status: 503,
            body: String::new()
        }
        .is_transient());

        assert!(!Error::sql("syntax error").is_transient());
        assert!(!Error::SearchRejected {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!Error::cursor_store("disk full").is_transient());
    }

    #[test]
    fn test_is_process_fatal() {
        assert!(Error::sql("syntax error").is_process_fatal());
        assert!(Error::cursor_store("disk full").is_process_fatal());

        assert!(!Error::connection("x").is_process_fatal());
        assert!(!Error::timeout("x").is_process_fatal());
        assert!(!Error::SearchRejected {
            status: 400,
            body: String::new()
        }
        .is_process_fatal());
        assert!(!Error::malformed_row("null id").is_process_fatal());
    }
}
