// Failure taxonomy for the legacy-session bridge.
//
// Only steps 1 and 2 of the login pipeline produce these; the enrichment
// steps degrade to fallback values instead of failing the call.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginFailure {
    /// The legacy login page rendered without a `_csrf` hidden field.
    /// Fatal: nothing can be POSTed without it.
    #[error("CSRF token not found in legacy login page")]
    CsrfTokenMissing,

    /// The credential POST did not come back as a redirect. The legacy
    /// server signals success only via HTTP 302; a 200 is its error page.
    #[error("legacy server rejected credentials (status {status})")]
    InvalidCredentials { status: u16 },

    /// Could not reach the legacy server at all.
    #[error("legacy server unreachable: {0}")]
    UpstreamUnavailable(String),

    /// A single call or the whole pipeline exceeded its deadline.
    #[error("login pipeline timed out")]
    Timeout,

    /// Anything escaping the pipeline that is not one of the expected
    /// outcomes. The client only ever sees the generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LoginFailure {
    /// Stable machine-readable code for client handling.
    pub fn code(&self) -> &'static str {
        match self {
            LoginFailure::CsrfTokenMissing => "CSRF_TOKEN_MISSING",
            LoginFailure::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            LoginFailure::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            LoginFailure::Timeout => "TIMEOUT",
            LoginFailure::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// User-facing message. Never leaks upstream details or stack traces.
    pub fn message(&self) -> &'static str {
        match self {
            LoginFailure::CsrfTokenMissing => "CSRF token not found",
            LoginFailure::InvalidCredentials { .. } => "login failed, check credentials",
            LoginFailure::UpstreamUnavailable(_) => "legacy server is not responding",
            LoginFailure::Timeout => "login timed out",
            LoginFailure::Internal(_) => "server error occurred",
        }
    }
}

impl From<reqwest::Error> for LoginFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LoginFailure::Timeout
        } else if err.is_connect() {
            LoginFailure::UpstreamUnavailable(err.to_string())
        } else if err.is_body() || err.is_decode() {
            LoginFailure::Internal(err.to_string())
        } else {
            LoginFailure::UpstreamUnavailable(err.to_string())
        }
    }
}
