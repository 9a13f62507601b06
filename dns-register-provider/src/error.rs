use serde::{Deserialize, Serialize};

/// Unified error type for all DNS provider operations.
///
/// Each variant includes a `provider` field identifying which provider produced the error,
/// plus variant-specific context. All variants are serializable for structured error reporting.
///
/// # Transient Errors
///
/// The following variants represent failures that may succeed on a later reconciliation pass:
/// - [`NetworkError`](Self::NetworkError): network connectivity issues
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): API rate limit exceeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The provided credentials are invalid or expired.
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The zone does not exist on the provider.
    ZoneNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Zone name that was not found.
        zone: String,
    },

    /// A record the request referred to does not exist.
    RecordNotFound {
        /// Provider that produced the error.
        provider: String,
        /// `name:TYPE` of the missing record.
        record: String,
    },

    /// A conflicting record already exists (e.g. a CNAME next to other data).
    RecordConflict {
        /// Provider that produced the error.
        provider: String,
        /// `name:TYPE` of the rejected record.
        record: String,
        /// Description of the conflict.
        detail: String,
    },

    /// A request parameter is invalid (e.g., malformed IP address, bad TTL).
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The provider does not implement the requested capability.
    Unsupported {
        /// Provider that produced the error.
        provider: String,
        /// Operation name (`set_records`, `append_records`, `delete_records`).
        operation: String,
    },

    /// The authenticated principal lacks permission for the requested operation.
    PermissionDenied {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The API rate limit has been exceeded.
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Suggested wait time in seconds, if provided by the API.
        retry_after: Option<u64>,
    },

    /// The request timed out.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// An unrecognized error from the provider API.
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// Whether the error is expected behavior (bad input, missing resources, etc.),
    /// used to pick the log level.
    ///
    /// `true` should be logged at `warn`, `false` at `error`.
    /// **Update this method whenever a variant is added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::ZoneNotFound { .. }
                | Self::RecordNotFound { .. }
                | Self::RecordConflict { .. }
                | Self::InvalidParameter { .. }
                | Self::Unsupported { .. }
                | Self::PermissionDenied { .. }
        )
    }

    /// Whether a later attempt may succeed without any configuration change.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// Name of the provider that produced this error.
    pub fn provider(&self) -> &str {
        match self {
            Self::NetworkError { provider, .. }
            | Self::InvalidCredentials { provider, .. }
            | Self::ZoneNotFound { provider, .. }
            | Self::RecordNotFound { provider, .. }
            | Self::RecordConflict { provider, .. }
            | Self::InvalidParameter { provider, .. }
            | Self::Unsupported { provider, .. }
            | Self::PermissionDenied { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid credentials")
                }
            }
            Self::ZoneNotFound { provider, zone } => {
                write!(f, "[{provider}] Zone '{zone}' not found")
            }
            Self::RecordNotFound { provider, record } => {
                write!(f, "[{provider}] Record '{record}' not found")
            }
            Self::RecordConflict {
                provider,
                record,
                detail,
            } => {
                write!(f, "[{provider}] Record '{record}' conflicts: {detail}")
            }
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::Unsupported {
                provider,
                operation,
            } => {
                write!(f, "[{provider}] Operation not supported: {operation}")
            }
            Self::PermissionDenied {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Permission denied: {msg}")
                } else {
                    write!(f, "[{provider}] Permission denied")
                }
            }
            Self::RateLimited {
                provider,
                retry_after,
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::Unknown {
                provider,
                raw_code,
                raw_message,
            } => {
                if let Some(code) = raw_code {
                    write!(f, "[{provider}] Unknown error ({code}): {raw_message}")
                } else {
                    write!(f, "[{provider}] Unknown error: {raw_message}")
                }
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
