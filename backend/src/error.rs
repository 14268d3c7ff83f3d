//! Error types for availability operations.
//!
//! Every fallible operation in the crate returns [`FetchResult`]. The variants
//! mirror where a failure originated: the remote archive, its response, the
//! local cache, descriptor validation or configuration.

use std::fmt;

/// Result type for availability operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Structured context for fetch errors.
///
/// Records where and why an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "fetch", "cache_write")
    pub operation: Option<String>,
    /// The data product involved, rendered as `descriptor[stream]`
    pub product: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
    /// Whether the caller may retry
    pub retryable: bool,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the product involved.
    pub fn with_product(mut self, product: impl ToString) -> Self {
        self.product = Some(product.to_string());
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Mark this error as retryable.
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref product) = self.product {
            parts.push(format!("product={}", product));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    Protocol,
    Cache,
    Validation,
    Configuration,
}

/// Error type for availability operations
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The archive was unreachable, timed out, or answered with a failure status.
    #[error("Network error: {message} {context}")]
    NetworkError {
        message: String,
        context: ErrorContext,
    },

    /// The archive answered but the body could not be understood.
    #[error("Protocol error: {message} {context}")]
    ProtocolError {
        message: String,
        context: ErrorContext,
    },

    /// The local cache could not be read or written.
    #[error("Cache error: {message} {context}")]
    CacheError {
        message: String,
        context: ErrorContext,
    },

    /// A descriptor was rejected before being embedded in a query.
    #[error("Validation error: {message} {context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },
}

impl FetchError {
    /// Create a network error. Network errors are retryable.
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    /// Create a network error with full context.
    pub fn network_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NetworkError {
            message: message.into(),
            context: context.retryable(),
        }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a protocol error with context.
    pub fn protocol_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ProtocolError {
            message: message.into(),
            context,
        }
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::CacheError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a cache error with context.
    pub fn cache_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::CacheError {
            message: message.into(),
            context,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::NetworkError { .. } => FetchErrorKind::Network,
            Self::ProtocolError { .. } => FetchErrorKind::Protocol,
            Self::CacheError { .. } => FetchErrorKind::Cache,
            Self::ValidationError { .. } => FetchErrorKind::Validation,
            Self::ConfigurationError { .. } => FetchErrorKind::Configuration,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.context().retryable
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::NetworkError { context, .. }
            | Self::ProtocolError { context, .. }
            | Self::CacheError { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConfigurationError { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::NetworkError { context, .. }
            | Self::ProtocolError { context, .. }
            | Self::CacheError { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConfigurationError { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add or update the product in the error context.
    pub fn with_product(mut self, product: impl ToString) -> Self {
        self.context_mut().product = Some(product.to_string());
        self
    }
}

#[cfg(feature = "http-client")]
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let details = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_status() {
            "status"
        } else {
            "request"
        };
        FetchError::network_with_context(
            err.to_string(),
            ErrorContext::default().with_details(details),
        )
    }
}
