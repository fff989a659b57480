use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, error};

use crate::gateway::{GatewayError, Window};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("{operation} failed: {source}")]
    Protocol {
        operation: &'static str,
        #[source]
        source: GatewayError,
    },

    #[error("window {0:#x} is not managed")]
    UnknownClient(Window),

    #[error("window {0:#x} is not maximized")]
    NotMaximized(Window),
}

impl FrameError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, FrameError::Protocol { source, .. } if source.is_fatal())
    }
}

/// Tag a gateway result with the name of the request that produced it.
pub trait OperationExt<T> {
    fn during(self, operation: &'static str) -> Result<T, FrameError>;
}

impl<T> OperationExt<T> for Result<T, GatewayError> {
    fn during(self, operation: &'static str) -> Result<T, FrameError> {
        self.map_err(|source| FrameError::Protocol { operation, source })
    }
}

/// Error tracking for frame operations
pub struct ErrorTracker {
    protocol_errors: AtomicU64,
    decoration_errors: AtomicU64,
    window_errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A request the server rejected
    Protocol,
    /// Surface allocation, rendering or blitting
    Decoration,
    /// Lifecycle preconditions and bookkeeping
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStatus {
    pub protocol_errors: u64,
    pub decoration_errors: u64,
    pub window_errors: u64,
    pub is_healthy: bool,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self {
            protocol_errors: AtomicU64::new(0),
            decoration_errors: AtomicU64::new(0),
            window_errors: AtomicU64::new(0),
        }
    }

    pub fn record(&self, category: ErrorCategory, operation: &str, error: impl std::fmt::Display) {
        let (counter, label) = match category {
            ErrorCategory::Protocol => (&self.protocol_errors, "Protocol"),
            ErrorCategory::Decoration => (&self.decoration_errors, "Decoration"),
            ErrorCategory::Window => (&self.window_errors, "Window management"),
        };
        counter.fetch_add(1, Ordering::Relaxed);
        error!("{} error in {}: {}", label, operation, error);
    }

    pub fn warn_if_failed<T, E: std::fmt::Display>(
        &self,
        result: Result<T, E>,
        operation: &str,
        category: ErrorCategory,
    ) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.record(category, operation, e);
                None
            }
        }
    }

    pub fn health_check(&self) -> HealthStatus {
        let protocol = self.protocol_errors.load(Ordering::Relaxed);
        let decoration = self.decoration_errors.load(Ordering::Relaxed);
        let window = self.window_errors.load(Ordering::Relaxed);

        HealthStatus {
            protocol_errors: protocol,
            decoration_errors: decoration,
            window_errors: window,
            is_healthy: protocol < 10 && decoration < 5 && window < 10,
        }
    }
}

impl Default for ErrorTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Log and ignore errors (for teardown of things that may already be gone)
pub fn log_and_ignore<T, E: std::fmt::Display>(result: Result<T, E>, operation: &str) {
    if let Err(e) = result {
        debug!("Ignoring error in {}: {}", operation, e);
    }
}
