//! Save failure taxonomy reported on the diagnostic channel.

use thiserror::Error;

use crate::DiagnosticSink;

/// Failure observed while executing a save.
///
/// These never reach the caller of `save`; they are rendered to a [`DiagnosticSink`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    /// No document context exists to act in.
    #[error("save is unsupported in this environment")]
    EnvironmentUnsupported,
    /// A fetch or probe request failed.
    #[error("could not download file from `{url}`: {reason}")]
    Network {
        /// Requested URL.
        url: String,
        /// Host-reported failure.
        reason: String,
    },
    /// The caller used a deprecated argument shape.
    #[error("Deprecated: {0}")]
    DeprecatedUsage(String),
    /// The host refused to open a popup window.
    #[error("popup blocked; navigating the current document instead")]
    PopupBlocked,
    /// A host primitive failed.
    #[error("{operation} failed: {reason}")]
    Host {
        /// Primitive that failed.
        operation: &'static str,
        /// Host-reported failure.
        reason: String,
    },
}

impl SaveError {
    pub(crate) fn host(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Host {
            operation,
            reason: reason.into(),
        }
    }

    /// Writes the failure to `sink` at the matching severity.
    pub fn report(&self, sink: &dyn DiagnosticSink) {
        match self {
            Self::EnvironmentUnsupported => {}
            Self::DeprecatedUsage(_) | Self::PopupBlocked => sink.warn(&self.to_string()),
            Self::Network { .. } | Self::Host { .. } => sink.error(&self.to_string()),
        }
    }
}
