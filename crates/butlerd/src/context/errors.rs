//! Errors surfaced by request-context operations.

use std::error::Error as StdError;

use thiserror::Error;

use crate::cancel::Cancelled;
use crate::conn::ConnError;
use crate::storage::StorageError;

/// Boxed error returned by notification interceptors.
pub type InterceptorError = Box<dyn StdError + Send + Sync + 'static>;

/// Failures of outbound calls and notifications.
#[derive(Debug, Error)]
pub enum CallError {
    /// The call's cancellation signal had already fired.
    #[error("call interrupted")]
    Cancelled(#[from] Cancelled),

    /// The connection failed.
    #[error("outbound {method} failed")]
    Conn {
        /// Method of the outbound message.
        method: String,
        /// Underlying connection failure.
        #[source]
        source: ConnError,
    },

    /// Parameters could not be encoded.
    #[error("failed to encode params for {method}")]
    Encode {
        /// Method of the outbound message.
        method: String,
        /// Underlying codec failure.
        #[source]
        source: serde_json::Error,
    },

    /// The peer's result could not be decoded.
    #[error("failed to decode result of {method}")]
    Decode {
        /// Method of the outbound call.
        method: String,
        /// Underlying codec failure.
        #[source]
        source: serde_json::Error,
    },

    /// An installed interceptor rejected the notification.
    #[error("interceptor for {method} failed")]
    Intercepted {
        /// Intercepted method.
        method: String,
        /// Failure reported by the interceptor.
        #[source]
        source: InterceptorError,
    },
}

impl CallError {
    pub(crate) fn conn(method: &str, source: ConnError) -> Self {
        Self::Conn {
            method: method.to_owned(),
            source,
        }
    }

    pub(crate) fn encode(method: &str, source: serde_json::Error) -> Self {
        Self::Encode {
            method: method.to_owned(),
            source,
        }
    }

    pub(crate) fn decode(method: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            method: method.to_owned(),
            source,
        }
    }

    pub(crate) fn intercepted(method: &str, source: InterceptorError) -> Self {
        Self::Intercepted {
            method: method.to_owned(),
            source,
        }
    }
}

/// Failures resolving a profile-scoped client.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The caller passed the zero identifier.
    #[error("profileId must be non-zero")]
    ZeroProfileId,

    /// No profile exists with the identifier.
    #[error("Could not find profile {profile_id}")]
    NotFound {
        /// Requested identifier.
        profile_id: i64,
    },

    /// The profile exists but has no API key.
    #[error("Profile {profile_id} lacks API key")]
    MissingApiKey {
        /// Requested identifier.
        profile_id: i64,
    },

    /// The lookup itself failed.
    #[error("profile lookup failed")]
    Storage(#[from] StorageError),
}
