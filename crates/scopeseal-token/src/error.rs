//! Token error taxonomy
//!
//! Every variant that can occur during validation is folded into a plain
//! `false` by [`TokenCodec::validate`](crate::TokenCodec::validate), so a
//! caller can never distinguish tampering from expiry from format damage.
//! Only `generate` surfaces errors, and only for misconfiguration.

/// Errors raised while encoding or decoding token envelopes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token string does not have the documented three-part shape, or a
    /// part is not valid base64url / UTF-8 / JSON.
    #[error("malformed token")]
    Malformed,

    /// The HMAC tag does not match the payload under the composite salt.
    #[error("token signature mismatch")]
    BadSignature,

    /// The embedded timestamp is older than the caller's `max_age`.
    #[error("token expired")]
    Expired,

    /// A compacted id inside a signed scope has no entry in the active
    /// lookup table. Fatal on decode: a missing entry must not silently
    /// widen into a wildcard selector.
    #[error("unresolvable compacted id {id}")]
    UnresolvableId {
        /// The id that could not be resolved.
        id: u64,
    },

    /// The scope could not be serialized for signing.
    #[error("scope serialization failed: {message}")]
    Serialization {
        /// Underlying serializer message.
        message: String,
    },

    /// The signing key is unusable (for example, empty). This is a fatal
    /// configuration error and the only way `generate` can fail outside of
    /// serialization.
    #[error("signing key is not usable")]
    InvalidKey,
}
