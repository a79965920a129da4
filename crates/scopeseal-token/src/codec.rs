//! Token codec: signed, expiring scope envelopes
//!
//! [`TokenCodec`] turns a [`Scope`] into a compact signed string and back.
//! Generation serializes the scope through the configured compaction chain
//! and signs it under a composite salt that binds the caller's salt, the
//! token protocol version, and the chain's protocol version together.
//! Validation runs Parse → SignatureCheck → AgeCheck → Deserialize →
//! SubsetCheck; any failing stage folds to `false`, and only the subset
//! check can yield `true`.

use crate::compact::{CompactionChain, CompactionPlugin};
use crate::error::TokenError;
use crate::signing;
use chrono::{DateTime, Duration, Utc};
use scopeseal_core::{is_authorized, Scope};
use tracing::debug;

/// Salt used when the host application does not supply its own
/// domain-separation string.
pub const DEFAULT_SALT: &str = "scopeseal.token";

/// Version of the token envelope protocol, mixed into the composite salt so
/// incompatible envelope revisions fail signature checks instead of
/// misparsing.
pub const TOKEN_PROTOCOL_VERSION: &str = "1.0.0";

/// An HMAC signing secret.
///
/// The process-wide default secret is whatever the host application passes
/// here at construction; the library keeps no global state.
#[derive(Clone)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap secret bytes. An empty secret is accepted here but makes every
    /// `generate` call fail with [`TokenError::InvalidKey`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Issues and verifies signed scope tokens.
pub struct TokenCodec {
    secret: SecretKey,
    salt: String,
    chain: CompactionChain,
}

impl TokenCodec {
    /// Codec with the default salt and no compaction plugins.
    pub fn new(secret: SecretKey) -> Self {
        Self {
            secret,
            salt: DEFAULT_SALT.to_string(),
            chain: CompactionChain::new(),
        }
    }

    /// Replace the domain-separation salt.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    /// Append a compaction plugin to the chain. Order matters and is part of
    /// the protocol version.
    pub fn with_plugin(mut self, plugin: Box<dyn CompactionPlugin>) -> Self {
        self.chain.push(plugin);
        self
    }

    /// The composite salt actually fed into signing.
    fn composite_salt(&self) -> String {
        format!(
            "{}:{}:{}",
            self.salt,
            TOKEN_PROTOCOL_VERSION,
            self.chain.protocol_version()
        )
    }

    /// Generate a token for the given scope, stamped with the current time.
    ///
    /// Compaction-table misses fall back to the uncompacted representation;
    /// the only failures are a misconfigured key or scope serialization.
    pub fn generate(&self, scope: &Scope) -> Result<String, TokenError> {
        self.generate_at(scope, Utc::now())
    }

    /// Generate a token with an explicit issue time. Deterministic, which
    /// also makes it the seam tests use to exercise expiry.
    pub fn generate_at(
        &self,
        scope: &Scope,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let wire = self.chain.encode_scope(scope);
        let payload = serde_json::to_vec(&wire).map_err(|error| TokenError::Serialization {
            message: error.to_string(),
        })?;
        signing::sign_at(
            &payload,
            self.secret.as_bytes(),
            &self.composite_salt(),
            issued_at,
        )
    }

    /// Validate that `token` authorizes everything in `requested`.
    ///
    /// `max_age` of `None` disables the expiry check. Every failure —
    /// malformed token, bad signature, expiry, unresolvable compacted id —
    /// returns `false` without distinguishing why.
    pub fn validate(&self, token: &str, requested: &Scope, max_age: Option<Duration>) -> bool {
        self.validate_at(token, requested, max_age, Utc::now())
    }

    /// [`TokenCodec::validate`] against an explicit clock reading.
    pub fn validate_at(
        &self,
        token: &str,
        requested: &Scope,
        max_age: Option<Duration>,
        now: DateTime<Utc>,
    ) -> bool {
        match self.try_validate(token, requested, max_age, now) {
            Ok(authorized) => authorized,
            Err(error) => {
                debug!(%error, "token validation failed");
                false
            }
        }
    }

    fn try_validate(
        &self,
        token: &str,
        requested: &Scope,
        max_age: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<bool, TokenError> {
        let payload = signing::unsign_at(
            token,
            self.secret.as_bytes(),
            &self.composite_salt(),
            max_age,
            now,
        )?;
        let wire = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
        let granted = self.chain.decode_scope(&wire)?;
        Ok(is_authorized(requested, &granted))
    }
}
