//! # Scopeseal Token
//!
//! Signed, expiring, self-contained capability tokens over the scope model
//! from `scopeseal-core`. A token proves its bearer was authorized for a
//! requested scope without any server-side lookup.
//!
//! ## Core Components
//!
//! - **Token Codec**: [`TokenCodec`] wraps a scope into a tamper-evident
//!   string and reverses the process
//! - **Compaction Plugin Chain**: [`CompactionChain`] of
//!   [`CompactionPlugin`]s shrinks selectors and permissions through
//!   external lookup tables
//! - **Compaction Tables**: [`TypeTable`] / [`PermissionTable`] seams, with
//!   in-memory implementations
//! - **Error Taxonomy**: [`TokenError`]; validation folds every variant into
//!   a plain `false`
//!
//! ## Token wire format
//!
//! ```text
//! b64(scope_json) "." b64(unix_seconds) "." b64(hmac_sha256_tag)
//! ```
//!
//! with unpadded base64url throughout. The HMAC key is derived from the
//! secret and a composite salt of the caller's salt, the token protocol
//! version and the compaction chain's protocol version, so tokens never
//! validate across incompatible configurations.
//!
//! ```
//! use scopeseal_token::{Scope, SecretKey, TokenCodec};
//!
//! let codec = TokenCodec::new(SecretKey::new("app-secret"));
//! let scope = Scope::for_namespace("blog", &["read"]);
//! let token = codec.generate(&scope)?;
//! assert!(codec.validate(&token, &Scope::for_namespace("blog", &["read"]), None));
//! # Ok::<(), scopeseal_token::TokenError>(())
//! ```

pub mod codec;
pub mod compact;
pub mod error;
mod signing;
pub mod tables;

pub use codec::{SecretKey, TokenCodec, DEFAULT_SALT, TOKEN_PROTOCOL_VERSION};
pub use compact::{
    CompactionChain, CompactionPlugin, PermissionCompaction, TypeCompaction, WireField, WireGrant,
    WireScope, SCOPE_PROTOCOL_VERSION,
};
pub use error::TokenError;
pub use tables::{MemoryPermissionTable, MemoryTypeTable, PermissionTable, TypeTable};

// Re-export the scope model so most applications depend on one crate.
pub use scopeseal_core::{is_authorized, Grant, Resource, ResourceRef, Scope, Selector};
