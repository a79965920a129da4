//! Timestamped HMAC signing primitive
//!
//! The envelope format, stable across releases:
//!
//! ```text
//! b64(payload) "." b64(unix_seconds_decimal) "." b64(HMAC-SHA256 tag)
//! ```
//!
//! where `b64` is base64url without padding and the tag covers the first two
//! encoded parts joined by `"."`. The MAC key is derived as
//! `SHA-256("scopeseal.signer" || salt || secret)`, so the salt participates
//! in every signature: tokens minted under one salt (and therefore one
//! protocol-version combination) never verify under another.

use crate::error::TokenError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const KEY_CONTEXT: &[u8] = b"scopeseal.signer";

fn derive_key(secret: &[u8], salt: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(KEY_CONTEXT);
    hasher.update(salt.as_bytes());
    hasher.update(secret);
    hasher.finalize().into()
}

fn mac_for(secret: &[u8], salt: &str) -> Result<HmacSha256, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidKey);
    }
    HmacSha256::new_from_slice(&derive_key(secret, salt)).map_err(|_| TokenError::InvalidKey)
}

/// Wrap `payload` in a signed envelope stamped with `issued_at`.
pub(crate) fn sign_at(
    payload: &[u8],
    secret: &[u8],
    salt: &str,
    issued_at: DateTime<Utc>,
) -> Result<String, TokenError> {
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
    let timestamp_b64 = URL_SAFE_NO_PAD.encode(issued_at.timestamp().to_string());

    let mut mac = mac_for(secret, salt)?;
    mac.update(payload_b64.as_bytes());
    mac.update(b".");
    mac.update(timestamp_b64.as_bytes());
    let tag = mac.finalize().into_bytes();

    Ok(format!(
        "{payload_b64}.{timestamp_b64}.{}",
        URL_SAFE_NO_PAD.encode(tag)
    ))
}

/// Open a signed envelope: structure, then signature, then age.
///
/// Returns the raw payload bytes. The signature check is constant-time;
/// the timestamp is only interpreted after the tag has verified.
pub(crate) fn unsign_at(
    token: &str,
    secret: &[u8],
    salt: &str,
    max_age: Option<Duration>,
    now: DateTime<Utc>,
) -> Result<Vec<u8>, TokenError> {
    let mut parts = token.split('.');
    let (payload_b64, timestamp_b64, tag_b64) =
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(payload), Some(timestamp), Some(tag), None) => (payload, timestamp, tag),
            _ => return Err(TokenError::Malformed),
        };
    let tag = URL_SAFE_NO_PAD
        .decode(tag_b64)
        .map_err(|_| TokenError::Malformed)?;

    let mut mac = mac_for(secret, salt)?;
    mac.update(payload_b64.as_bytes());
    mac.update(b".");
    mac.update(timestamp_b64.as_bytes());
    mac.verify_slice(&tag).map_err(|_| TokenError::BadSignature)?;

    if let Some(max_age) = max_age {
        let issued_at = decode_timestamp(timestamp_b64)?;
        if now.signed_duration_since(issued_at) > max_age {
            return Err(TokenError::Expired);
        }
    }

    URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| TokenError::Malformed)
}

fn decode_timestamp(timestamp_b64: &str) -> Result<DateTime<Utc>, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(timestamp_b64)
        .map_err(|_| TokenError::Malformed)?;
    let seconds: i64 = std::str::from_utf8(&bytes)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or(TokenError::Malformed)?;
    DateTime::from_timestamp(seconds, 0).ok_or(TokenError::Malformed)
}
