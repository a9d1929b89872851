//! `X-Line-Signature` verification.
//!
//! LINE signs every webhook body with HMAC-SHA256 keyed by the channel secret
//! and sends the base64 digest in the header.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

fn digest(channel_secret: &str, body: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes()).ok()?;
    mac.update(body);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Base64 signature LINE would send for `body`.
#[must_use]
pub fn sign_body(channel_secret: &str, body: &[u8]) -> String {
    digest(channel_secret, body)
        .map(|bytes| STANDARD.encode(bytes))
        .unwrap_or_default()
}

/// Checks `signature` against the body digest in constant time.
///
/// A header that is not valid base64 is rejected.
#[must_use]
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(provided) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Some(expected) = digest(channel_secret, body) else {
        return false;
    };
    expected.as_slice().ct_eq(provided.as_slice()).into()
}
