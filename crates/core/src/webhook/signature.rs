//! Webhook signature verification
//!
//! Signatures are HMAC-SHA256 over `{timestamp}.{body}`, hex-encoded.
//! Verification is constant-time; a malformed signature is simply invalid,
//! never an error.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded signature for a timestamped body.
#[must_use]
pub fn sign(secret: &str, timestamp: &str, body: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a presented signature against the expected one.
///
/// Accepts an optional `sha256=` prefix. Comparison runs in constant time
/// over the decoded bytes.
#[must_use]
pub fn verify(secret: &str, timestamp: &str, body: &str, signature: &str) -> bool {
    let presented = signature.strip_prefix("sha256=").unwrap_or(signature);
    let Ok(presented) = hex::decode(presented) else {
        return false;
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body.as_bytes());
    let expected = mac.finalize().into_bytes();

    expected.as_slice().ct_eq(&presented).into()
}
