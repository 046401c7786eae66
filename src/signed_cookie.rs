//! Signed session cookie values
//!
//! The session id is JSON-encoded and base64'd. With secrets configured the
//! result is signed as `value + "." + base64(hmac_sha256(value, secret))` with
//! trailing `=` padding removed. Verification tries every secret so old secrets
//! keep working during rotation.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Encode a session id into a cookie value, signing with the first secret
pub fn encode_cookie_value(id: &str, secrets: &[String]) -> String {
    let encoded = encode_data(id);
    match secrets.first() {
        Some(secret) => sign(&encoded, secret),
        None => encoded,
    }
}

/// Decode a cookie value into a session id.
///
/// Returns None when no secret verifies the signature or the payload is malformed.
pub fn decode_cookie_value(value: &str, secrets: &[String]) -> Option<String> {
    if secrets.is_empty() {
        return decode_data(value);
    }
    secrets
        .iter()
        .find_map(|secret| unsign(value, secret))
        .and_then(decode_data)
}

fn encode_data(id: &str) -> String {
    // Serializing a &str to JSON cannot fail
    let json = serde_json::Value::String(id.to_string()).to_string();
    STANDARD.encode(json)
}

fn decode_data(value: &str) -> Option<String> {
    let bytes = STANDARD.decode(value).ok()?;
    serde_json::from_slice::<String>(&bytes).ok()
}

fn mac_for(value: &str, secret: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(value.as_bytes());
    mac
}

/// Sign a value: `value.signature`, signature is unpadded base64
pub fn sign(value: &str, secret: &str) -> String {
    let signature = mac_for(value, secret).finalize().into_bytes();
    format!("{}.{}", value, STANDARD_NO_PAD.encode(signature))
}

/// Verify a signed value and return the unsigned part
pub fn unsign<'a>(input: &'a str, secret: &str) -> Option<&'a str> {
    let dot_pos = input.rfind('.')?;
    let value = &input[..dot_pos];
    let signature = STANDARD_NO_PAD.decode(&input[dot_pos + 1..]).ok()?;

    // verify_slice compares in constant time
    mac_for(value, secret).verify_slice(&signature).ok()?;
    Some(value)
}
