//! Password extraction from `Authorization: Basic` credentials.
//!
//! The username part is ignored. Only the header is consulted; a password
//! in the body or query string is never accepted.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroize;

use copybridge_common::Password;

const BASIC_PREFIX: &str = "basic ";

/// Extract the Basic-auth password from request headers.
///
/// Returns `None` when the header is absent or malformed; callers that need
/// a password then answer with 401.
pub fn basic_password(headers: &HeaderMap) -> Option<Password> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;

    if value.len() < BASIC_PREFIX.len()
        || !value[..BASIC_PREFIX.len()].eq_ignore_ascii_case(BASIC_PREFIX)
    {
        return None;
    }

    let mut decoded = STANDARD.decode(value[BASIC_PREFIX.len()..].trim()).ok()?;
    let password = decoded
        .iter()
        .position(|&b| b == b':')
        .map(|colon| Password::new(&decoded[colon + 1..]));
    decoded.zeroize();

    password
}
