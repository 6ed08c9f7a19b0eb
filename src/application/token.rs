//! Structured decode of the bearer token's payload segment.
//!
//! The token is never verified here; the claims only seed the local user
//! record. The backend stays the authority on what the token grants.

use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::session::UserId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token must have three dot-separated segments, found {0}")]
    Segments(usize),
    #[error("token payload is not valid base64")]
    Encoding,
    #[error("token payload is not a JSON object: {0}")]
    Payload(String),
    #[error("token payload carries no user identifier")]
    MissingSubject,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(default)]
    sub: Option<UserId>,
    #[serde(default)]
    email: Option<String>,
}

/// Identity claims extracted from a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub email: Option<String>,
}

/// Decode the middle segment of a `header.payload.signature` token.
///
/// `user_id` wins over `sub`; empty strings and `0` count as absent.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Segments(segments.len()));
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|_| TokenError::Encoding)?;

    let raw: RawClaims =
        serde_json::from_slice(&bytes).map_err(|err| TokenError::Payload(err.to_string()))?;

    let user_id = [raw.user_id, raw.sub]
        .into_iter()
        .flatten()
        .find(|id| match id {
            UserId::Numeric(id) => *id != 0,
            UserId::Text(text) => !text.trim().is_empty(),
        })
        .ok_or(TokenError::MissingSubject)?;

    Ok(TokenClaims {
        user_id,
        email: raw.email.filter(|email| !email.is_empty()),
    })
}

#[cfg(test)]
pub(crate) fn encode_for_tests(payload: &serde_json::Value) -> String {
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{body}.signature")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prefers_user_id_over_sub() {
        let token = encode_for_tests(&json!({"sub": "ann", "user_id": 42, "email": "a@x.io"}));
        let claims = decode_claims(&token).expect("claims");
        assert_eq!(claims.user_id, UserId::Numeric(42));
        assert_eq!(claims.email.as_deref(), Some("a@x.io"));
    }

    #[test]
    fn falls_back_to_sub() {
        let token = encode_for_tests(&json!({"sub": "ann"}));
        let claims = decode_claims(&token).expect("claims");
        assert_eq!(claims.user_id, UserId::Text("ann".into()));
        assert!(claims.email.is_none());
    }

    #[test]
    fn zero_user_id_falls_back_to_sub() {
        let token = encode_for_tests(&json!({"user_id": 0, "sub": "7"}));
        let claims = decode_claims(&token).expect("claims");
        assert_eq!(claims.user_id, UserId::Text("7".into()));

        let token = encode_for_tests(&json!({"user_id": 0}));
        assert_eq!(decode_claims(&token), Err(TokenError::MissingSubject));
    }

    #[test]
    fn accepts_padded_standard_alphabet() {
        let body = base64::engine::general_purpose::STANDARD.encode(r#"{"user_id":7}"#);
        let token = format!("h.{body}.s");
        assert_eq!(decode_claims(&token).expect("claims").user_id, UserId::Numeric(7));
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert_eq!(decode_claims("only.two"), Err(TokenError::Segments(2)));
        assert_eq!(decode_claims("opaque"), Err(TokenError::Segments(1)));
    }

    #[test]
    fn rejects_garbage_payloads() {
        assert_eq!(decode_claims("a.!!!.c"), Err(TokenError::Encoding));

        let not_json = URL_SAFE_NO_PAD.encode("hello");
        assert!(matches!(
            decode_claims(&format!("a.{not_json}.c")),
            Err(TokenError::Payload(_))
        ));
    }

    #[test]
    fn requires_an_identifier() {
        let token = encode_for_tests(&json!({"email": "a@x.io", "sub": ""}));
        assert_eq!(decode_claims(&token), Err(TokenError::MissingSubject));
    }
}
