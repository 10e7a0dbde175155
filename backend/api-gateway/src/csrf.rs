//! Double-submit CSRF tokens bound to a session
//!
//! Token format: `{expiry_unix}.{hex(HMAC-SHA256(secret, session_token "." expiry_unix))}`

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsrfError {
    #[error("malformed CSRF token")]
    Malformed,
    #[error("CSRF token expired")]
    Expired,
    #[error("CSRF token does not match session")]
    BadSignature,
    #[error("invalid CSRF secret")]
    InvalidKey,
}

#[derive(Clone)]
pub struct CsrfTokens {
    keyed: HmacSha256,
    ttl_secs: i64,
}

impl CsrfTokens {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Result<Self, CsrfError> {
        let keyed = HmacSha256::new_from_slice(secret).map_err(|_| CsrfError::InvalidKey)?;
        Ok(Self { keyed, ttl_secs })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    fn mac(&self, session_token: &str, expiry: i64) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(session_token.as_bytes());
        mac.update(b".");
        mac.update(expiry.to_string().as_bytes());
        mac
    }

    pub fn issue(&self, session_token: &str, now: i64) -> String {
        let expiry = now + self.ttl_secs;
        let signature = self.mac(session_token, expiry).finalize().into_bytes();
        format!("{}.{}", expiry, hex::encode(signature))
    }

    pub fn verify(&self, token: &str, session_token: &str, now: i64) -> Result<(), CsrfError> {
        let (expiry, signature) = token.split_once('.').ok_or(CsrfError::Malformed)?;
        let expiry: i64 = expiry.parse().map_err(|_| CsrfError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| CsrfError::Malformed)?;

        if expiry <= now {
            return Err(CsrfError::Expired);
        }

        self.mac(session_token, expiry)
            .verify_slice(&signature)
            .map_err(|_| CsrfError::BadSignature)
    }
}
