//! Password check and signed session tokens.
//!
//! A successful login issues an HS256 token stored in an HttpOnly cookie.
//! Protected handlers take an [`AuthContext`] argument; extracting it fails
//! with a redirect to `/login` before the handler body runs.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_512};

use crate::constants::SESSION_COOKIE;

/// Lowercase hex SHA3-512 of a password
pub fn digest_password(password: &str) -> String {
    format!("{:x}", Sha3_512::digest(password.as_bytes()))
}

/// True only when the digest of `password` equals `reference_hex`
pub fn check(password: &str, reference_hex: &str) -> bool {
    digest_password(password) == reference_hex.trim().to_ascii_lowercase()
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Keys and lifetime for session tokens
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Sign a new session token for the portal owner
    pub fn issue(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: "owner".to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Decode a token; `None` when the signature is wrong or it has expired
    pub fn verify(&self, token: &str) -> Option<AuthContext> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default()).ok()?;
        Some(AuthContext {
            subject: data.claims.sub,
            expires_at: DateTime::from_timestamp(data.claims.exp, 0)?,
        })
    }

    /// Cookie carrying a freshly issued token
    pub fn session_cookie(&self) -> Result<Cookie<'static>, jsonwebtoken::errors::Error> {
        let token = self.issue()?;
        Ok(Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build())
    }
}

/// Proof that the current request belongs to a logged-in session
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

impl<S> FromRequestParts<S> for AuthContext
where
    SessionKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| keys.verify(cookie.value()))
            .ok_or_else(|| Redirect::to("/login"))
    }
}

/// Remove the session cookie from a jar
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
