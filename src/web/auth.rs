// Auth: password hashing and stateless HMAC-SHA256 session cookies.
//
// Session token format: {user_id}.{timestamp_secs}.{nonce_hex}.{hmac_hex}
//
// The HMAC covers "{user_id}.{timestamp_secs}.{nonce_hex}" signed with
// VERBATIM_SESSION_SECRET. Tokens are valid for SESSION_TTL_SECS (24 hours).
//
// Login flow:
//   POST /api/login { username, password } → look up user → verify Argon2 hash
//     success: set verbatim_session cookie with new HMAC token
//     failure: 404 (no such user) or 401 (wrong password)
//
// Auth check (this middleware):
//   extract verbatim_session cookie → parse → verify HMAC → verify age →
//   load user → allow

use anyhow::Result;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use super::{api_error, AppState, AuthUser};

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name.
pub const COOKIE_NAME: &str = "verbatim_session";

/// Session lifetime: 24 hours.
pub const SESSION_TTL_SECS: i64 = 86_400;

// --- Passwords ---

/// Hash a password with Argon2 and a random salt. Returns a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid stored password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

// --- Session tokens ---

/// Build a new session token for `user_id`, signed with `secret`.
///
/// Returns the raw cookie value (the token string, not the full Set-Cookie header).
pub fn create_token(secret: &str, user_id: i64) -> Result<String> {
    let timestamp = Utc::now().timestamp();

    let mut nonce_bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = hex::encode(nonce_bytes);

    let payload = format!("{user_id}.{timestamp}.{nonce}");
    let sig = hmac_sign(secret, &payload)?;

    Ok(format!("{payload}.{sig}"))
}

/// Verify a session token. Returns the user ID if the HMAC is valid and the
/// token is not older than `SESSION_TTL_SECS`.
pub fn verify_token(secret: &str, token: &str) -> Option<i64> {
    let parts: Vec<&str> = token.splitn(4, '.').collect();
    let [user_id, timestamp, nonce, provided_sig] = parts.as_slice() else {
        return None;
    };

    let payload = format!("{user_id}.{timestamp}.{nonce}");
    let expected_sig = hmac_sign(secret, &payload).ok()?;
    if !constant_time_eq(provided_sig, &expected_sig) {
        return None;
    }

    let timestamp: i64 = timestamp.parse().ok()?;
    let age = Utc::now().timestamp().saturating_sub(timestamp);
    if !(0..SESSION_TTL_SECS).contains(&age) {
        return None;
    }

    user_id.parse().ok()
}

/// Axum middleware: reject requests without a valid session cookie with 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(user_id) = session_user_id(&request, &state.config.session_secret) else {
        return api_error(StatusCode::UNAUTHORIZED, "Authentication required");
    };

    // The account may have been removed since the cookie was issued
    let user = match state.db.find_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return api_error(StatusCode::UNAUTHORIZED, "Authentication required"),
        Err(e) => {
            tracing::error!(error = %e, user_id, "DB error loading session user");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        username: user.username,
    });
    next.run(request).await
}

/// Build the `Set-Cookie` header value for a new session.
pub fn set_cookie_header(token: &str, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{COOKIE_NAME}={token}; HttpOnly{secure_flag}; SameSite=Strict; Path=/; Max-Age={SESSION_TTL_SECS}"
    )
}

/// Build the `Set-Cookie` header value that clears the session cookie.
pub fn clear_cookie_header() -> String {
    format!("{COOKIE_NAME}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0")
}

// --- Private helpers ---

fn hmac_sign(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid session secret: {e}"))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Extract and verify the session cookie, returning the user ID it carries.
fn session_user_id(request: &Request, session_secret: &str) -> Option<i64> {
    let cookie_header = request.headers().get(header::COOKIE)?.to_str().ok()?;

    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == COOKIE_NAME)
        .and_then(|(_, value)| verify_token(session_secret, value.trim()))
}
