// Account handlers: POST /api/signup, /api/login and /api/logout.
//
// Signup: rejects blank fields (400) and taken usernames (409), stores an
// Argon2 hash of the password.
//
// Login: unknown username is 404, wrong password is 401, success sets a
// signed HMAC session cookie.
//
// Logout: clears the session cookie.
//
// Argon2 hashing and verification run on the blocking thread pool.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use tracing::{error, info};

use crate::web::auth::{
    clear_cookie_header, create_token, hash_password, set_cookie_header, verify_password,
};
use crate::web::{api_error, AppState, AuthUser};

#[derive(Deserialize)]
pub struct Credentials {
    username: String,
    password: String,
}

/// POST /api/signup: register a new account.
pub async fn signup(State(state): State<AppState>, Json(body): Json<Credentials>) -> Response {
    let username = body.username.trim().to_string();
    if username.is_empty() || body.password.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "Username and password are required");
    }

    match state.db.find_user_by_username(&username).await {
        Ok(Some(_)) => return api_error(StatusCode::CONFLICT, "Username already exists"),
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "DB error checking username");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    }

    let password = body.password;
    let hash = match tokio::task::spawn_blocking(move || hash_password(&password)).await {
        Ok(Ok(hash)) => hash,
        Ok(Err(e)) => {
            error!(error = %e, "Password hashing failed");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not create account");
        }
        Err(e) => {
            error!(error = %e, "Password hashing task panicked");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not create account");
        }
    };

    match state.db.create_user(&username, &hash).await {
        Ok(Some(id)) => {
            info!(user_id = id, username = %username, "Created account");
            (
                StatusCode::CREATED,
                Json(serde_json::json!({ "id": id, "username": username })),
            )
                .into_response()
        }
        // Lost a race with a concurrent signup for the same name
        Ok(None) => api_error(StatusCode::CONFLICT, "Username already exists"),
        Err(e) => {
            error!(error = %e, "DB error creating user");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}

/// POST /api/login: authenticate with username and password.
///
/// On success: returns 200 with a signed session cookie.
pub async fn login(State(state): State<AppState>, Json(body): Json<Credentials>) -> Response {
    let user = match state.db.find_user_by_username(body.username.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => return api_error(StatusCode::NOT_FOUND, "No user found"),
        Err(e) => {
            error!(error = %e, "DB error looking up user");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };

    let password = body.password;
    let stored_hash = user.password_hash.clone();
    let verified =
        tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await;

    match verified {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => return api_error(StatusCode::UNAUTHORIZED, "Wrong password"),
        Ok(Err(e)) => {
            error!(error = %e, user_id = user.id, "Stored password hash is unreadable");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not verify password");
        }
        Err(e) => {
            error!(error = %e, "Password verification task panicked");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not verify password");
        }
    }

    let token = match create_token(&state.config.session_secret, user.id) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Failed to sign session token");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not start session");
        }
    };
    // The server can't see TLS behind a proxy; Secure is left to the proxy.
    let cookie = set_cookie_header(&token, false);

    info!(user_id = user.id, "User logged in");

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "message": "Authenticated", "username": user.username })),
    )
        .into_response()
}

/// POST /api/logout: clear the session cookie.
pub async fn logout(Extension(user): Extension<AuthUser>) -> Response {
    info!(user_id = user.user_id, username = %user.username, "User logged out");
    let cookie = clear_cookie_header();
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "message": "Logged out" })),
    )
        .into_response()
}
