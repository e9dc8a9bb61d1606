//! Route handler for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, set_auth_cookie},
    user::{UserResponse, create_user, validate_email},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data sent by the client to register a new user.
#[derive(Clone, Deserialize)]
pub struct RegisterData {
    /// The email address to register with.
    pub email: String,
    /// The plain text password to register with.
    pub password: String,
}

/// Handler for registering a new user via the POST method.
///
/// On success the user is logged in immediately: the auth cookie is set and
/// the new user's ID and email are returned with a `201 Created` status.
///
/// # Errors
///
/// Returns an error response if:
/// - the email does not look like an email address,
/// - the password is too weak (see [ValidatedPassword::new]),
/// - a user is already registered with the email,
/// - or the database query fails.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Json(user_data): Json<RegisterData>,
) -> Result<(StatusCode, PrivateCookieJar, Json<UserResponse>), Error> {
    validate_email(&user_data.email)?;
    let validated_password = ValidatedPassword::new(&user_data.password)?;
    let password_hash = PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)
        .inspect_err(|error| {
            tracing::error!("An error occurred while hashing a password: {error}");
        })?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire lock to database connection");
        create_user(&user_data.email, password_hash, &connection)?
    };

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration).inspect_err(|error| {
        tracing::error!("An error occurred while setting the auth cookie: {error}");
    })?;

    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(user))))
}
