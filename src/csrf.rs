use axum_sessions::async_session::Session;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ring::{
    constant_time::verify_slices_are_equal,
    rand::{SecureRandom, SystemRandom},
};

use crate::error::AppError;

const SESSION_KEY: &str = "csrf_token";
const TOKEN_BYTES: usize = 32;

fn new_token() -> Result<String, ring::error::Unspecified> {
    let mut bytes = [0u8; TOKEN_BYTES];
    SystemRandom::new().fill(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Returns the session's anti-forgery token, issuing one on first use.
pub fn get_or_create_token(session: &mut Session) -> Result<String, AppError> {
    if let Some(token) = session.get::<String>(SESSION_KEY) {
        return Ok(token);
    }
    let token = new_token()?;
    session.insert(SESSION_KEY, &token)?;
    Ok(token)
}

/// True iff `submitted` is non-empty and matches the token stored in the session.
pub fn validate(session: &Session, submitted: &str) -> bool {
    if submitted.is_empty() {
        return false;
    }
    match session.get::<String>(SESSION_KEY) {
        Some(expected) => verify_slices_are_equal(expected.as_bytes(), submitted.as_bytes()).is_ok(),
        None => false,
    }
}
