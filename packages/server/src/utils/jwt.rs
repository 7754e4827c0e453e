use anyhow::{Result, bail};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims of a login token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Email
    pub uid: i32,    // User ID
    pub role: String,
    pub exp: usize, // Expiration timestamp
}

/// Claims of a purpose-tagged short-lived token (e-mail verification).
#[derive(Debug, Serialize, Deserialize)]
pub struct PurposeClaims {
    pub sub: String, // Email
    pub purpose: String,
    pub exp: usize,
}

const EMAIL_VERIFICATION_PURPOSE: &str = "email-verification";

/// Sign a login token for a user, valid for 7 days.
pub fn sign(user_id: i32, email: &str, role: &str, secret: &str) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(7))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: email.to_owned(),
        uid: user_id,
        role: role.to_owned(),
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a login token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Sign an e-mail verification token, valid for 1 hour.
pub fn sign_verification(email: &str, secret: &str) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(1))
        .expect("valid timestamp")
        .timestamp();

    let claims = PurposeClaims {
        sub: email.to_owned(),
        purpose: EMAIL_VERIFICATION_PURPOSE.to_owned(),
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify an e-mail verification token and return the e-mail it was issued for.
pub fn verify_verification(token: &str, secret: &str) -> Result<String> {
    let token_data = decode::<PurposeClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    if token_data.claims.purpose != EMAIL_VERIFICATION_PURPOSE {
        bail!("wrong token purpose");
    }
    Ok(token_data.claims.sub)
}
