use argon2::{
    password_hash::{
        rand_core::OsRng, Error, PasswordHasher, SaltString
    }, Argon2, PasswordHash, PasswordVerifier
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::schema::JWTClaims;

pub fn hash_password(password:&str)->Result<String, Error>{

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2.hash_password(password.as_bytes(), salt.as_salt())?.to_string();
    Ok(password_hash)
}

pub fn verify_password(password:&str, hash:&str)->Result<(), Error>{

    let argon2 = Argon2::default();
    let parsed_hash = PasswordHash::new(hash)?;
    argon2.verify_password(password.as_bytes(), &parsed_hash)?;

    Ok(())
}

/// Signs a session token for `email` that expires after `ttl_hours`.
pub fn issue_token(email:&str, secret:&str, ttl_hours:i64) -> Result<String, jsonwebtoken::errors::Error>{
    let expires = Utc::now() + Duration::hours(ttl_hours);

    let claims = JWTClaims{
        sub: email.to_string(),
        exp: expires.timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn decode_token(token:&str, secret:&str) -> Result<JWTClaims, jsonwebtoken::errors::Error>{
    decode::<JWTClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
}

/// Lowercase ASCII slug: runs of anything non-alphanumeric collapse into one `-`.
pub fn slugify(value:&str) -> String{
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(verify_password("wrong horse", &hash).is_err());
    }

    #[test]
    fn token_carries_subject() {
        let token = issue_token("admin@example.com", "secret", 1).unwrap();
        assert_eq!(decode_token(&token, "secret").unwrap().sub, "admin@example.com");
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token("admin@example.com", "secret", -2).unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Web Development"), "web-development");
        assert_eq!(slugify("  C++ & Rust!  "), "c-rust");
        assert_eq!(slugify("Data/ML 101"), "data-ml-101");
    }
}
