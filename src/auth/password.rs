use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Password too weak: {0}")]
    TooWeak(String),
}

/// Minimum password requirements: 8+ characters with at least one letter
/// and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), PasswordError> {
    if password.len() < 8 {
        return Err(PasswordError::TooWeak(
            "must be at least 8 characters".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(PasswordError::TooWeak(
            "must contain at least one letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::TooWeak(
            "must contain at least one digit".to_string(),
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_weak_passwords() {
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("allletters").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("goodpass1").is_ok());
    }

    #[test]
    fn hash_verifies_round_trip() {
        let hash = hash_password("goodpass1").unwrap();
        assert!(verify_password("goodpass1", &hash).unwrap());
        assert!(!verify_password("wrongpass1", &hash).unwrap());
    }
}
