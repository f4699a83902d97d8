use crate::error::{AppError, AppResult};

pub fn hash(plaintext: &str, cost: u32) -> AppResult<String> {
    bcrypt::hash(plaintext, cost).map_err(|e| AppError::Internal(format!("bcrypt: {}", e)))
}

/// Constant-time check via bcrypt; a malformed hash never verifies.
pub fn verify(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

/// Letters, digits and `@.+-_`, 1 to 150 characters.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err("Username is required.");
    }
    if username.chars().count() > 150 {
        return Err("Username must be 150 characters or fewer.");
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err("Username may contain only letters, numbers, and @/./+/-/_ characters.");
    }
    Ok(())
}

pub fn validate_password(password: &str, confirmation: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must contain at least 8 characters.");
    }
    if password != confirmation {
        return Err("The two password fields didn't match.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash("correct horse", 4).unwrap();
        assert!(verify("correct horse", &hashed));
        assert!(!verify("battery staple", &hashed));
        assert!(!verify("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("UserCls").is_ok());
        assert!(validate_username("a.b+c-d_e@f").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("slash/name").is_err());
        assert!(validate_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("longenough", "longenough").is_ok());
        assert!(validate_password("short", "short").is_err());
        assert!(validate_password("longenough", "different1").is_err());
    }
}
