//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Password verification failed
    #[error("Invalid password")]
    InvalidPassword,

    /// Player not found
    #[error("Player not found")]
    PlayerNotFound,

    /// Name already registered
    #[error("Name already taken")]
    NameTaken,

    /// Invalid name format
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Password rejected
    #[error("Invalid password: {0}")]
    WeakPassword(String),

    /// JWT token error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Hashing and JWT errors are sanitized so clients learn nothing about the
    /// server's key material or token structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::HashingFailed => "Internal server error".to_string(),
            AuthError::JwtError(_) => "Authentication failed".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_internals() {
        assert_eq!(AuthError::HashingFailed.client_message(), "Internal server error");
        assert_eq!(AuthError::NameTaken.client_message(), "Name already taken");
        assert_eq!(
            AuthError::InvalidName("too short".to_string()).client_message(),
            "Invalid name: too short"
        );
    }
}
