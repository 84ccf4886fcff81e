//! Connection tickets: short-lived signed tokens that stand in for a player's
//! credentials when opening a game connection.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use super::{
    errors::AuthResult,
    models::{PlayerId, TicketClaims},
};

/// Default ticket lifetime.
pub const DEFAULT_TICKET_TTL: Duration = Duration::hours(1);

/// Issues and verifies HS256 connection tickets.
#[derive(Clone)]
pub struct TicketService {
    secret: String,
    ttl: Duration,
}

impl TicketService {
    /// Create a ticket service
    ///
    /// # Arguments
    ///
    /// * `secret` - Secret key for JWT signing
    pub fn new(secret: String) -> Self {
        Self::with_ttl(secret, DEFAULT_TICKET_TTL)
    }

    pub fn with_ttl(secret: String, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a ticket for `player_id`.
    pub fn issue_ticket(&self, player_id: PlayerId) -> AuthResult<String> {
        let now = Utc::now();
        let claims = TicketClaims {
            sub: player_id,
            jti: Uuid::new_v4().to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Verify a ticket's signature and expiry and return its claims.
    pub fn verify_ticket(&self, token: &str) -> AuthResult<TicketClaims> {
        let token_data = decode::<TicketClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// The player a ticket was issued to, if the ticket is still valid.
    pub fn resolve_ticket(&self, token: &str) -> Option<PlayerId> {
        match self.verify_ticket(token) {
            Ok(claims) => Some(claims.sub),
            Err(e) => {
                log::debug!("Rejected ticket: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for TicketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
