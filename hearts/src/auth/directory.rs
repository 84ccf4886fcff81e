//! Player directory: who exists, how they prove it, and what they're doing.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    errors::{AuthError, AuthResult},
    models::{Player, PlayerId, PlayerStatus},
};

/// Storage and lookup of player identities.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    /// Register a new player and return its ID.
    async fn create_player(&self, name: &str, password: &str) -> AuthResult<PlayerId>;

    async fn get_player(&self, id: PlayerId) -> Option<Player>;

    async fn find_player_id(&self, name: &str) -> Option<PlayerId>;

    /// Check `password` against the stored credentials of `id`.
    async fn authenticate(&self, id: PlayerId, password: &str) -> bool;

    /// Forget a player. Returns whether it existed.
    async fn remove_player(&self, id: PlayerId) -> bool;

    async fn set_status(&self, id: PlayerId, status: PlayerStatus) -> AuthResult<()>;
}

#[derive(Debug)]
struct PlayerRecord {
    player: Player,
    password_hash: String,
}

#[derive(Debug, Default)]
struct DirectoryTables {
    players: HashMap<PlayerId, PlayerRecord>,
    names: HashMap<String, PlayerId>,
    next_id: PlayerId,
}

/// In-process player directory. Passwords are stored as Argon2id hashes of
/// the password plus a server-side pepper.
#[derive(Debug)]
pub struct InMemoryPlayerDirectory {
    pepper: String,
    tables: RwLock<DirectoryTables>,
}

impl InMemoryPlayerDirectory {
    /// Create an empty directory
    ///
    /// # Arguments
    ///
    /// * `pepper` - Server-side pepper appended to every password before hashing
    pub fn new(pepper: String) -> Self {
        Self {
            pepper,
            tables: RwLock::new(DirectoryTables {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.players.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidPassword)?;
        let argon2 = Argon2::default();

        argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidPassword)
    }

    fn validate_name(name: &str) -> AuthResult<()> {
        let len = name.chars().count();
        if !(3..=20).contains(&len) {
            return Err(AuthError::InvalidName(
                "Name must be 3-20 characters".to_string(),
            ));
        }

        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(AuthError::InvalidName(
                "Name can only contain letters, numbers, and underscores".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_password(password: &str) -> AuthResult<()> {
        if password.is_empty() {
            return Err(AuthError::WeakPassword(
                "Password must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PlayerDirectory for InMemoryPlayerDirectory {
    async fn create_player(&self, name: &str, password: &str) -> AuthResult<PlayerId> {
        Self::validate_name(name)?;
        Self::validate_password(password)?;

        if self.tables.read().await.names.contains_key(name) {
            return Err(AuthError::NameTaken);
        }
        let password_hash = self.hash_password(password)?;

        let mut tables = self.tables.write().await;
        // Re-check under the write lock; hashing happens outside of it.
        if tables.names.contains_key(name) {
            return Err(AuthError::NameTaken);
        }
        let id = tables.next_id;
        tables.next_id += 1;
        tables.names.insert(name.to_string(), id);
        tables.players.insert(
            id,
            PlayerRecord {
                player: Player {
                    id,
                    name: name.to_string(),
                    status: PlayerStatus::Idle,
                },
                password_hash,
            },
        );
        drop(tables);

        log::info!("Player {} created as {}", id, name);
        Ok(id)
    }

    async fn get_player(&self, id: PlayerId) -> Option<Player> {
        self.tables
            .read()
            .await
            .players
            .get(&id)
            .map(|record| record.player.clone())
    }

    async fn find_player_id(&self, name: &str) -> Option<PlayerId> {
        self.tables.read().await.names.get(name).copied()
    }

    async fn authenticate(&self, id: PlayerId, password: &str) -> bool {
        let hash = match self.tables.read().await.players.get(&id) {
            Some(record) => record.password_hash.clone(),
            None => return false,
        };
        match self.verify_password(password, &hash) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Player {} failed authentication: {}", id, e);
                false
            }
        }
    }

    async fn remove_player(&self, id: PlayerId) -> bool {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.players.remove(&id) else {
            return false;
        };
        tables.names.remove(&record.player.name);
        log::info!("Player {} ({}) removed", id, record.player.name);
        true
    }

    async fn set_status(&self, id: PlayerId, status: PlayerStatus) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        let record = tables
            .players
            .get_mut(&id)
            .ok_or(AuthError::PlayerNotFound)?;
        record.player.status = status;
        log::debug!("Player {} is now {}", id, status);
        Ok(())
    }
}
