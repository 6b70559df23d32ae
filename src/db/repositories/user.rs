use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;

/// User data returned from the repository (without the password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub created_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            is_staff: model.is_staff,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub is_staff: bool,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new: NewUser, security: Option<&SecurityConfig>) -> Result<User> {
        let password = new.password.clone();
        let security = security.cloned();
        let password_hash =
            task::spawn_blocking(move || hash_password(&password, security.as_ref()))
                .await
                .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();
        let active = users::ActiveModel {
            email: Set(new.email),
            username: Set(new.username),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            password_hash: Set(password_hash),
            auth_token: Set(None),
            is_staff: Set(new.is_staff),
            created_at: Set(now),
            ..Default::default()
        };

        let res = users::Entity::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert user")?;

        let user = users::Entity::find_by_id(res.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created user"))?;

        Ok(User::from(user))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query users by IDs")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    /// Page of users ordered by id, plus the total count.
    pub async fn list(&self, page: u64, per_page: u64) -> Result<(Vec<User>, u64)> {
        let paginator = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .paginate(&self.conn, per_page);

        let count = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((rows.into_iter().map(User::from).collect(), count))
    }

    /// Verify credentials; returns the user on success, `None` for an
    /// unknown email or a wrong password.
    /// Argon2 verification runs in `spawn_blocking` because it is
    /// CPU-intensive and would stall the async runtime.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for credential check")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_hash(&password, &password_hash))
            .await
            .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }

    pub async fn verify_password(&self, user_id: i32, password: &str) -> Result<bool> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        let password_hash = user.password_hash;
        let password = password.to_string();

        task::spawn_blocking(move || verify_hash(&password, &password_hash))
            .await
            .context("Password verification task panicked")?
    }

    pub async fn set_password(
        &self,
        user_id: i32,
        new_password: &str,
        security: Option<&SecurityConfig>,
    ) -> Result<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User {user_id} not found"))?;

        let password = new_password.to_string();
        let security = security.cloned();
        let new_hash = task::spawn_blocking(move || hash_password(&password, security.as_ref()))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Issue a fresh auth token, replacing any previous one.
    pub async fn issue_token(&self, user_id: i32) -> Result<String> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for token issue")?
            .ok_or_else(|| anyhow::anyhow!("User {user_id} not found"))?;

        let token = generate_token();

        let mut active: users::ActiveModel = user.into();
        active.auth_token = Set(Some(token.clone()));
        active.update(&self.conn).await?;

        Ok(token)
    }

    pub async fn revoke_token(&self, user_id: i32) -> Result<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for token revocation")?
            .ok_or_else(|| anyhow::anyhow!("User {user_id} not found"))?;

        let mut active: users::ActiveModel = user.into();
        active.auth_token = Set(None);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::AuthToken.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query user by token")?;

        Ok(user.map(User::from))
    }
}

fn verify_hash(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password using Argon2id with optional custom params.
pub fn hash_password(password: &str, security: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = security {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Generate a random auth token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
