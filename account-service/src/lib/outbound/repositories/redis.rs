use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use deadpool_redis::redis::cmd;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::Config as RedisConfig;
use deadpool_redis::Connection;
use deadpool_redis::Pool;
use deadpool_redis::Runtime;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::RepositoryInitError;
use crate::user::errors::UserError;

/// Records expire one day after they are written.
pub const USER_TTL_SECONDS: u64 = 24 * 60 * 60;

const ID_COUNTER_KEY: &str = "users:next_id";

fn user_key(id: u64) -> String {
    format!("user:{}", id)
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredUser {
    id: u64,
    username: String,
    nickname: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<&User> for StoredUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        User {
            id: UserId(stored.id),
            username: stored.username,
            nickname: stored.nickname,
            email: stored.email,
            password_hash: stored.password_hash,
            created_at: stored.created_at,
        }
    }
}

/// Key-value user storage backed by Redis.
///
/// Only `create` and `find_by_id` are served. Ids are allocated with `INCR`
/// on a shared counter and records are JSON documents written with a TTL.
pub struct RedisUserRepository {
    pool: Pool,
}

impl RedisUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Build a connection pool and check the server answers `PING`.
    ///
    /// # Errors
    /// * `Connection` - Pool could not be built or the server is unreachable
    pub async fn connect(url: &str) -> Result<Self, RepositoryInitError> {
        let pool = RedisConfig::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| RepositoryInitError::Connection(e.to_string()))?;

        let mut conn = pool
            .get()
            .await
            .map_err(|e| RepositoryInitError::Connection(e.to_string()))?;

        cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| RepositoryInitError::Connection(e.to_string()))?;
        tracing::info!(database = "redis", "Redis connection pool created");

        Ok(Self::new(pool))
    }

    async fn connection(&self) -> Result<Connection, UserError> {
        self.pool
            .get()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for RedisUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut conn = self.connection().await?;

        let id: u64 = conn
            .incr(ID_COUNTER_KEY, 1)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let created = User {
            id: UserId(id),
            username: user.username,
            nickname: user.nickname,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };

        let payload = serde_json::to_string(&StoredUser::from(&created))
            .map_err(|e| UserError::Unknown(e.to_string()))?;

        conn.set_ex::<_, _, ()>(user_key(id), payload, USER_TTL_SECONDS)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        Err(UserError::Unsupported("list_all"))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let mut conn = self.connection().await?;

        let payload: Option<String> = conn
            .get(user_key(id.0))
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        match payload {
            Some(payload) => {
                let stored: StoredUser = serde_json::from_str(&payload)
                    .map_err(|e| UserError::DatabaseError(e.to_string()))?;
                Ok(Some(stored.into()))
            }
            None => Ok(None),
        }
    }

    async fn find_by_nickname(&self, _nickname: &str) -> Result<Option<User>, UserError> {
        Err(UserError::Unsupported("find_by_nickname"))
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, UserError> {
        Err(UserError::Unsupported("find_by_email"))
    }

    async fn update(&self, _id: &UserId, _changes: UserChanges) -> Result<User, UserError> {
        Err(UserError::Unsupported("update"))
    }

    async fn delete(&self, _id: &UserId) -> Result<(), UserError> {
        Err(UserError::Unsupported("delete"))
    }
}
