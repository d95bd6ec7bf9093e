use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::RepositoryInitError;
use crate::user::errors::UserError;

const USER_COLUMNS: &str = "id, username, nickname, email, password_hash, created_at";

/// Unique text columns a single user can be looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupColumn {
    Nickname,
    Email,
}

impl LookupColumn {
    fn as_str(self) -> &'static str {
        match self {
            LookupColumn::Nickname => "nickname",
            LookupColumn::Email => "email",
        }
    }

    fn select_query(self) -> String {
        format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, self.as_str())
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    nickname: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id)
            .map_err(|_| UserError::DatabaseError(format!("negative user id {}", row.id)))?;

        Ok(User {
            id: UserId(id),
            username: row.username,
            nickname: row.nickname,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

/// Relational user storage backed by PostgreSQL.
///
/// Ids come from the `BIGSERIAL` column. Every mutation is a single statement.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and bring the schema up to date.
    ///
    /// # Errors
    /// * `Connection` - Database is unreachable
    /// * `Migration` - Embedded migrations failed to apply
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, RepositoryInitError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| RepositoryInitError::Connection(e.to_string()))?;
        tracing::info!(
            max_connections,
            database = "postgresql",
            "Database connection pool created"
        );

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| RepositoryInitError::Migration(e.to_string()))?;
        tracing::info!(database = "postgresql", "Database migrations completed");

        Ok(Self::new(pool))
    }

    async fn fetch_one_by(
        &self,
        column: LookupColumn,
        value: &str,
    ) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&column.select_query())
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }
}

/// Ids above `i64::MAX` cannot exist in a `BIGSERIAL` column.
fn to_row_id(id: &UserId) -> Option<i64> {
    i64::try_from(id.0).ok()
}

fn map_write_error(e: sqlx::Error, username: &str, email: &str) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("users_username_key") {
                return UserError::UsernameAlreadyExists(username.to_string());
            }
            if db_err.constraint() == Some("users_email_key") {
                return UserError::EmailAlreadyExists(email.to_string());
            }
        }
    }
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (username, nickname, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.nickname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.username, &user.email))?;

        User::try_from(row)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY id ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let Some(row_id) = to_row_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<User>, UserError> {
        self.fetch_one_by(LookupColumn::Nickname, nickname).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.fetch_one_by(LookupColumn::Email, email).await
    }

    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, UserError> {
        let row_id = to_row_id(id).ok_or(UserError::NotFound(*id))?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET username = $2, nickname = $3, email = $4
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(row_id)
        .bind(&changes.username)
        .bind(&changes.nickname)
        .bind(&changes.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &changes.username, &changes.email))?;

        match row {
            Some(row) => User::try_from(row),
            None => Err(UserError::NotFound(*id)),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let row_id = to_row_id(id).ok_or(UserError::NotFound(*id))?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(row_id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(*id));
        }

        Ok(())
    }
}
