use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserDraft;
use crate::domain::user::models::UserId;
use crate::domain::user::validation::Operation;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository + ?Sized,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository + ?Sized,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    pub fn new(repository: Arc<UR>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository + ?Sized,
{
    async fn create_user(&self, mut draft: UserDraft) -> Result<User, UserError> {
        draft.validate(Operation::Register, &self.password_hasher)?;

        let new_user = NewUser {
            username: draft.username,
            nickname: draft.nickname,
            email: draft.email,
            password_hash: draft.password,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(new_user).await?;
        tracing::info!(user_id = %created_user.id, "User created");

        Ok(created_user)
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(*id))
    }

    async fn get_user_by_nickname(&self, nickname: &str) -> Result<User, UserError> {
        let nickname = nickname.trim();

        self.repository
            .find_by_nickname(nickname)
            .await?
            .ok_or_else(|| UserError::NotFoundByNickname(nickname.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, UserError> {
        let email = email.trim();

        self.repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| UserError::NotFoundByEmail(email.to_string()))
    }

    async fn update_user(&self, id: &UserId, mut draft: UserDraft) -> Result<User, UserError> {
        draft.validate(Operation::Update, &self.password_hasher)?;

        let changes = UserChanges {
            username: draft.username,
            nickname: draft.nickname,
            email: draft.email,
        };

        let updated_user = self.repository.update(id, changes).await?;
        tracing::info!(user_id = %updated_user.id, "User updated");

        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }
}
