use std::future::Future;
use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::future::Shared;
use futures::FutureExt;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::RepositoryInitError;
use crate::user::errors::UserError;

type RepositoryFactory<R> =
    Box<dyn Fn() -> BoxFuture<'static, Result<R, RepositoryInitError>> + Send + Sync>;

type Construction<R> = Shared<BoxFuture<'static, Result<Arc<R>, RepositoryInitError>>>;

/// Repository whose backend is constructed on first use.
///
/// The factory runs at most once per process, on its own task, and every
/// caller awaits that one construction. Dropping a caller mid-construction
/// does not stop it. A failed construction is remembered and every later call
/// reports the same error as `UserError::StorageUnavailable`.
pub struct LazyUserRepository<R> {
    factory: RepositoryFactory<R>,
    construction: OnceLock<Construction<R>>,
}

impl<R> LazyUserRepository<R>
where
    R: UserRepository,
{
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RepositoryInitError>> + Send + 'static,
    {
        Self {
            factory: Box::new(move || factory().boxed()),
            construction: OnceLock::new(),
        }
    }

    /// Return the shared backend, constructing it if nobody has yet.
    ///
    /// # Errors
    /// The construction error, identical for every caller.
    pub async fn initialize(&self) -> Result<Arc<R>, RepositoryInitError> {
        self.construction
            .get_or_init(|| self.spawn_construction())
            .clone()
            .await
    }

    fn spawn_construction(&self) -> Construction<R> {
        let task = tokio::spawn((self.factory)());

        async move {
            match task.await {
                Ok(Ok(repository)) => {
                    tracing::info!("Storage backend initialized");
                    Ok(Arc::new(repository))
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Storage backend initialization failed");
                    Err(e)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Storage backend construction task failed");
                    Err(RepositoryInitError::Aborted(e.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }
}

#[async_trait]
impl<R> UserRepository for LazyUserRepository<R>
where
    R: UserRepository,
{
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        self.initialize().await?.create(user).await
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        self.initialize().await?.list_all().await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.initialize().await?.find_by_id(id).await
    }

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<User>, UserError> {
        self.initialize().await?.find_by_nickname(nickname).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.initialize().await?.find_by_email(email).await
    }

    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, UserError> {
        self.initialize().await?.update(id, changes).await
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.initialize().await?.delete(id).await
    }
}
