use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::user::errors::UserError;
use account_service::domain::user::models::NewUser;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserChanges;
use account_service::domain::user::models::UserId;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenService;
use serde_json::json;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Process-local repository with the same uniqueness rules as the relational store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<BTreeMap<u64, User>>,
    next_id: AtomicU64,
}

impl InMemoryUserRepository {
    fn conflict(
        users: &BTreeMap<u64, User>,
        skip: Option<u64>,
        username: &str,
        email: &str,
    ) -> Option<UserError> {
        for user in users.values().filter(|u| Some(u.id.0) != skip) {
            if user.username == username {
                return Some(UserError::UsernameAlreadyExists(username.to_string()));
            }
            if user.email == email {
                return Some(UserError::EmailAlreadyExists(email.to_string()));
            }
        }
        None
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if let Some(err) = Self::conflict(&users, None, &user.username, &user.email) {
            return Err(err);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = User {
            id: UserId(id),
            username: user.username,
            nickname: user.nickname,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };
        users.insert(id, stored.clone());

        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.lock().unwrap().get(&id.0).cloned())
    }

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.nickname == nickname)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&id.0) {
            return Err(UserError::NotFound(*id));
        }
        if let Some(err) = Self::conflict(&users, Some(id.0), &changes.username, &changes.email) {
            return Err(err);
        }

        let entry = users.get_mut(&id.0).ok_or(UserError::NotFound(*id))?;
        *entry = entry.clone().apply(changes);

        Ok(entry.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .lock()
            .unwrap()
            .remove(&id.0)
            .map(|_| ())
            .ok_or(UserError::NotFound(*id))
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub tokens: TokenService,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(InMemoryUserRepository::default())).await
    }

    /// Spawn the application on top of a specific repository
    pub async fn spawn_with<R: UserRepository>(repository: Arc<R>) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let user_service = Arc::new(UserService::new(repository));
        let authenticator = Arc::new(Authenticator::new(TEST_SECRET));

        let router = create_router(user_service, authenticator);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            tokens: TokenService::new(TEST_SECRET),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.put(self.url(path)).bearer_auth(token)
    }

    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(self.url(path)).bearer_auth(token)
    }

    /// Register a user with a strong password and return its id
    pub async fn register(&self, username: &str, nickname: &str, email: &str) -> u64 {
        let response = self
            .post("/users")
            .json(&json!({
                "username": username,
                "nickname": nickname,
                "email": email,
                "password": "Secure_pass1"
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["id"].as_u64().expect("id should be a number")
    }

    /// Log in with the password used by `register` and return the token
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .post("/login")
            .json(&json!({ "email": email, "password": "Secure_pass1" }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("token should be a string")
            .to_string()
    }
}
