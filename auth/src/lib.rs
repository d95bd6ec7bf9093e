//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the account service:
//! - Password hashing (Argon2id) and strength checks
//! - Signed, time-limited access tokens carrying a user identity
//! - Authentication coordination (verify password, then issue a token)
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("Secure_pass1").unwrap();
//! assert!(hasher.verify(&hash, "Secure_pass1").is_ok());
//! assert!(auth::password::is_strong("Secure_pass1"));
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::TokenService;
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!");
//! let token = tokens.issue(42).unwrap();
//! assert_eq!(tokens.extract_user_id(&token).unwrap(), 42);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("Secure_pass1").unwrap();
//!
//! // Login: verify and issue token
//! let result = auth.authenticate("Secure_pass1", &hash, 42).unwrap();
//!
//! // Later requests: verify token
//! let header = format!("Bearer {}", result.access_token);
//! let user_id = auth.tokens().extract_user_id(auth::bearer_token(&header)).unwrap();
//! assert_eq!(user_id, 42);
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::bearer_token;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenService;
pub use password::PasswordError;
pub use password::PasswordHasher;
