use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claim set carried by an access token.
///
/// `user_id` identifies the account the token was issued to. `exp` and
/// `iat` are Unix timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub authorized: bool,
    pub user_id: u64,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl Claims {
    /// Create claims for a user expiring `lifetime` from now.
    pub fn for_user(user_id: u64, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            authorized: true,
            user_id,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }
}
