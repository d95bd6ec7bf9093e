use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JsonWebTokenError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Serialize;
use serde_json::Value;

use super::claims::Claims;
use super::errors::JwtError;

/// Lifetime of every issued access token.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Issues and verifies signed access tokens.
///
/// Tokens are signed with HS256 using a symmetric secret. Verification
/// accepts the HMAC family only; tokens whose header names an asymmetric
/// algorithm are rejected before any key material is used.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    lifetime: Duration,
}

impl TokenService {
    /// Create a new token service with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            lifetime: Duration::hours(TOKEN_LIFETIME_HOURS),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Arguments
    /// * `user_id` - Identifier stored in the `user_id` claim
    ///
    /// # Returns
    /// Encoded JWT string
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn issue(&self, user_id: u64) -> Result<String, JwtError> {
        self.encode(&Claims::for_user(user_id, self.lifetime))
    }

    /// Verify a token's algorithm, signature and expiry.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match or algorithm is not HMAC
    /// * `Expired` - `exp` is in the past
    /// * `Malformed` - Token is not a decodable JWT
    /// * `MissingClaim` - `exp` claim is absent
    pub fn verify(&self, token: &str) -> Result<(), JwtError> {
        self.decode_payload(token).map(|_| ())
    }

    /// Verify a token and read its `user_id` claim.
    ///
    /// # Errors
    /// Same as [`TokenService::verify`], plus `MissingClaim` when `user_id`
    /// is absent or is not an unsigned integer.
    pub fn extract_user_id(&self, token: &str) -> Result<u64, JwtError> {
        let payload = self.decode_payload(token)?;

        payload
            .get("user_id")
            .and_then(Value::as_u64)
            .ok_or_else(|| JwtError::MissingClaim("user_id".to_string()))
    }

    fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningFailed(e.to_string()))
    }

    fn decode_payload(&self, token: &str) -> Result<Value, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;

        decode::<Value>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(map_decode_error)
    }
}

fn map_decode_error(error: JsonWebTokenError) -> JwtError {
    match error.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::InvalidSignature,
        ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
        _ => JwtError::Malformed(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde::Deserialize;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[test]
    fn test_issue_and_extract_user_id() {
        let tokens = TokenService::new(SECRET);

        let token = tokens.issue(42).expect("Failed to issue token");
        assert!(!token.is_empty());

        assert_eq!(tokens.verify(&token), Ok(()));
        assert_eq!(tokens.extract_user_id(&token), Ok(42));
    }

    #[test]
    fn test_issued_token_expires_after_a_day() {
        let tokens = TokenService::new(SECRET);
        let token = tokens.issue(1).expect("Failed to issue token");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<Claims>(&token, &DecodingKey::from_secret(SECRET), &validation)
            .expect("Failed to decode token")
            .claims;

        assert!(claims.authorized);
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_HOURS * 60 * 60);
    }

    #[test]
    fn test_expired_token() {
        let tokens = TokenService::new(SECRET);
        let claims = Claims::for_user(7, Duration::hours(24))
            .with_expiration(Utc::now().timestamp() - 10);

        let token = tokens.encode(&claims).expect("Failed to encode token");

        assert_eq!(tokens.verify(&token), Err(JwtError::Expired));
        assert_eq!(tokens.extract_user_id(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = TokenService::new(b"secret1_at_least_32_bytes_long_key!");
        let verifier = TokenService::new(b"secret2_at_least_32_bytes_long_key!");

        let token = issuer.issue(1).expect("Failed to issue token");

        assert_eq!(verifier.verify(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_other_hmac_algorithm_is_accepted() {
        let tokens = TokenService::new(SECRET);
        let claims = Claims::for_user(9, Duration::hours(1));

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        assert_eq!(tokens.extract_user_id(&token), Ok(9));
    }

    #[test]
    fn test_asymmetric_algorithm_header_is_rejected() {
        let tokens = TokenService::new(SECRET);
        let token = tokens.issue(1).expect("Failed to issue token");

        // {"alg":"RS256","typ":"JWT"}
        let rs256_header = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9";
        let (_, rest) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", rs256_header, rest);

        assert_eq!(tokens.verify(&forged), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_none_algorithm_is_rejected() {
        let tokens = TokenService::new(SECRET);
        let token = tokens.issue(1).expect("Failed to issue token");

        // {"alg":"none","typ":"JWT"}
        let none_header = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";
        let (_, rest) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", none_header, rest);

        assert!(tokens.verify(&forged).is_err());
    }

    #[test]
    fn test_malformed_tokens() {
        let tokens = TokenService::new(SECRET);

        assert!(matches!(tokens.verify(""), Err(JwtError::Malformed(_))));
        assert!(matches!(
            tokens.verify("invalid.token.here"),
            Err(JwtError::Malformed(_))
        ));
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct ForeignClaims {
        authorized: bool,
        user_id: String,
        exp: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct AnonymousClaims {
        authorized: bool,
        exp: i64,
    }

    #[test]
    fn test_missing_user_id_claim() {
        let tokens = TokenService::new(SECRET);
        let exp = Utc::now().timestamp() + 3600;

        let token = tokens
            .encode(&AnonymousClaims {
                authorized: true,
                exp,
            })
            .expect("Failed to encode token");

        assert_eq!(tokens.verify(&token), Ok(()));
        assert_eq!(
            tokens.extract_user_id(&token),
            Err(JwtError::MissingClaim("user_id".to_string()))
        );
    }

    #[test]
    fn test_user_id_claim_of_wrong_type() {
        let tokens = TokenService::new(SECRET);
        let exp = Utc::now().timestamp() + 3600;

        let token = tokens
            .encode(&ForeignClaims {
                authorized: true,
                user_id: "abc".to_string(),
                exp,
            })
            .expect("Failed to encode token");

        assert_eq!(
            tokens.extract_user_id(&token),
            Err(JwtError::MissingClaim("user_id".to_string()))
        );
    }

    #[test]
    fn test_missing_exp_claim() {
        #[derive(Serialize)]
        struct NoExpiry {
            user_id: u64,
        }

        let tokens = TokenService::new(SECRET);
        let token = tokens
            .encode(&NoExpiry { user_id: 1 })
            .expect("Failed to encode token");

        assert_eq!(
            tokens.verify(&token),
            Err(JwtError::MissingClaim("exp".to_string()))
        );
    }
}
