use crate::database::connection::DbPool;
use crate::models::{auth::Claims, user::User, user::UserError};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Auth configuration error: {0}")]
    Config(String),
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("User lookup failed: {0}")]
    User(#[from] UserError),
}

pub struct AuthService {
    secret: String,
}

impl AuthService {
    pub fn new() -> Result<Self, AuthError> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| AuthError::Config("JWT_SECRET not set".to_string()))?;
        Ok(Self::with_secret(secret))
    }

    pub fn with_secret(secret: String) -> Self {
        Self { secret }
    }

    pub fn generate_token(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims::new(user.id, user.email.clone(), user.user_role.clone());
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    pub async fn authenticate_user(
        &self,
        pool: &DbPool,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let user = User::authenticate(pool, email, password).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use chrono::Utc;
    use uuid::Uuid;

    fn test_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            fullname: "Test Donor".to_string(),
            email: "donor@example.com".to_string(),
            password_hash: String::new(),
            phone: None,
            user_role: UserRole::Donor,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_round_trips() {
        let service = AuthService::with_secret("test-secret".to_string());
        let user = test_user();

        let token = service.generate_token(&user).unwrap();
        let claims = service.decode_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, UserRole::Donor);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_fails_with_wrong_secret() {
        let service = AuthService::with_secret("test-secret".to_string());
        let other = AuthService::with_secret("other-secret".to_string());
        let token = service.generate_token(&test_user()).unwrap();

        assert!(other.decode_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = AuthService::with_secret("test-secret".to_string());
        assert!(service.decode_token("not-a-token").is_err());
    }
}
