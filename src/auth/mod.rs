use async_trait::async_trait;
use axum::http::HeaderMap;
use std::collections::HashMap;

use crate::error::AuthError;

/// Maps a bearer token to the user it belongs to.
///
/// Runs only on the bootstrap path; requests that carry a known session
/// id never reach the resolver again.
#[async_trait]
pub trait AuthenticationResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<String, AuthError>;
}

/// Resolver that accepts any token and maps it to one fixed user.
/// Development stand-in for a real identity provider.
pub struct StaticAuthResolver {
    user_id: String,
}

impl StaticAuthResolver {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl AuthenticationResolver for StaticAuthResolver {
    async fn resolve(&self, _token: &str) -> Result<String, AuthError> {
        Ok(self.user_id.clone())
    }
}

/// Resolver backed by a fixed token-to-user table.
pub struct TokenTableResolver {
    tokens: HashMap<String, String>,
}

impl TokenTableResolver {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl AuthenticationResolver for TokenTableResolver {
    async fn resolve(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(AuthError::MissingAuthorizationHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AuthError::InvalidAuthorizationFormat);
    }

    Ok(auth_header["Bearer ".len()..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));

        let token = extract_bearer_token(&headers).unwrap();
        assert_eq!(token, "abc123");
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingAuthorizationHeader)
        ));
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc123"));

        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::InvalidAuthorizationFormat)
        ));
    }

    #[tokio::test]
    async fn test_token_table_resolver() {
        let mut tokens = HashMap::new();
        tokens.insert("secret".to_string(), "user-1".to_string());
        let resolver = TokenTableResolver::new(tokens);

        assert_eq!(resolver.resolve("secret").await.unwrap(), "user-1");
        assert!(matches!(
            resolver.resolve("wrong").await,
            Err(AuthError::InvalidToken)
        ));
    }
}
