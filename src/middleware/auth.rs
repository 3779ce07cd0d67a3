use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::config::IdentityConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::logger::RequestId;
use crate::services::context::RequestContext;

/// Session token claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // provider user id
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Authenticated caller, inserted into request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
        }
    }
}

/// Verifies bearer tokens with either a shared HS256 secret or an RS256 public key.
#[derive(Clone)]
pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl IdentityVerifier {
    pub fn from_config(config: &IdentityConfig) -> AppResult<Self> {
        let (key, algorithm) = match (&config.jwt_public_key, &config.jwt_secret) {
            (Some(pem), _) => {
                // 环境变量里的 PEM 常以字面量 \n 换行
                let pem = pem.replace("\\n", "\n");
                (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256)
            }
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => {
                return Err(AppError::Config(
                    "IDENTITY_JWT_SECRET or IDENTITY_JWT_PUBLIC_KEY must be set".to_string(),
                ));
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        Ok(Self { key, validation })
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

/// `Authorization: Bearer <token>` value, if present.
pub fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next<axum::body::Body>,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::auth("Missing bearer token"))?;

    // 验证token
    let claims = state.identity.verify(token)?;

    // 将用户信息添加到请求扩展中
    request.extensions_mut().insert(CurrentUser::from(claims));

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::auth("Not authenticated"))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        let request_id = parts.extensions.get::<RequestId>().map(|id| id.0.clone());
        Ok(RequestContext {
            user_id: user.id,
            request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn config(secret: &str, issuer: Option<&str>) -> IdentityConfig {
        IdentityConfig {
            jwt_secret: Some(secret.to_string()),
            jwt_public_key: None,
            issuer: issuer.map(str::to_string),
            webhook_secret: None,
        }
    }

    fn token(secret: &str, claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn exp() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    #[test]
    fn accepts_token_signed_with_shared_secret() {
        let verifier = IdentityVerifier::from_config(&config("s3cret", None)).unwrap();
        let jwt = token(
            "s3cret",
            serde_json::json!({"sub": "user_2abc", "exp": exp(), "email": "ada@example.com"}),
        );
        let claims = verifier.verify(&jwt).unwrap();
        assert_eq!(claims.sub, "user_2abc");
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn rejects_wrong_secret_and_wrong_issuer() {
        let verifier =
            IdentityVerifier::from_config(&config("s3cret", Some("https://id.example.com"))).unwrap();
        let forged = token("other", serde_json::json!({"sub": "u", "exp": exp()}));
        assert!(verifier.verify(&forged).is_err());

        let foreign = token(
            "s3cret",
            serde_json::json!({"sub": "u", "exp": exp(), "iss": "https://evil.example.com"}),
        );
        assert!(verifier.verify(&foreign).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let verifier = IdentityVerifier::from_config(&config("s3cret", None)).unwrap();
        let stale = token("s3cret", serde_json::json!({"sub": "u", "exp": 1_000_000u64}));
        assert!(verifier.verify(&stale).is_err());
    }

    #[test]
    fn requires_some_key() {
        let cfg = IdentityConfig {
            jwt_secret: None,
            jwt_public_key: None,
            issuer: None,
            webhook_secret: None,
        };
        assert!(IdentityVerifier::from_config(&cfg).is_err());
    }

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(AUTHORIZATION, "Token abc".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
    }
}
