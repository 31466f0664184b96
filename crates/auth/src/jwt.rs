use crate::error::{AuthError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use saas_models::{AuthenticatedPrincipal, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,               // User ID
    pub email: String,             // User email
    pub role: String,              // Platform role, e.g. TENANT_OWNER
    pub tenant_id: Option<String>, // Absent for platform-level users
    pub exp: i64,                  // Expiration time
    pub iat: i64,                  // Issued at
    pub jti: String,               // JWT ID (unique identifier)
    pub token_type: TokenType,     // access or refresh
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl Claims {
    /// Decode the identity carried by these claims.
    ///
    /// An empty `tenant_id` claim is treated as absent.
    pub fn to_principal(&self) -> Result<AuthenticatedPrincipal> {
        let user_id = Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::InvalidToken("Subject is not a valid user id".to_string()))?;

        let role: Role = self
            .role
            .parse()
            .map_err(|_| AuthError::InvalidToken(format!("Unknown role '{}'", self.role)))?;

        let tenant_id = match self.tenant_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| {
                AuthError::InvalidToken("Tenant claim is not a valid id".to_string())
            })?),
        };

        Ok(AuthenticatedPrincipal {
            user_id,
            email: self.email.clone(),
            role,
            tenant_id,
        })
    }
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_token_exp_hours: i64,
    refresh_token_exp_days: i64,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            access_token_exp_hours: 1,  // 1 hour default
            refresh_token_exp_days: 30, // 30 days default
        }
    }

    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::ConfigurationError("JWT_SECRET must be set".to_string()))?;

        let mut service = Self::new(&secret);

        service.access_token_exp_hours = std::env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        service.refresh_token_exp_days = std::env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(service)
    }

    /// Generate an access token for a principal
    pub fn generate_access_token(&self, principal: &AuthenticatedPrincipal) -> Result<String> {
        let exp = Utc::now() + Duration::hours(self.access_token_exp_hours);
        self.sign(principal, exp.timestamp(), TokenType::Access)
    }

    /// Generate a refresh token for a principal
    pub fn generate_refresh_token(&self, principal: &AuthenticatedPrincipal) -> Result<String> {
        let exp = Utc::now() + Duration::days(self.refresh_token_exp_days);
        self.sign(principal, exp.timestamp(), TokenType::Refresh)
    }

    fn sign(
        &self,
        principal: &AuthenticatedPrincipal,
        exp: i64,
        token_type: TokenType,
    ) -> Result<String> {
        let claims = Claims {
            sub: principal.user_id.to_string(),
            email: principal.email.clone(),
            role: principal.role.as_str().to_string(),
            tenant_id: principal.tenant_id.map(|id| id.to_string()),
            exp,
            iat: Utc::now().timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(self.algorithm);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Validate access token specifically
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let claims = self.validate_token(token)?;

        if claims.token_type != TokenType::Access {
            return Err(AuthError::InvalidToken(
                "Token is not an access token".to_string(),
            ));
        }

        Ok(claims)
    }

    /// Validate an access token and decode the principal it carries
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedPrincipal> {
        let principal = self.validate_access_token(token)?.to_principal()?;
        tracing::debug!(
            user_id = %principal.user_id,
            role = %principal.role,
            "Access token verified"
        );
        Ok(principal)
    }
}
