// Registry credentials from the ECR authorization token

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ecr::operation::get_authorization_token::GetAuthorizationTokenOutput;
use aws_sdk_ecr::Client as EcrClient;
use base64::Engine;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Username/password pair accepted by `docker login`
#[derive(Clone)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RegistryCredentials {
    /// Decode a base64 `user:password` authorization token
    pub(crate) fn from_authorization_token(token: &str) -> Result<Self> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(token.trim())
            .map_err(|e| Error::Authentication(format!("Failed to decode ECR token: {}", e)))?;

        let decoded = String::from_utf8(decoded)
            .map_err(|_| Error::Authentication("ECR token is not valid UTF-8".to_string()))?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or_else(|| Error::Authentication("Invalid ECR token format".to_string()))?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Source of short-lived registry credentials
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Get credentials for logging the container engine into the registry
    async fn get_credentials(&self) -> Result<RegistryCredentials>;
}

/// Credentials from ECR `GetAuthorizationToken`, using the default AWS
/// credential chain (environment, profile, IAM role, ...)
pub struct EcrCredentialsProvider {
    client: EcrClient,
}

impl EcrCredentialsProvider {
    pub async fn from_env() -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        debug!(region = ?aws_config.region(), "Loaded AWS configuration");

        Self {
            client: EcrClient::new(&aws_config),
        }
    }
}

#[async_trait]
impl CredentialsProvider for EcrCredentialsProvider {
    async fn get_credentials(&self) -> Result<RegistryCredentials> {
        info!("Getting ECR authorization token");

        let response = self
            .client
            .get_authorization_token()
            .send()
            .await
            .map_err(|e| {
                Error::Authentication(format!(
                    "Failed to get ECR authorization token: {}",
                    aws_sdk_ecr::error::DisplayErrorContext(&e)
                ))
            })?;

        RegistryCredentials::from_authorization_token(token_from_response(&response)?)
    }
}

/// Token of the first authorization data entry
fn token_from_response(response: &GetAuthorizationTokenOutput) -> Result<&str> {
    response
        .authorization_data()
        .first()
        .and_then(|data| data.authorization_token())
        .ok_or_else(|| {
            Error::Authentication("Failed to retrieve ECR authorization token".to_string())
        })
}
