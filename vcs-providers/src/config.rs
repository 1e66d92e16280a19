use crate::errors::ConfigError;
use crate::types::ProviderKind;

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_api: String,
    pub token: String,
    pub webhook_secret: Option<String>,
}

impl ProviderConfig {
    /// Reads `{PREFIX}_BASE_API`, `{PREFIX}_TOKEN`, `{PREFIX}_WEBHOOK_SECRET`
    /// where `PREFIX` is `GITLAB`, `GITHUB`, or `BITBUCKET`.
    pub fn from_env(kind: ProviderKind) -> Result<Self, ConfigError> {
        let prefix = match kind {
            ProviderKind::GitLab => "GITLAB",
            ProviderKind::GitHub => "GITHUB",
            ProviderKind::Bitbucket => "BITBUCKET",
        };
        let default_api = match kind {
            ProviderKind::GitLab => "https://gitlab.com/api/v4",
            ProviderKind::GitHub => "https://api.github.com",
            ProviderKind::Bitbucket => "https://api.bitbucket.org/2.0",
        };

        let token = std::env::var(format!("{prefix}_TOKEN")).map_err(|_| ConfigError::MissingToken)?;
        let base_api = std::env::var(format!("{prefix}_BASE_API")).unwrap_or_else(|_| default_api.to_string());
        let webhook_secret = std::env::var(format!("{prefix}_WEBHOOK_SECRET")).ok();

        Ok(Self { kind, base_api, token, webhook_secret })
    }
}
