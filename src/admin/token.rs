//! Bearer credentials for the administrative API.

use std::time::Duration;

use reqwest::{Client, Url};

use super::types::MetadataToken;
use crate::config::AdminApiConfig;
use crate::error::ModulesError;

const TOKEN_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/token";

/// Where access tokens come from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenSource {
    /// A fixed token supplied through configuration.
    Static(String),
    /// The default service account of the instance, via the metadata server.
    Metadata {
        /// Token endpoint of the metadata server.
        url: Url,
    },
}

impl TokenSource {
    /// Chooses the token source described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ModulesError::ClientInit`] when the metadata host does not
    /// form a valid URL.
    pub fn from_config(config: &AdminApiConfig) -> Result<Self, ModulesError> {
        if let Some(token) = config
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
        {
            return Ok(Self::Static(token.to_owned()));
        }
        let host = config.metadata_host.trim();
        let url = Url::parse(&format!("http://{host}/{TOKEN_PATH}")).map_err(|err| {
            ModulesError::ClientInit(format!("invalid metadata host '{host}': {err}"))
        })?;
        Ok(Self::Metadata { url })
    }

    /// Produces a bearer token for one call.
    ///
    /// Tokens are not cached; the metadata server is asked on every call,
    /// within `deadline` when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`ModulesError::ClientInit`] when the metadata server cannot be
    /// reached or answers without a token.
    pub async fn token(
        &self,
        http: &Client,
        deadline: Option<Duration>,
    ) -> Result<String, ModulesError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Metadata { url } => fetch_metadata_token(http, url, deadline).await,
        }
    }
}

async fn fetch_metadata_token(
    http: &Client,
    url: &Url,
    deadline: Option<Duration>,
) -> Result<String, ModulesError> {
    let failed = |message: String| {
        ModulesError::ClientInit(format!("metadata token request failed: {message}"))
    };
    let mut request = http.get(url.clone()).header("Metadata-Flavor", "Google");
    if let Some(limit) = deadline {
        request = request.timeout(limit);
    }
    let response = request
        .send()
        .await
        .map_err(|err| failed(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("HTTP {}", status.as_u16())));
    }
    let token: MetadataToken = response
        .json()
        .await
        .map_err(|err| failed(err.to_string()))?;
    if token.access_token.is_empty() {
        return Err(failed(String::from("empty access token")));
    }
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_wins_over_metadata() {
        let config = AdminApiConfig {
            access_token: Some(String::from(" secret ")),
            ..AdminApiConfig::default()
        };
        assert_eq!(
            TokenSource::from_config(&config),
            Ok(TokenSource::Static(String::from("secret")))
        );
    }

    #[test]
    fn blank_token_falls_back_to_metadata() {
        let config = AdminApiConfig {
            access_token: Some(String::from("  ")),
            metadata_host: String::from("127.0.0.1:8181"),
            ..AdminApiConfig::default()
        };
        let source = TokenSource::from_config(&config).expect("source");
        let TokenSource::Metadata { url } = source else {
            panic!("expected metadata source, got {source:?}");
        };
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8181/computeMetadata/v1/instance/service-accounts/default/token"
        );
    }
}
