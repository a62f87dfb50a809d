//! Thin typed client over the administrative API's REST resources.

use reqwest::header::USER_AGENT;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use super::token::TokenSource;
use super::types::{
    ErrorEnvelope, ListServicesResponse, ListVersionsResponse, Operation, Service, Version,
};
use crate::config::AdminApiConfig;
use crate::context::CallContext;
use crate::error::{ApiError, ModulesError};

/// Prefix of the User-Agent sent with every request.
pub const USER_AGENT_PREFIX: &str = "appengine-modules-api-rust-client";

/// Operation names sent in the User-Agent so the API can attribute traffic to
/// each facade operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AdminOperation {
    /// List services.
    GetModules,
    /// Read a version's instance count.
    GetNumInstances,
    /// Update a version's instance count.
    SetNumInstances,
    /// List versions.
    GetVersions,
    /// Read a service's default version.
    GetDefaultVersion,
    /// Start a version.
    StartVersion,
    /// Stop a version.
    StopVersion,
}

impl AdminOperation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::GetModules,
        Self::GetNumInstances,
        Self::SetNumInstances,
        Self::GetVersions,
        Self::GetDefaultVersion,
        Self::StartVersion,
        Self::StopVersion,
    ];

    /// Method name embedded in the User-Agent.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::GetModules => "get_modules",
            Self::GetNumInstances => "get_num_instances",
            Self::SetNumInstances => "set_num_instances",
            Self::GetVersions => "get_versions",
            Self::GetDefaultVersion => "get_default_version",
            Self::StartVersion => "start_version",
            Self::StopVersion => "stop_version",
        }
    }

    /// Full User-Agent value for this operation.
    #[must_use]
    pub fn user_agent(self) -> String {
        format!("{USER_AGENT_PREFIX}/{}", self.method_name())
    }
}

/// Authenticated client for the `v1/apps` resource tree.
#[derive(Clone, Debug)]
pub struct AdminClient {
    http: Client,
    endpoint: Url,
    tokens: TokenSource,
}

/// Per-call handle carrying the credential and attribution of one facade
/// operation.
#[derive(Debug)]
pub struct AdminSession<'a> {
    client: &'a AdminClient,
    ctx: &'a CallContext,
    operation: AdminOperation,
    token: String,
}

impl AdminClient {
    /// Builds a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModulesError::ClientInit`] when the configuration is invalid
    /// or the HTTP client cannot be constructed.
    pub fn new(config: &AdminApiConfig) -> Result<Self, ModulesError> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;
        let tokens = TokenSource::from_config(config)?;
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| ModulesError::ClientInit(err.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            tokens,
        })
    }

    /// Acquires credentials for one operation.
    ///
    /// # Errors
    ///
    /// Returns [`ModulesError::ClientInit`] when no token can be obtained.
    pub async fn session<'a>(
        &'a self,
        ctx: &'a CallContext,
        operation: AdminOperation,
    ) -> Result<AdminSession<'a>, ModulesError> {
        let token = self.tokens.token(&self.http, ctx.deadline()).await?;
        Ok(AdminSession {
            client: self,
            ctx,
            operation,
            token,
        })
    }

    fn resource_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidEndpoint {
                endpoint: self.endpoint.to_string(),
            })?
            .pop_if_empty()
            .push("v1")
            .push("apps")
            .extend(segments);
        Ok(url)
    }
}

impl AdminSession<'_> {
    /// `GET v1/apps/{project}/services`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn list_services(&self, project: &str) -> Result<ListServicesResponse, ApiError> {
        let url = self.client.resource_url(&[project, "services"])?;
        self.read(url, "service list").await
    }

    /// `GET v1/apps/{project}/services/{service}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn get_service(&self, project: &str, service: &str) -> Result<Service, ApiError> {
        let url = self.client.resource_url(&[project, "services", service])?;
        self.read(url, "service").await
    }

    /// `GET v1/apps/{project}/services/{service}/versions`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn list_versions(
        &self,
        project: &str,
        service: &str,
    ) -> Result<ListVersionsResponse, ApiError> {
        let url = self
            .client
            .resource_url(&[project, "services", service, "versions"])?;
        self.read(url, "version list").await
    }

    /// `GET v1/apps/{project}/services/{service}/versions/{version}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn get_version(
        &self,
        project: &str,
        service: &str,
        version: &str,
    ) -> Result<Version, ApiError> {
        let url = self
            .client
            .resource_url(&[project, "services", service, "versions", version])?;
        self.read(url, "version").await
    }

    /// `PATCH v1/apps/{project}/services/{service}/versions/{version}` with
    /// the update restricted to `update_mask`.
    ///
    /// The returned operation may still be running.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn patch_version(
        &self,
        project: &str,
        service: &str,
        version: &str,
        update: &Version,
        update_mask: &str,
    ) -> Result<Operation, ApiError> {
        let mut url = self
            .client
            .resource_url(&[project, "services", service, "versions", version])?;
        url.query_pairs_mut().append_pair("updateMask", update_mask);
        let response = self
            .request(Method::PATCH, url)
            .json(update)
            .send()
            .await?;
        decode(response, "operation").await
    }

    async fn read<T: DeserializeOwned>(&self, url: Url, resource: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, url).send().await?;
        decode(response, resource).await
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(
            %method,
            %url,
            operation = self.operation.method_name(),
            "admin API request"
        );
        let mut builder = self
            .client
            .http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(USER_AGENT, self.operation.user_agent());
        if let Some(limit) = self.ctx.deadline() {
            builder = builder.timeout(limit);
        }
        builder
    }
}

async fn decode<T: DeserializeOwned>(response: Response, resource: &str) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    serde_json::from_slice(&body).map_err(|err| ApiError::Decode {
        resource: resource.to_owned(),
        message: err.to_string(),
    })
}

fn status_error(status: reqwest::StatusCode, body: &[u8]) -> ApiError {
    let fallback_status = status.canonical_reason().unwrap_or("unknown").to_owned();
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiError::Status {
            code: status.as_u16(),
            status: if envelope.error.status.is_empty() {
                fallback_status
            } else {
                envelope.error.status
            },
            message: envelope.error.message,
        },
        Err(_) => ApiError::Status {
            code: status.as_u16(),
            status: fallback_status,
            message: String::from_utf8_lossy(body).trim().to_owned(),
        },
    }
}
