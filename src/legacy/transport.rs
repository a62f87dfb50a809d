//! Transport carrying encoded `modules` calls to the platform.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use prost::Message;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Url};

use super::proto::{RemoteRequest, RemoteResponse};
use crate::context::CallContext;
use crate::env::AmbientEnv;
use crate::error::LegacyError;

/// Host of the service bridge when `API_HOST` is unset.
pub const DEFAULT_API_HOST: &str = "appengine.googleapis.internal";
/// Port of the service bridge when `API_PORT` is unset.
pub const DEFAULT_API_PORT: &str = "10001";

const RPC_PATH: &str = "rpc_http";
const ENDPOINT_HEADER: &str = "x-google-rpc-service-endpoint";
const ENDPOINT_VALUE: &str = "app-engine-apis";
const METHOD_HEADER: &str = "x-google-rpc-service-method";
const METHOD_VALUE: &str = "/VMRemoteAPI.CallRemoteAPI";
const DEADLINE_HEADER: &str = "x-google-rpc-service-deadline";

/// Future returned by [`RpcTransport::call`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<u8>, LegacyError>> + Send + 'a>>;

/// A single encoded RPC against a platform service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RpcCall<'a> {
    /// Execution context of the caller.
    pub ctx: &'a CallContext,
    /// Environment snapshot of the call.
    pub env: &'a AmbientEnv,
    /// Service name, for example `modules`.
    pub service: &'a str,
    /// Method name, for example `GetModules`.
    pub method: &'a str,
    /// Encoded request message.
    pub request: Vec<u8>,
}

/// Opaque synchronous call-and-marshal mechanism used by the legacy path.
pub trait RpcTransport: Send + Sync {
    /// Performs `call` and returns the encoded response message.
    fn call<'a>(&'a self, call: RpcCall<'a>) -> TransportFuture<'a>;
}

/// [`RpcTransport`] that posts remote API envelopes to the service bridge.
#[derive(Clone, Debug)]
pub struct HttpRpcTransport {
    client: Client,
    url: Url,
}

impl HttpRpcTransport {
    /// Builds a transport targeting `http://{host}:{port}/rpc_http`.
    ///
    /// # Errors
    ///
    /// Returns [`LegacyError::Transport`] when the address does not form a
    /// valid URL or the HTTP client cannot be built.
    pub fn new(host: &str, port: &str) -> Result<Self, LegacyError> {
        let url = Url::parse(&format!("http://{host}:{port}/{RPC_PATH}"))
            .map_err(|err| LegacyError::Transport(format!("invalid bridge address: {err}")))?;
        let client = Client::builder().build()?;
        Ok(Self { client, url })
    }

    /// Builds a transport from the `API_HOST` and `API_PORT` variables.
    ///
    /// # Errors
    ///
    /// See [`HttpRpcTransport::new`].
    pub fn from_env(env: &AmbientEnv) -> Result<Self, LegacyError> {
        let host = env
            .api_host
            .as_deref()
            .filter(|host| !host.is_empty())
            .unwrap_or(DEFAULT_API_HOST);
        let port = env
            .api_port
            .as_deref()
            .filter(|port| !port.is_empty())
            .unwrap_or(DEFAULT_API_PORT);
        Self::new(host, port)
    }

    /// URL the transport posts to.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    fn headers(deadline: Option<Duration>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ENDPOINT_HEADER, HeaderValue::from_static(ENDPOINT_VALUE));
        headers.insert(METHOD_HEADER, HeaderValue::from_static(METHOD_VALUE));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        if let Some(limit) = deadline {
            let seconds = limit.as_secs_f64().to_string();
            if let Ok(value) = HeaderValue::from_str(&seconds) {
                headers.insert(DEADLINE_HEADER, value);
            }
        }
        headers
    }

    async fn round_trip(&self, call: RpcCall<'_>) -> Result<Vec<u8>, LegacyError> {
        let ticket = call
            .ctx
            .api_ticket()
            .map_or_else(|| call.env.default_ticket(), str::to_owned);
        let envelope = RemoteRequest {
            service_name: call.service.to_owned(),
            method: call.method.to_owned(),
            request: call.request,
            request_id: Some(ticket),
        };

        let mut request = self
            .client
            .post(self.url.clone())
            .headers(Self::headers(call.ctx.deadline()))
            .body(envelope.encode_to_vec());
        if let Some(limit) = call.ctx.deadline() {
            request = request.timeout(limit);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(LegacyError::Bridge {
                message: format!(
                    "HTTP {} ({})",
                    status.as_u16(),
                    String::from_utf8_lossy(&body).trim()
                ),
            });
        }

        let reply = RemoteResponse::decode(body.as_ref()).map_err(|err| LegacyError::Decode {
            method: call.method.to_owned(),
            message: err.to_string(),
        })?;
        unwrap_reply(reply)
    }
}

fn unwrap_reply(reply: RemoteResponse) -> Result<Vec<u8>, LegacyError> {
    if let Some(rpc) = reply.rpc_error {
        return Err(LegacyError::Rpc {
            code: rpc.code,
            detail: rpc.detail.unwrap_or_default(),
        });
    }
    if let Some(app) = reply.application_error {
        return Err(LegacyError::Application {
            code: app.code,
            detail: app.detail,
        });
    }
    if reply.exception.is_some() || reply.java_exception.is_some() {
        return Err(LegacyError::Bridge {
            message: String::from("an exception"),
        });
    }
    Ok(reply.response.unwrap_or_default())
}

impl RpcTransport for HttpRpcTransport {
    fn call<'a>(&'a self, call: RpcCall<'a>) -> TransportFuture<'a> {
        Box::pin(self.round_trip(call))
    }
}
