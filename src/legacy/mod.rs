//! Legacy path: the internal `modules` RPC service.
//!
//! Requests carry module and version only when the caller supplied them; the
//! service resolves omitted fields to the calling instance's own module and
//! version. Errors are returned exactly as the transport reports them.

use prost::Message;

use crate::control::{ControlFuture, ModuleControl, RequestScope, ServingStatus};
use crate::error::{LegacyError, ModulesError};

pub mod proto;
mod transport;

pub use transport::{
    DEFAULT_API_HOST, DEFAULT_API_PORT, HttpRpcTransport, RpcCall, RpcTransport, TransportFuture,
};

use proto::{
    GetDefaultVersionRequest, GetDefaultVersionResponse, GetModulesRequest, GetModulesResponse,
    GetNumInstancesRequest, GetNumInstancesResponse, GetVersionsRequest, GetVersionsResponse,
    SetNumInstancesRequest, SetNumInstancesResponse, StartModuleRequest, StartModuleResponse,
    StopModuleRequest, StopModuleResponse,
};

/// Service name of the legacy `modules` API.
pub const MODULES_SERVICE: &str = "modules";

/// [`ModuleControl`] backed by the legacy `modules` RPC service.
///
/// A transport that could not be built is held back and reported by every
/// legacy call, so the administrative path stays usable when the service
/// bridge address is invalid.
#[derive(Clone, Debug)]
pub struct LegacyBackend<T: RpcTransport> {
    transport: Result<T, LegacyError>,
}

impl<T: RpcTransport> LegacyBackend<T> {
    /// Creates a backend that sends calls through `transport`.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport: Ok(transport),
        }
    }

    /// Creates a backend from the outcome of building its transport.
    #[must_use]
    pub const fn from_built(transport: Result<T, LegacyError>) -> Self {
        Self { transport }
    }

    async fn invoke<Req, Res>(
        &self,
        scope: &RequestScope,
        method: &str,
        request: &Req,
    ) -> Result<Res, ModulesError>
    where
        Req: Message,
        Res: Message + Default,
    {
        tracing::debug!(method, "calling legacy modules service");
        let transport = self
            .transport
            .as_ref()
            .map_err(|err| ModulesError::Legacy(err.clone()))?;
        let encoded = transport
            .call(RpcCall {
                ctx: &scope.ctx,
                env: &scope.env,
                service: MODULES_SERVICE,
                method,
                request: request.encode_to_vec(),
            })
            .await?;
        Res::decode(encoded.as_slice()).map_err(|err| {
            ModulesError::Legacy(LegacyError::Decode {
                method: method.to_owned(),
                message: err.to_string(),
            })
        })
    }
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

impl<T: RpcTransport> ModuleControl for LegacyBackend<T> {
    fn list<'a>(&'a self, scope: &'a RequestScope) -> ControlFuture<'a, Vec<String>> {
        Box::pin(async move {
            let response: GetModulesResponse = self
                .invoke(scope, "GetModules", &GetModulesRequest {})
                .await?;
            Ok(response.module)
        })
    }

    fn num_instances<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
        version: &'a str,
    ) -> ControlFuture<'a, i64> {
        Box::pin(async move {
            let request = GetNumInstancesRequest {
                module: optional(module),
                version: optional(version),
            };
            let response: GetNumInstancesResponse =
                self.invoke(scope, "GetNumInstances", &request).await?;
            Ok(response.instances)
        })
    }

    fn set_num_instances<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
        version: &'a str,
        instances: i64,
    ) -> ControlFuture<'a, ()> {
        Box::pin(async move {
            let request = SetNumInstancesRequest {
                module: optional(module),
                version: optional(version),
                instances,
            };
            let _: SetNumInstancesResponse =
                self.invoke(scope, "SetNumInstances", &request).await?;
            Ok(())
        })
    }

    fn versions<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
    ) -> ControlFuture<'a, Vec<String>> {
        Box::pin(async move {
            let request = GetVersionsRequest {
                module: optional(module),
            };
            let response: GetVersionsResponse =
                self.invoke(scope, "GetVersions", &request).await?;
            Ok(response.version)
        })
    }

    fn default_version<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
    ) -> ControlFuture<'a, String> {
        Box::pin(async move {
            let request = GetDefaultVersionRequest {
                module: optional(module),
            };
            let response: GetDefaultVersionResponse =
                self.invoke(scope, "GetDefaultVersion", &request).await?;
            Ok(response.version)
        })
    }

    fn set_serving_status<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
        version: &'a str,
        status: ServingStatus,
    ) -> ControlFuture<'a, ()> {
        Box::pin(async move {
            match status {
                ServingStatus::Serving => {
                    let request = StartModuleRequest {
                        module: optional(module),
                        version: optional(version),
                    };
                    let _: StartModuleResponse =
                        self.invoke(scope, "StartModule", &request).await?;
                }
                ServingStatus::Stopped => {
                    let request = StopModuleRequest {
                        module: optional(module),
                        version: optional(version),
                    };
                    let _: StopModuleResponse = self.invoke(scope, "StopModule", &request).await?;
                }
            }
            Ok(())
        })
    }
}
