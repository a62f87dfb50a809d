//! Protocol buffer messages of the `modules` service and the remote API
//! envelope used by the service bridge.

/// Request for `GetModules`.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct GetModulesRequest {}

/// Response of `GetModules`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetModulesResponse {
    /// Module names.
    #[prost(string, repeated, tag = "1")]
    pub module: Vec<String>,
}

/// Request for `GetVersions`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetVersionsRequest {
    /// Module to inspect; the current module when unset.
    #[prost(string, optional, tag = "1")]
    pub module: Option<String>,
}

/// Response of `GetVersions`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetVersionsResponse {
    /// Version identifiers.
    #[prost(string, repeated, tag = "1")]
    pub version: Vec<String>,
}

/// Request for `GetDefaultVersion`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetDefaultVersionRequest {
    /// Module to inspect; the current module when unset.
    #[prost(string, optional, tag = "1")]
    pub module: Option<String>,
}

/// Response of `GetDefaultVersion`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetDefaultVersionResponse {
    /// Default version identifier.
    #[prost(string, required, tag = "1")]
    pub version: String,
}

/// Request for `GetNumInstances`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct GetNumInstancesRequest {
    /// Module to inspect; the current module when unset.
    #[prost(string, optional, tag = "1")]
    pub module: Option<String>,
    /// Version to inspect; the current version when unset.
    #[prost(string, optional, tag = "2")]
    pub version: Option<String>,
}

/// Response of `GetNumInstances`.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct GetNumInstancesResponse {
    /// Configured instance count.
    #[prost(int64, required, tag = "1")]
    pub instances: i64,
}

/// Request for `SetNumInstances`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct SetNumInstancesRequest {
    /// Module to update; the current module when unset.
    #[prost(string, optional, tag = "1")]
    pub module: Option<String>,
    /// Version to update; the current version when unset.
    #[prost(string, optional, tag = "2")]
    pub version: Option<String>,
    /// Requested instance count.
    #[prost(int64, required, tag = "3")]
    pub instances: i64,
}

/// Response of `SetNumInstances`.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct SetNumInstancesResponse {}

/// Request for `StartModule`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct StartModuleRequest {
    /// Module to start; the current module when unset.
    #[prost(string, optional, tag = "1")]
    pub module: Option<String>,
    /// Version to start; the current version when unset.
    #[prost(string, optional, tag = "2")]
    pub version: Option<String>,
}

/// Response of `StartModule`.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct StartModuleResponse {}

/// Request for `StopModule`.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct StopModuleRequest {
    /// Module to stop; the current module when unset.
    #[prost(string, optional, tag = "1")]
    pub module: Option<String>,
    /// Version to stop; the current version when unset.
    #[prost(string, optional, tag = "2")]
    pub version: Option<String>,
}

/// Response of `StopModule`.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct StopModuleResponse {}

/// Envelope posted to the service bridge.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RemoteRequest {
    /// Target service (`modules`).
    #[prost(string, required, tag = "2")]
    pub service_name: String,
    /// Target method.
    #[prost(string, required, tag = "3")]
    pub method: String,
    /// Encoded method request.
    #[prost(bytes = "vec", required, tag = "4")]
    pub request: Vec<u8>,
    /// API ticket identifying the calling instance.
    #[prost(string, optional, tag = "5")]
    pub request_id: Option<String>,
}

/// Application level failure reported inside a [`RemoteResponse`].
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ApplicationError {
    /// Service specific error code.
    #[prost(int32, required, tag = "1")]
    pub code: i32,
    /// Human readable detail.
    #[prost(string, required, tag = "2")]
    pub detail: String,
}

/// RPC layer failure reported inside a [`RemoteResponse`].
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RpcError {
    /// RPC error code.
    #[prost(int32, required, tag = "1")]
    pub code: i32,
    /// Human readable detail.
    #[prost(string, optional, tag = "2")]
    pub detail: Option<String>,
}

/// Envelope returned by the service bridge.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct RemoteResponse {
    /// Encoded method response.
    #[prost(bytes = "vec", optional, tag = "1")]
    pub response: Option<Vec<u8>>,
    /// Serialised exception raised by the service.
    #[prost(bytes = "vec", optional, tag = "2")]
    pub exception: Option<Vec<u8>>,
    /// Application level failure.
    #[prost(message, optional, tag = "3")]
    pub application_error: Option<ApplicationError>,
    /// Serialised Java exception raised by the service.
    #[prost(bytes = "vec", optional, tag = "4")]
    pub java_exception: Option<Vec<u8>>,
    /// RPC layer failure.
    #[prost(message, optional, tag = "5")]
    pub rpc_error: Option<RpcError>,
}
