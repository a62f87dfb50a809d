//! Capability interface implemented by both backends.

use std::future::Future;
use std::pin::Pin;

use crate::context::CallContext;
use crate::env::AmbientEnv;
use crate::error::ModulesError;

/// Future returned by [`ModuleControl`] operations.
pub type ControlFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ModulesError>> + Send + 'a>>;

/// Everything a backend may consult for a single call.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequestScope {
    /// Caller supplied execution context.
    pub ctx: CallContext,
    /// Environment snapshot captured when the call started.
    pub env: AmbientEnv,
}

impl RequestScope {
    /// Bundles a context with the environment captured for this call.
    #[must_use]
    pub const fn new(ctx: CallContext, env: AmbientEnv) -> Self {
        Self { ctx, env }
    }
}

/// Serving states a version can be moved into.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServingStatus {
    /// The version receives traffic.
    Serving,
    /// The version is stopped.
    Stopped,
}

impl ServingStatus {
    /// Wire value used by the administrative API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serving => "SERVING",
            Self::Stopped => "STOPPED",
        }
    }
}

/// Operations exposed by the module control facade.
///
/// Empty `module` or `version` arguments mean "the current one". Each
/// implementation decides how the default is resolved: the legacy service
/// resolves it server-side, the administrative API backend resolves it from
/// the request scope.
pub trait ModuleControl: Send + Sync {
    /// Lists the modules of the application.
    fn list<'a>(&'a self, scope: &'a RequestScope) -> ControlFuture<'a, Vec<String>>;

    /// Returns the instance count of a manually scaled version.
    fn num_instances<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
        version: &'a str,
    ) -> ControlFuture<'a, i64>;

    /// Sets the instance count of a manually scaled version.
    fn set_num_instances<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
        version: &'a str,
        instances: i64,
    ) -> ControlFuture<'a, ()>;

    /// Lists the versions of a module.
    fn versions<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
    ) -> ControlFuture<'a, Vec<String>>;

    /// Returns the version that receives the default traffic of a module.
    fn default_version<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
    ) -> ControlFuture<'a, String>;

    /// Moves a version into `status`.
    fn set_serving_status<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
        version: &'a str,
        status: ServingStatus,
    ) -> ControlFuture<'a, ()>;
}
