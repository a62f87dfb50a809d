//! Core library for the `modctl` module control facade.
//!
//! The crate lets an App Engine application inspect and manage its own
//! modules (services) and versions: list them, read and change instance
//! counts of manually scaled versions, find the default version and start or
//! stop versions. Each call is answered either by the legacy `modules` RPC
//! service or by the administrative REST API, chosen per call by the
//! `MODULES_USE_ADMIN_API` environment flag.

pub mod admin;
pub mod config;
pub mod context;
pub mod control;
pub mod env;
pub mod error;
pub mod facade;
pub mod legacy;
pub mod test_support;

pub use admin::{AdminBackend, AdminClient, AdminOperation};
pub use config::{AdminApiConfig, ConfigError};
pub use context::CallContext;
pub use control::{ControlFuture, ModuleControl, RequestScope, ServingStatus};
pub use env::{AmbientEnv, BackendPath, EnvSource, Identity, ProcessEnv};
pub use error::{ApiError, LegacyError, ModulesError, ModulesServiceCode};
pub use facade::{DefaultModules, Modules};
pub use legacy::{HttpRpcTransport, LegacyBackend, RpcTransport};
