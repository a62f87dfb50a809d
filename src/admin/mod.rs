//! Modern path: the App Engine administrative REST API.
//!
//! Empty module or version arguments are resolved from the identity captured
//! for the call. Mutations return as soon as the API accepts the update; the
//! long running operation it hands back is logged and not awaited.

use crate::config::{AdminApiConfig, ConfigError};
use crate::context::CallContext;
use crate::control::{ControlFuture, ModuleControl, RequestScope, ServingStatus};
use crate::error::ModulesError;

mod client;
pub mod split;
mod token;
pub mod types;

pub use client::{AdminClient, AdminOperation, AdminSession, USER_AGENT_PREFIX};
pub use token::TokenSource;
use types::{ManualScaling, Operation, Version};

/// Update mask used when changing a version's instance count.
pub const INSTANCES_MASK: &str = "manualScaling.instances";
/// Update mask used when starting or stopping a version.
pub const SERVING_STATUS_MASK: &str = "servingStatus";

/// [`ModuleControl`] backed by the administrative API.
///
/// Client construction failures are held back and reported by the first
/// operation that needs the client, so the legacy path stays usable when the
/// administrative API is misconfigured.
#[derive(Clone, Debug)]
pub struct AdminBackend {
    client: Result<AdminClient, ModulesError>,
}

impl AdminBackend {
    /// Builds a backend from configuration.
    #[must_use]
    pub fn new(config: &AdminApiConfig) -> Self {
        Self {
            client: AdminClient::new(config),
        }
    }

    /// Builds a backend from the outcome of loading configuration.
    #[must_use]
    pub fn from_loaded(config: Result<AdminApiConfig, ConfigError>) -> Self {
        match config {
            Ok(loaded) => Self::new(&loaded),
            Err(err) => Self {
                client: Err(err.into()),
            },
        }
    }

    /// Wraps an already constructed client.
    #[must_use]
    pub const fn with_client(client: AdminClient) -> Self {
        Self { client: Ok(client) }
    }

    async fn session<'a>(
        &'a self,
        ctx: &'a CallContext,
        operation: AdminOperation,
    ) -> Result<AdminSession<'a>, ModulesError> {
        let client = self.client.as_ref().map_err(Clone::clone)?;
        client.session(ctx, operation).await
    }

    async fn patch(
        &self,
        scope: &RequestScope,
        operation: AdminOperation,
        target: (&str, &str),
        update: Version,
        mask: &str,
    ) -> Result<(), ModulesError> {
        let identity = scope.env.identity();
        let module = identity.module_or_default(target.0);
        let version = identity.version_or_default(target.1);
        let session = self.session(&scope.ctx, operation).await?;
        let accepted = session
            .patch_version(&identity.project_id, module, version, &update, mask)
            .await?;
        log_accepted(operation, &accepted);
        Ok(())
    }
}

fn log_accepted(operation: AdminOperation, accepted: &Operation) {
    tracing::debug!(
        operation = operation.method_name(),
        name = %accepted.name,
        done = accepted.done,
        "admin API accepted update"
    );
}

impl ModuleControl for AdminBackend {
    fn list<'a>(&'a self, scope: &'a RequestScope) -> ControlFuture<'a, Vec<String>> {
        Box::pin(async move {
            let identity = scope.env.identity();
            let session = self
                .session(&scope.ctx, AdminOperation::GetModules)
                .await?;
            let page = session.list_services(&identity.project_id).await?;
            Ok(page.services.into_iter().map(|service| service.id).collect())
        })
    }

    fn num_instances<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
        version: &'a str,
    ) -> ControlFuture<'a, i64> {
        Box::pin(async move {
            let identity = scope.env.identity();
            let module_id = identity.module_or_default(module);
            let version_id = identity.version_or_default(version);
            let session = self
                .session(&scope.ctx, AdminOperation::GetNumInstances)
                .await?;
            let found = session
                .get_version(&identity.project_id, module_id, version_id)
                .await?;
            found.manual_scaling.as_ref().map_or_else(
                || {
                    tracing::warn!(
                        module = module_id,
                        version = version_id,
                        scaling = ?found.scaling_mode(),
                        "version is not manually scaled"
                    );
                    Err(ModulesError::NotManualScaling {
                        version: version_id.to_owned(),
                    })
                },
                |scaling| Ok(scaling.instances),
            )
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
            let update = Version {
                manual_scaling: Some(ManualScaling { instances }),
                ..Version::default()
            };
            self.patch(
                scope,
                AdminOperation::SetNumInstances,
                (module, version),
                update,
                INSTANCES_MASK,
            )
            .await
        })
    }

    fn versions<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
    ) -> ControlFuture<'a, Vec<String>> {
        Box::pin(async move {
            let identity = scope.env.identity();
            let module_id = identity.module_or_default(module);
            let session = self
                .session(&scope.ctx, AdminOperation::GetVersions)
                .await?;
            let page = session
                .list_versions(&identity.project_id, module_id)
                .await?;
            Ok(page
                .versions
                .into_iter()
                .map(|listed| listed.id.unwrap_or_default())
                .collect())
        })
    }

    fn default_version<'a>(
        &'a self,
        scope: &'a RequestScope,
        module: &'a str,
    ) -> ControlFuture<'a, String> {
        Box::pin(async move {
            let identity = scope.env.identity();
            let module_id = identity.module_or_default(module);
            let session = self
                .session(&scope.ctx, AdminOperation::GetDefaultVersion)
                .await?;
            let service = match session.get_service(&identity.project_id, module_id).await {
                Ok(found) => found,
                Err(err) if err.is_not_found() => {
                    tracing::warn!(module = module_id, "module not found");
                    return Err(ModulesError::ModuleNotFound {
                        module: module_id.to_owned(),
                    });
                }
                Err(err) => return Err(err.into()),
            };
            let allocations = service.split.unwrap_or_default().allocations;
            split::select_default_version(&allocations).ok_or_else(|| {
                tracing::warn!(module = module_id, "traffic split names no version");
                ModulesError::NoDefaultVersion {
                    module: module_id.to_owned(),
                }
            })
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
            let operation = match status {
                ServingStatus::Serving => AdminOperation::StartVersion,
                ServingStatus::Stopped => AdminOperation::StopVersion,
            };
            let update = Version {
                serving_status: Some(status.as_str().to_owned()),
                ..Version::default()
            };
            self.patch(
                scope,
                operation,
                (module, version),
                update,
                SERVING_STATUS_MASK,
            )
            .await
        })
    }
}
