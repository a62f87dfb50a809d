//! Public entry point: one facade, two backends, path chosen per call.

use crate::admin::AdminBackend;
use crate::config::AdminApiConfig;
use crate::context::CallContext;
use crate::control::{ModuleControl, RequestScope, ServingStatus};
use crate::env::{AmbientEnv, BackendPath, EnvSource, ProcessEnv};
use crate::error::ModulesError;
use crate::legacy::{HttpRpcTransport, LegacyBackend};

/// Facade with the production backends.
pub type DefaultModules = Modules<ProcessEnv, LegacyBackend<HttpRpcTransport>, AdminBackend>;

/// Module control facade.
///
/// Every call captures a fresh [`AmbientEnv`] snapshot from `E` and
/// dispatches to the legacy backend `L` or the administrative backend `A`
/// according to `MODULES_USE_ADMIN_API` at that moment. Nothing is cached
/// between calls.
#[derive(Clone, Debug)]
pub struct Modules<E, L, A> {
    env: E,
    legacy: L,
    admin: A,
}

impl Modules<ProcessEnv, LegacyBackend<HttpRpcTransport>, AdminBackend> {
    /// Builds the facade from process state.
    ///
    /// Neither backend fails construction. An invalid service bridge address
    /// is reported by legacy calls only, and admin API configuration problems
    /// by modern calls only.
    #[must_use]
    pub fn from_process_env() -> DefaultModules {
        let env = ProcessEnv;
        let transport = HttpRpcTransport::from_env(&AmbientEnv::capture(&env));
        let admin = AdminBackend::from_loaded(AdminApiConfig::load_without_cli_args());
        Self::new(env, LegacyBackend::from_built(transport), admin)
    }
}

impl<E, L, A> Modules<E, L, A>
where
    E: EnvSource,
    L: ModuleControl,
    A: ModuleControl,
{
    /// Assembles a facade from its parts.
    #[must_use]
    pub const fn new(env: E, legacy: L, admin: A) -> Self {
        Self { env, legacy, admin }
    }

    fn route(&self, ctx: &CallContext, operation: &str) -> (&dyn ModuleControl, RequestScope) {
        let env = AmbientEnv::capture(&self.env);
        let path = BackendPath::select(&env);
        tracing::debug!(operation, path = path.as_str(), "dispatching module call");
        let backend: &dyn ModuleControl = match path {
            BackendPath::Legacy => &self.legacy,
            BackendPath::Modern => &self.admin,
        };
        (backend, RequestScope::new(ctx.clone(), env))
    }

    /// Lists the modules of the application.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn list(&self, ctx: &CallContext) -> Result<Vec<String>, ModulesError> {
        let (backend, scope) = self.route(ctx, "list");
        backend.list(&scope).await
    }

    /// Returns the instance count of a manually scaled version. Empty
    /// arguments mean the current module or version.
    ///
    /// # Errors
    ///
    /// Returns [`ModulesError::NotManualScaling`] on the modern path when the
    /// version uses another scaling mode, and propagates backend failures.
    pub async fn num_instances(
        &self,
        ctx: &CallContext,
        module: &str,
        version: &str,
    ) -> Result<i64, ModulesError> {
        let (backend, scope) = self.route(ctx, "num_instances");
        backend.num_instances(&scope, module, version).await
    }

    /// Sets the instance count of a manually scaled version.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn set_num_instances(
        &self,
        ctx: &CallContext,
        module: &str,
        version: &str,
        instances: i64,
    ) -> Result<(), ModulesError> {
        let (backend, scope) = self.route(ctx, "set_num_instances");
        backend
            .set_num_instances(&scope, module, version, instances)
            .await
    }

    /// Lists the versions of a module.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn versions(
        &self,
        ctx: &CallContext,
        module: &str,
    ) -> Result<Vec<String>, ModulesError> {
        let (backend, scope) = self.route(ctx, "versions");
        backend.versions(&scope, module).await
    }

    /// Returns the version receiving a module's default traffic.
    ///
    /// # Errors
    ///
    /// Returns [`ModulesError::ModuleNotFound`] or
    /// [`ModulesError::NoDefaultVersion`] on the modern path, and propagates
    /// backend failures.
    pub async fn default_version(
        &self,
        ctx: &CallContext,
        module: &str,
    ) -> Result<String, ModulesError> {
        let (backend, scope) = self.route(ctx, "default_version");
        backend.default_version(&scope, module).await
    }

    /// Starts a version.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn start(
        &self,
        ctx: &CallContext,
        module: &str,
        version: &str,
    ) -> Result<(), ModulesError> {
        let (backend, scope) = self.route(ctx, "start");
        backend
            .set_serving_status(&scope, module, version, ServingStatus::Serving)
            .await
    }

    /// Stops a version.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn stop(
        &self,
        ctx: &CallContext,
        module: &str,
        version: &str,
    ) -> Result<(), ModulesError> {
        let (backend, scope) = self.route(ctx, "stop");
        backend
            .set_serving_status(&scope, module, version, ServingStatus::Stopped)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::proto::{GetModulesResponse, GetNumInstancesRequest, GetNumInstancesResponse};
    use crate::test_support::{MapEnv, ScriptedTransport};
    use httpmock::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn admin_for(server: &MockServer) -> AdminBackend {
        AdminBackend::new(&AdminApiConfig {
            endpoint: server.base_url(),
            access_token: Some(String::from("token")),
            ..AdminApiConfig::default()
        })
    }

    #[tokio::test]
    async fn path_is_reselected_on_every_call() {
        let server = MockServer::start();
        let admin_mock = server.mock(|when, then| {
            when.method(GET).path("/v1/apps/proj/services");
            then.status(200)
                .json_body(json!({"services": [{"id": "from-admin"}]}));
        });
        let transport = ScriptedTransport::new();
        transport.push_response(&GetModulesResponse {
            module: vec![String::from("from-legacy")],
        });
        transport.push_response(&GetModulesResponse {
            module: vec![String::from("from-legacy-again")],
        });
        let env = MapEnv::with_vars(&[("GOOGLE_CLOUD_PROJECT", "proj")]);
        let modules = Modules::new(
            env.clone(),
            LegacyBackend::new(transport.clone()),
            admin_for(&server),
        );
        let ctx = CallContext::new();

        assert_eq!(modules.list(&ctx).await.expect("legacy"), vec!["from-legacy"]);
        env.set("MODULES_USE_ADMIN_API", "TRUE");
        assert_eq!(modules.list(&ctx).await.expect("admin"), vec!["from-admin"]);
        env.set("MODULES_USE_ADMIN_API", "yes");
        assert_eq!(
            modules.list(&ctx).await.expect("legacy again"),
            vec!["from-legacy-again"]
        );

        assert_eq!(transport.calls().len(), 2);
        admin_mock.assert_calls(1);
    }

    #[rstest]
    #[case("", "", None, None)]
    #[case("m", "v", Some("m"), Some("v"))]
    #[tokio::test]
    async fn legacy_calls_leave_defaults_to_the_service(
        #[case] module: &str,
        #[case] version: &str,
        #[case] expected_module: Option<&str>,
        #[case] expected_version: Option<&str>,
    ) {
        let transport = ScriptedTransport::new();
        transport.push_response(&GetNumInstancesResponse { instances: 4 });
        let modules = Modules::new(
            MapEnv::new(),
            LegacyBackend::new(transport.clone()),
            AdminBackend::new(&AdminApiConfig::default()),
        );

        let count = modules
            .num_instances(&CallContext::new(), module, version)
            .await
            .expect("count");

        assert_eq!(count, 4);
        let request: GetNumInstancesRequest = transport.last_request().expect("request");
        assert_eq!(request.module.as_deref(), expected_module);
        assert_eq!(request.version.as_deref(), expected_version);
    }

    #[tokio::test]
    async fn broken_legacy_transport_only_fails_legacy_calls() {
        let server = MockServer::start();
        let admin_mock = server.mock(|when, then| {
            when.method(GET).path("/v1/apps/proj/services");
            then.status(200).json_body(json!({"services": [{"id": "default"}]}));
        });
        let broken = HttpRpcTransport::from_env(&AmbientEnv {
            api_port: Some(String::from("not-a-port")),
            ..AmbientEnv::default()
        });
        assert!(broken.is_err(), "bridge address should be rejected");
        let env = MapEnv::with_vars(&[
            ("GOOGLE_CLOUD_PROJECT", "proj"),
            ("MODULES_USE_ADMIN_API", "true"),
        ]);
        let modules = Modules::new(
            env.clone(),
            LegacyBackend::from_built(broken),
            admin_for(&server),
        );
        let ctx = CallContext::new();

        assert_eq!(modules.list(&ctx).await.expect("admin"), vec!["default"]);
        env.remove("MODULES_USE_ADMIN_API");
        let err = modules.list(&ctx).await.expect_err("legacy should fail");

        assert!(
            matches!(err, ModulesError::Legacy(crate::error::LegacyError::Transport(_))),
            "unexpected error: {err:?}"
        );
        admin_mock.assert_calls(1);
    }

    #[tokio::test]
    async fn modern_start_resolves_current_module_and_version() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/v1/apps/example/services/svc/versions/v7")
                .query_param("updateMask", "servingStatus")
                .json_body(json!({"servingStatus": "SERVING"}));
            then.status(200).json_body(json!({"name": "op"}));
        });
        let env = MapEnv::with_vars(&[
            ("MODULES_USE_ADMIN_API", "true"),
            ("GAE_APPLICATION", "s~example"),
            ("GAE_SERVICE", "svc"),
            ("CURRENT_VERSION_ID", "v7.4242"),
        ]);
        let modules = Modules::new(
            env,
            LegacyBackend::new(ScriptedTransport::new()),
            admin_for(&server),
        );

        modules
            .start(&CallContext::new(), "", "")
            .await
            .expect("start");

        mock.assert();
    }
}
