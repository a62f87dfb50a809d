//! Ambient platform environment: path selection and identity resolution.
//!
//! Operation logic never reads process state directly. Every facade call
//! captures an [`AmbientEnv`] snapshot from an injected [`EnvSource`] and
//! derives the backend path and identity from that snapshot alone.

/// Opt-in flag selecting the administrative API path.
pub const USE_ADMIN_API_ENV: &str = "MODULES_USE_ADMIN_API";
/// Explicit project identifier.
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";
/// Application identifier set by the second generation runtimes.
pub const APPLICATION_ENV: &str = "GAE_APPLICATION";
/// Application identifier set by the first generation runtimes.
pub const LEGACY_APPLICATION_ENV: &str = "APPLICATION_ID";
/// Name of the service the current instance belongs to.
pub const SERVICE_ENV: &str = "GAE_SERVICE";
/// Version identifier of the current instance.
pub const VERSION_ENV: &str = "GAE_VERSION";
/// Version identifier in `major.minor` form set by older runtimes.
pub const CURRENT_VERSION_ENV: &str = "CURRENT_VERSION_ID";
/// Instance identifier of the current instance.
pub const INSTANCE_ENV: &str = "GAE_INSTANCE";
/// Host of the legacy service bridge.
pub const API_HOST_ENV: &str = "API_HOST";
/// Port of the legacy service bridge.
pub const API_PORT_ENV: &str = "API_PORT";

/// Service name used when the environment does not name one.
pub const DEFAULT_SERVICE: &str = "default";

/// Read-only view of environment variables.
pub trait EnvSource: Send + Sync {
    /// Returns the value of `key`, or `None` when unset or not valid UTF-8.
    fn var(&self, key: &str) -> Option<String>;
}

/// [`EnvSource`] backed by the real process environment.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// Which implementation answers a call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackendPath {
    /// The internal `modules` RPC service.
    Legacy,
    /// The public administrative HTTP API.
    Modern,
}

impl BackendPath {
    /// Selects the path for a single call.
    #[must_use]
    pub fn select(env: &AmbientEnv) -> Self {
        let enabled = env
            .use_admin_api
            .as_deref()
            .is_some_and(|flag| flag.eq_ignore_ascii_case("true"));
        if enabled { Self::Modern } else { Self::Legacy }
    }

    /// Short label used in log events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Modern => "modern",
        }
    }
}

/// Snapshot of every ambient variable the facade consults.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AmbientEnv {
    /// Raw value of [`USE_ADMIN_API_ENV`].
    pub use_admin_api: Option<String>,
    /// Raw value of [`PROJECT_ENV`].
    pub project: Option<String>,
    /// Raw value of [`APPLICATION_ENV`].
    pub application: Option<String>,
    /// Raw value of [`LEGACY_APPLICATION_ENV`].
    pub legacy_application: Option<String>,
    /// Raw value of [`SERVICE_ENV`].
    pub service: Option<String>,
    /// Raw value of [`VERSION_ENV`].
    pub version: Option<String>,
    /// Raw value of [`CURRENT_VERSION_ENV`].
    pub current_version: Option<String>,
    /// Raw value of [`INSTANCE_ENV`].
    pub instance: Option<String>,
    /// Raw value of [`API_HOST_ENV`].
    pub api_host: Option<String>,
    /// Raw value of [`API_PORT_ENV`].
    pub api_port: Option<String>,
}

impl AmbientEnv {
    /// Reads every ambient variable from `source`.
    #[must_use]
    pub fn capture(source: &impl EnvSource) -> Self {
        Self {
            use_admin_api: source.var(USE_ADMIN_API_ENV),
            project: source.var(PROJECT_ENV),
            application: source.var(APPLICATION_ENV),
            legacy_application: source.var(LEGACY_APPLICATION_ENV),
            service: source.var(SERVICE_ENV),
            version: source.var(VERSION_ENV),
            current_version: source.var(CURRENT_VERSION_ENV),
            instance: source.var(INSTANCE_ENV),
            api_host: source.var(API_HOST_ENV),
            api_port: source.var(API_PORT_ENV),
        }
    }

    /// Application id as reported by the runtime, including any partition
    /// (`s~`) and domain (`example.com:`) prefixes.
    #[must_use]
    pub fn application_id(&self) -> &str {
        non_empty(self.application.as_deref())
            .or_else(|| non_empty(self.legacy_application.as_deref()))
            .unwrap_or_default()
    }

    /// Resolves the project identifier.
    ///
    /// An explicit project wins. Otherwise the project is the part of the
    /// application id after its partition prefix (everything up to and
    /// including the first `~`), stripped of any `domain:` prefix. An
    /// application id without a partition yields an empty project.
    #[must_use]
    pub fn project_id(&self) -> String {
        if let Some(project) = non_empty(self.project.as_deref()) {
            return project.to_owned();
        }
        let partitioned = self
            .application_id()
            .split_once('~')
            .map_or("", |(_, rest)| rest);
        partitioned
            .split_once(':')
            .map_or(partitioned, |(_, rest)| rest)
            .to_owned()
    }

    /// Resolves the current service name, defaulting to
    /// [`DEFAULT_SERVICE`].
    #[must_use]
    pub fn service_name(&self) -> String {
        non_empty(self.service.as_deref())
            .unwrap_or(DEFAULT_SERVICE)
            .to_owned()
    }

    /// Resolves the current version identifier.
    ///
    /// `GAE_VERSION` is already a bare version id. `CURRENT_VERSION_ID`
    /// carries a deployment suffix (`v1.123456`) which is dropped.
    #[must_use]
    pub fn version_id(&self) -> String {
        if let Some(version) = non_empty(self.version.as_deref()) {
            return version.to_owned();
        }
        non_empty(self.current_version.as_deref())
            .map(|raw| raw.split_once('.').map_or(raw, |(major, _)| major))
            .unwrap_or_default()
            .to_owned()
    }

    /// Resolves the full identity context used by the modern path.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            project_id: self.project_id(),
            service: self.service_name(),
            version: self.version_id(),
        }
    }

    /// Ticket identifying this instance to the legacy service bridge when the
    /// caller does not supply one.
    ///
    /// Format: `<app id>/<service>.<major version>.<instance>` where `:` and
    /// `.` in the app id are replaced with `_`.
    #[must_use]
    pub fn default_ticket(&self) -> String {
        let app_id = self.application_id();
        let partitionless = app_id.split_once('~').map_or(app_id, |(_, rest)| rest);
        let escaped = partitionless.replace([':', '.'], "_");
        let instance = self.instance.as_deref().unwrap_or_default();
        format!(
            "{escaped}/{}.{}.{instance}",
            self.service_name(),
            self.version_id()
        )
    }
}

/// Identity context of the calling instance.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Identity {
    /// Project owning the application.
    pub project_id: String,
    /// Current service name.
    pub service: String,
    /// Current version identifier.
    pub version: String,
}

impl Identity {
    /// Returns `module`, or the current service when `module` is empty.
    #[must_use]
    pub fn module_or_default<'a>(&'a self, module: &'a str) -> &'a str {
        if module.is_empty() {
            &self.service
        } else {
            module
        }
    }

    /// Returns `version`, or the current version when `version` is empty.
    #[must_use]
    pub fn version_or_default<'a>(&'a self, version: &'a str) -> &'a str {
        if version.is_empty() {
            &self.version
        } else {
            version
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|candidate| !candidate.is_empty())
}
