//! Shared fixtures and helpers for default version scenarios.

use std::sync::Arc;

use httpmock::prelude::*;
use modctl::test_support::{MapEnv, ScriptedTransport};
use modctl::{AdminApiConfig, AdminBackend, LegacyBackend, Modules};
use rstest::fixture;
use serde_json::{Map, Value, json};

/// Facade wired to an in-memory environment and a mock administrative API.
pub type ScenarioModules = Modules<MapEnv, LegacyBackend<ScriptedTransport>, AdminBackend>;

#[derive(Clone)]
pub struct DefaultVersionContext {
    pub server: Arc<MockServer>,
    pub env: MapEnv,
    pub project: String,
    pub outcome: Option<Result<String, String>>,
}

#[fixture]
pub fn default_version_context() -> DefaultVersionContext {
    DefaultVersionContext {
        server: Arc::new(MockServer::start()),
        env: MapEnv::new(),
        project: String::new(),
        outcome: None,
    }
}

impl DefaultVersionContext {
    pub fn modules(&self) -> ScenarioModules {
        let config = AdminApiConfig {
            endpoint: self.server.base_url(),
            access_token: Some(String::from("scenario-token")),
            ..AdminApiConfig::default()
        };
        Modules::new(
            self.env.clone(),
            LegacyBackend::new(ScriptedTransport::new()),
            AdminBackend::new(&config),
        )
    }

    pub fn service_path(&self, module: &str) -> String {
        format!("/v1/apps/{}/services/{module}", self.project)
    }
}

/// Parses `v1=0.5,v2=0.5` into a JSON allocations object.
pub fn allocations(split: &str) -> Value {
    let entries: Map<String, Value> = split
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            let (version, share) = entry
                .split_once('=')
                .unwrap_or_else(|| panic!("allocation '{entry}' should be version=share"));
            let fraction: f64 = share
                .trim()
                .parse()
                .unwrap_or_else(|err| panic!("allocation share '{share}' invalid: {err}"));
            (version.trim().to_owned(), json!(fraction))
        })
        .collect();
    Value::Object(entries)
}
