//! BDD step definitions for default version lookup.

use httpmock::prelude::*;
use modctl::CallContext;
use rstest_bdd_macros::{given, then, when};
use serde_json::json;

use super::test_helpers::{DefaultVersionContext, allocations};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("the administrative API is enabled for project \"{project}\"")]
fn admin_api_enabled(
    mut default_version_context: DefaultVersionContext,
    project: String,
) -> DefaultVersionContext {
    default_version_context
        .env
        .set("MODULES_USE_ADMIN_API", "true");
    default_version_context
        .env
        .set("GOOGLE_CLOUD_PROJECT", project.trim());
    default_version_context.project = project.trim().to_owned();
    default_version_context
}

#[given("module \"{module}\" splits traffic as \"{split}\"")]
fn module_splits_traffic(
    default_version_context: DefaultVersionContext,
    module: String,
    split: String,
) -> DefaultVersionContext {
    let path = default_version_context.service_path(module.trim());
    let body = json!({
        "id": module.trim(),
        "split": {"shardBy": "IP", "allocations": allocations(&split)}
    });
    default_version_context.server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(200).json_body(body);
    });
    default_version_context
}

#[given("module \"{module}\" has no traffic split")]
fn module_without_split(
    default_version_context: DefaultVersionContext,
    module: String,
) -> DefaultVersionContext {
    let path = default_version_context.service_path(module.trim());
    let body = json!({"id": module.trim()});
    default_version_context.server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(200).json_body(body);
    });
    default_version_context
}

#[given("module \"{module}\" does not exist")]
fn module_missing(
    default_version_context: DefaultVersionContext,
    module: String,
) -> DefaultVersionContext {
    let path = default_version_context.service_path(module.trim());
    default_version_context.server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(404).json_body(json!({
            "error": {"code": 404, "message": "service not found", "status": "NOT_FOUND"}
        }));
    });
    default_version_context
}

#[when("I ask for the default version of module \"{module}\"")]
fn ask_default_version(
    mut default_version_context: DefaultVersionContext,
    module: String,
) -> DefaultVersionContext {
    let modules = default_version_context.modules();
    let runtime = tokio::runtime::Runtime::new()
        .unwrap_or_else(|err| panic!("failed to create tokio runtime: {err}"));
    let result = runtime.block_on(modules.default_version(&CallContext::new(), module.trim()));
    default_version_context.outcome = Some(result.map_err(|err| err.to_string()));
    default_version_context
}

#[then("the default version is \"{version}\"")]
fn default_version_is(
    default_version_context: &DefaultVersionContext,
    version: String,
) -> Result<(), StepError> {
    match default_version_context.outcome.as_ref() {
        Some(Ok(found)) if found == version.trim() => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected default version {version}, got {other:?}"
        ))),
    }
}

#[then("the lookup fails with \"{message}\"")]
fn lookup_fails_with(
    default_version_context: &DefaultVersionContext,
    message: String,
) -> Result<(), StepError> {
    match default_version_context.outcome.as_ref() {
        Some(Err(found)) if found.contains(message.trim()) => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected failure containing '{message}', got {other:?}"
        ))),
    }
}
