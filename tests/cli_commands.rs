//! Behavioural tests for `modctl` subcommands against mock platform services.

#[path = "common/test_constants.rs"]
mod test_constants;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use httpmock::prelude::*;
use modctl::legacy::proto::{
    ApplicationError, GetModulesResponse, GetNumInstancesResponse, RemoteResponse,
};
use predicates::str::contains;
use prost::Message;
use serde_json::json;

use test_constants::{AMBIENT_VARS, TEST_PROJECT, TEST_TOKEN};

fn isolated_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("modctl");
    for var in AMBIENT_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn admin_cmd(server: &MockServer) -> Command {
    let mut cmd = isolated_cmd();
    cmd.env("MODULES_USE_ADMIN_API", "true");
    cmd.env("GOOGLE_CLOUD_PROJECT", TEST_PROJECT);
    cmd.env("GAE_SERVICE", "web");
    cmd.env("GAE_VERSION", "v9");
    cmd.env("MODULES_ADMIN_ENDPOINT", server.base_url());
    cmd.env("MODULES_ADMIN_ACCESS_TOKEN", TEST_TOKEN);
    cmd
}

fn legacy_cmd(server: &MockServer) -> Command {
    let mut cmd = isolated_cmd();
    cmd.env("API_HOST", server.host());
    cmd.env("API_PORT", server.port().to_string());
    cmd.env("GAE_APPLICATION", "s~demo");
    cmd.env("GAE_SERVICE", "web");
    cmd.env("GAE_VERSION", "v1");
    cmd.env("GAE_INSTANCE", "i-1");
    cmd
}

fn envelope(message: &impl Message) -> Vec<u8> {
    RemoteResponse {
        response: Some(message.encode_to_vec()),
        ..RemoteResponse::default()
    }
    .encode_to_vec()
}

#[test]
fn admin_list_prints_service_ids() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/v1/apps/{TEST_PROJECT}/services"))
            .header("authorization", format!("Bearer {TEST_TOKEN}"));
        then.status(200)
            .json_body(json!({"services": [{"id": "default"}, {"id": "web"}]}));
    });

    admin_cmd(&server)
        .arg("list")
        .assert()
        .success()
        .stdout("default\nweb\n");
    mock.assert();
}

#[test]
fn admin_instances_defaults_to_current_version() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/v1/apps/{TEST_PROJECT}/services/web/versions/v9"));
        then.status(200)
            .json_body(json!({"id": "v9", "manualScaling": {"instances": 3}}));
    });

    admin_cmd(&server)
        .arg("instances")
        .assert()
        .success()
        .stdout("3\n");
    mock.assert();
}

#[test]
fn admin_stop_patches_serving_status() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("/v1/apps/{TEST_PROJECT}/services/api/versions/v2"))
            .query_param("updateMask", "servingStatus")
            .header("user-agent", "appengine-modules-api-rust-client/stop_version")
            .json_body(json!({"servingStatus": "STOPPED"}));
        then.status(200)
            .json_body(json!({"name": "apps/demo-project/operations/1"}));
    });

    admin_cmd(&server)
        .args(["stop", "--module", "api", "--version", "v2"])
        .assert()
        .success()
        .stdout("");
    mock.assert();
}

#[test]
fn admin_default_version_reports_missing_module() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/v1/apps/{TEST_PROJECT}/services/ghost"));
        then.status(404).json_body(json!({
            "error": {"code": 404, "message": "not found", "status": "NOT_FOUND"}
        }));
    });

    admin_cmd(&server)
        .args(["default-version", "--module", "ghost"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("module: Module 'ghost' not found"));
}

#[test]
fn legacy_list_goes_through_the_service_bridge() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc_http")
            .header("x-google-rpc-service-endpoint", "app-engine-apis")
            .header("x-google-rpc-service-method", "/VMRemoteAPI.CallRemoteAPI")
            .header("content-type", "application/octet-stream");
        then.status(200).body(envelope(&GetModulesResponse {
            module: vec![String::from("default"), String::from("batch")],
        }));
    });

    legacy_cmd(&server)
        .arg("list")
        .assert()
        .success()
        .stdout("default\nbatch\n");
    mock.assert();
}

#[test]
fn legacy_path_ignores_admin_configuration() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/rpc_http");
        then.status(200)
            .body(envelope(&GetNumInstancesResponse { instances: 12 }));
    });

    legacy_cmd(&server)
        .env("MODULES_USE_ADMIN_API", "false")
        .env("MODULES_ADMIN_ENDPOINT", "not a url")
        .args(["instances", "--module", "web", "--version", "v1"])
        .assert()
        .success()
        .stdout("12\n");
}

#[test]
fn legacy_application_errors_are_reported() {
    let server = MockServer::start();
    let reply = RemoteResponse {
        application_error: Some(ApplicationError {
            code: 2,
            detail: String::from("version v404 does not exist"),
        }),
        ..RemoteResponse::default()
    };
    server.mock(|when, then| {
        when.method(POST).path("/rpc_http");
        then.status(200).body(reply.encode_to_vec());
    });

    legacy_cmd(&server)
        .args(["start", "--version", "v404"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains(
            "API error 2 (modules: INVALID_VERSION): version v404 does not exist",
        ));
}

#[test]
fn modern_path_reports_invalid_configuration_on_use() {
    let mut cmd = isolated_cmd();
    cmd.env("MODULES_USE_ADMIN_API", "true")
        .env("GOOGLE_CLOUD_PROJECT", TEST_PROJECT)
        .env("MODULES_ADMIN_ENDPOINT", "not a url")
        .env("MODULES_ADMIN_ACCESS_TOKEN", TEST_TOKEN)
        .arg("list")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("module: could not create admin service:"));
}

#[test]
fn admin_path_ignores_invalid_bridge_address() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/v1/apps/{TEST_PROJECT}/services"));
        then.status(200).json_body(json!({"services": [{"id": "default"}]}));
    });

    admin_cmd(&server)
        .env("API_PORT", "not-a-port")
        .arg("list")
        .assert()
        .success()
        .stdout("default\n");
    mock.assert_calls(1);
}

#[test]
fn legacy_path_reports_invalid_bridge_address_on_use() {
    isolated_cmd()
        .env("API_PORT", "not-a-port")
        .arg("list")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("invalid bridge address"));
}
