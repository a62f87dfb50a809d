//! Resource shapes of the administrative API.
//!
//! Only the fields the facade reads or writes are modelled; everything else in
//! the JSON documents is ignored on decode and never sent on update.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A service (module) of the application.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Full resource name, for example `apps/p/services/default`.
    #[serde(default)]
    pub name: String,
    /// Service identifier, for example `default`.
    #[serde(default)]
    pub id: String,
    /// Traffic allocation across versions.
    #[serde(default)]
    pub split: Option<TrafficSplit>,
}

/// Traffic split of a service.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSplit {
    /// Mechanism used to split traffic (`IP`, `COOKIE`, `RANDOM`).
    #[serde(default)]
    pub shard_by: Option<String>,
    /// Version id to fraction of traffic.
    #[serde(default)]
    pub allocations: HashMap<String, f64>,
}

/// A version of a service.
///
/// Used for both decoding and partial updates, so every field is optional
/// and omitted from the serialised form when unset.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Full resource name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Present when the version uses manual scaling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_scaling: Option<ManualScaling>,
    /// Present when the version uses basic scaling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_scaling: Option<serde_json::Value>,
    /// Present when the version uses automatic scaling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automatic_scaling: Option<serde_json::Value>,
    /// Serving status (`SERVING`, `STOPPED`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_status: Option<String>,
}

/// Scaling mode of a version.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScalingMode {
    /// Fixed number of instances.
    Manual,
    /// Instances created on demand and shut down when idle.
    Basic,
    /// Instances scaled on request rate and latency.
    Automatic,
}

impl Version {
    /// Scaling mode of the version, if the resource declares one.
    #[must_use]
    pub const fn scaling_mode(&self) -> Option<ScalingMode> {
        if self.manual_scaling.is_some() {
            Some(ScalingMode::Manual)
        } else if self.basic_scaling.is_some() {
            Some(ScalingMode::Basic)
        } else if self.automatic_scaling.is_some() {
            Some(ScalingMode::Automatic)
        } else {
            None
        }
    }
}

/// Manual scaling settings.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManualScaling {
    /// Number of instances to run.
    #[serde(default)]
    pub instances: i64,
}

/// Long running operation returned by mutating calls.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation resource name.
    #[serde(default)]
    pub name: String,
    /// Whether the operation has already completed.
    #[serde(default)]
    pub done: bool,
    /// Failure details when the operation completed unsuccessfully.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// Page of services.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListServicesResponse {
    /// Services in API order.
    #[serde(default)]
    pub services: Vec<Service>,
    /// Token for the next page; not followed.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Page of versions.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListVersionsResponse {
    /// Versions in API order.
    #[serde(default)]
    pub versions: Vec<Version>,
    /// Token for the next page; not followed.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Error document returned with non-success statuses.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub(crate) error: ErrorBody,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) code: u16,
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) status: String,
}

/// Access token issued by the metadata server.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub(crate) struct MetadataToken {
    pub(crate) access_token: String,
}
