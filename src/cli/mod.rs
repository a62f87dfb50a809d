//! Command-line interface definitions for the `modctl` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI for the `modctl` binary.
#[derive(Debug, Parser)]
#[command(
    name = "modctl",
    about = "Inspect and control the modules and versions of an App Engine application",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// Upper bound, in seconds, on the outbound request.
    #[arg(long, global = true, value_name = "SECONDS")]
    pub(crate) deadline: Option<f64>,
    /// Ticket identifying the calling instance to the legacy service bridge.
    #[arg(long, global = true, value_name = "TICKET")]
    pub(crate) api_ticket: Option<String>,
    /// Operation to perform.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Operations exposed by `modctl`.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List the modules of the application.
    #[command(name = "list")]
    List,
    /// List the versions of a module.
    #[command(name = "versions")]
    Versions(ModuleArgs),
    /// Print the version receiving a module's default traffic.
    #[command(name = "default-version")]
    DefaultVersion(ModuleArgs),
    /// Print the instance count of a manually scaled version.
    #[command(name = "instances")]
    Instances(TargetArgs),
    /// Set the instance count of a manually scaled version.
    #[command(name = "set-instances")]
    SetInstances(SetInstancesArgs),
    /// Start a version.
    #[command(name = "start")]
    Start(TargetArgs),
    /// Stop a version.
    #[command(name = "stop")]
    Stop(TargetArgs),
}

/// Module selection. An empty value means the current module.
#[derive(Debug, Args)]
pub(crate) struct ModuleArgs {
    /// Module (service) name.
    #[arg(long, default_value = "")]
    pub(crate) module: String,
}

/// Module and version selection. Empty values mean the current ones.
#[derive(Debug, Args)]
pub(crate) struct TargetArgs {
    /// Module (service) name.
    #[arg(long, default_value = "")]
    pub(crate) module: String,
    /// Version identifier.
    #[arg(long, default_value = "")]
    pub(crate) version: String,
}

/// Arguments for `modctl set-instances`.
#[derive(Debug, Args)]
pub(crate) struct SetInstancesArgs {
    /// Version to scale.
    #[command(flatten)]
    pub(crate) target: TargetArgs,
    /// Number of instances to run.
    #[arg(value_name = "COUNT")]
    pub(crate) instances: i64,
}
