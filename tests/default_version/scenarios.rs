//! BDD scenarios for default version lookup.

use rstest_bdd_macros::scenario;

use super::test_helpers::{DefaultVersionContext, default_version_context};

#[scenario(
    path = "tests/features/default_version.feature",
    name = "A version holding all traffic is the default"
)]
fn scenario_full_allocation(default_version_context: DefaultVersionContext) {
    let _ = default_version_context;
}

#[scenario(
    path = "tests/features/default_version.feature",
    name = "The largest allocation wins"
)]
fn scenario_largest_allocation(default_version_context: DefaultVersionContext) {
    let _ = default_version_context;
}

#[scenario(
    path = "tests/features/default_version.feature",
    name = "Equal allocations go to the smallest version id"
)]
fn scenario_tie_break(default_version_context: DefaultVersionContext) {
    let _ = default_version_context;
}

#[scenario(
    path = "tests/features/default_version.feature",
    name = "A module without allocations has no default version"
)]
fn scenario_no_allocations(default_version_context: DefaultVersionContext) {
    let _ = default_version_context;
}

#[scenario(
    path = "tests/features/default_version.feature",
    name = "An unknown module is reported by name"
)]
fn scenario_unknown_module(default_version_context: DefaultVersionContext) {
    let _ = default_version_context;
}
