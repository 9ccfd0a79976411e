//! Shared test utilities for core module tests
//!
//! Provides resource fixtures so tests don't each spell out the full JSON.
//! This module is only compiled in test mode.

use crate::core::firewall::{Action, AtomicFirewallRule, Direction, TargetKind};
use crate::core::ports::PortSet;
use serde_json::{Value, json};
use std::sync::Mutex;

/// Mutex for tests that change environment variables (e.g. `FWFLAT_CONFIG_DIR`).
///
/// # Example
///
/// ```ignore
/// let _guard = ENV_VAR_MUTEX.lock().unwrap();
/// unsafe {
///     std::env::set_var("FWFLAT_CONFIG_DIR", dir.path());
/// }
/// // ... test with custom env state ...
/// unsafe {
///     std::env::remove_var("FWFLAT_CONFIG_DIR");
/// }
/// ```
pub static ENV_VAR_MUTEX: Mutex<()> = Mutex::new(());

/// A real GCE firewall resource: one service account, one range, tcp/50051.
///
/// This is the canonical fixture; tweak a copy of it rather than writing
/// resources from scratch when only one field matters.
pub fn grpc_server_rule() -> Value {
    json!({
        "allowed": [{"IPProtocol": ["tcp"], "ports": ["50051"]}],
        "creationTimestamp": "2018-02-28T21:49:07.739-08:00",
        "description": "",
        "direction": "INGRESS",
        "disabled": false,
        "id": "1002375335368075964",
        "kind": "compute#firewall",
        "name": "forseti-server-allow-grpc-20180228211432",
        "network": "https://www.googleapis.com/compute/beta/projects/joe-project-p2/global/networks/default",
        "priority": 0,
        "selfLink": "https://www.googleapis.com/compute/beta/projects/joe-project-p2/global/firewalls/forseti-server-allow-grpc-20180228211432",
        "sourceRanges": ["10.128.0.0/9"],
        "targetServiceAccounts": ["forseti-gcp-server-1432@joe-project-p2.iam.gserviceaccount.com"]
    })
}

/// Ingress resource allowing `allowed` to the given service accounts from `ranges`.
pub fn resource_with(allowed: Value, identifiers: &[&str], ranges: &[&str]) -> Value {
    json!({
        "allowed": allowed,
        "direction": "INGRESS",
        "disabled": false,
        "priority": 1000,
        "sourceRanges": ranges,
        "targetServiceAccounts": identifiers
    })
}

/// The single record flattened from [`grpc_server_rule`].
pub fn sample_record() -> AtomicFirewallRule {
    AtomicFirewallRule {
        creation_timestamp: Some("2018-02-28T21:49:07.739-08:00".to_string()),
        priority: Some(0),
        ip_address: "10.128.0.0".to_string(),
        ip_prefix_length: "9".to_string(),
        identifier: "forseti-gcp-server-1432@joe-project-p2.iam.gserviceaccount.com".to_string(),
        target_kind: TargetKind::ServiceAccount,
        action: Action::Allowed,
        protocol: "tcp".to_string(),
        ports: PortSet::from_iter([50051u32]),
        direction: Direction::Ingress,
        disabled: false,
    }
}
