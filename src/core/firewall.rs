//! Flattened firewall rule data structures
//!
//! This module defines [`AtomicFirewallRule`], the single-valued record that
//! the flattener emits, and the small enums it is built from.
//!
//! # Record Structure
//!
//! An [`AtomicFirewallRule`] carries exactly one of each:
//! - Target identifier (service account or network tag, see [`TargetKind`])
//! - CIDR block, split into address and prefix length
//! - Protocol name (opaque string, e.g. `"tcp"`, `"icmp"`, `"all"`)
//! - Port set ([`PortSet`], empty meaning all ports)
//!
//! plus the rule-wide [`Action`], [`Direction`], priority, creation timestamp
//! and disabled flag copied from the source resource.
//!
//! # Example
//!
//! ```
//! use fwflat::core::firewall::{Action, AtomicFirewallRule, Direction, TargetKind};
//! use fwflat::core::ports::PortSet;
//!
//! let rule = AtomicFirewallRule {
//!     creation_timestamp: None,
//!     priority: Some(1000),
//!     ip_address: "0.0.0.0".to_string(),
//!     ip_prefix_length: "0".to_string(),
//!     identifier: "web".to_string(),
//!     target_kind: TargetKind::Tag,
//!     action: Action::Allowed,
//!     protocol: "tcp".to_string(),
//!     ports: "22".parse().unwrap(),
//!     direction: Direction::Ingress,
//!     disabled: false,
//! };
//!
//! assert_eq!(rule.cidr(), "0.0.0.0/0");
//! assert!(rule.ports.covers(22));
//! assert!(!rule.applies_to_all_ports());
//! ```

use crate::core::error::Result;
use crate::core::ports::PortSet;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

/// Which permission list a record was derived from
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Matched traffic is let through (`"allowed"` list)
    #[strum(serialize = "allowed")]
    Allowed,
    /// Matched traffic is blocked (`"denied"` list)
    #[strum(serialize = "denied")]
    Denied,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Allowed => "allowed",
            Action::Denied => "denied",
        }
    }
}

/// Traffic direction a rule governs
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Inbound traffic; addresses come from `sourceRanges`
    #[strum(serialize = "ingress")]
    Ingress,
    /// Outbound traffic; addresses come from `destinationRanges`
    #[strum(serialize = "egress")]
    Egress,
}

impl Direction {
    /// Interprets a resource `direction` value.
    ///
    /// Anything that is not `INGRESS` (compared case-insensitively) is egress.
    pub fn from_resource(value: &str) -> Self {
        if value.eq_ignore_ascii_case("INGRESS") {
            Direction::Ingress
        } else {
            Direction::Egress
        }
    }

    /// Resource field holding the authoritative address ranges
    pub const fn ranges_field(self) -> &'static str {
        match self {
            Direction::Ingress => "sourceRanges",
            Direction::Egress => "destinationRanges",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Ingress => "ingress",
            Direction::Egress => "egress",
        }
    }
}

/// Which identifier field a record's identifier came from
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// `targetServiceAccounts`
    #[strum(serialize = "service_account")]
    ServiceAccount,
    /// `targetTags`
    #[strum(serialize = "tag")]
    Tag,
}

impl TargetKind {
    /// Resource field the identifiers are read from
    pub const fn field(self) -> &'static str {
        match self {
            TargetKind::ServiceAccount => "targetServiceAccounts",
            TargetKind::Tag => "targetTags",
        }
    }
}

/// One (identifier, CIDR, protocol, port set) permission
///
/// Immutable value object; equality is field-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtomicFirewallRule {
    /// Copied verbatim from `creationTimestamp`
    #[serde(default)]
    pub creation_timestamp: Option<String>,
    /// Lower value means higher precedence; copied verbatim
    #[serde(default)]
    pub priority: Option<i64>,
    pub ip_address: String,
    pub ip_prefix_length: String,
    pub identifier: String,
    pub target_kind: TargetKind,
    pub action: Action,
    pub protocol: String,
    /// Empty means all ports
    #[serde(default)]
    pub ports: PortSet,
    pub direction: Direction,
    pub disabled: bool,
}

impl AtomicFirewallRule {
    /// The CIDR block as `address/prefix`
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.ip_address, self.ip_prefix_length)
    }

    /// Parses the CIDR block.
    ///
    /// Flattening never validates addresses, so this can fail for records
    /// built from unusual input.
    pub fn network(&self) -> std::result::Result<IpNetwork, ipnetwork::IpNetworkError> {
        self.cidr().parse()
    }

    /// Parses `creation_timestamp` as RFC 3339, if present and well-formed
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        self.creation_timestamp
            .as_deref()
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
    }

    /// Returns `true` when the source entry listed no ports
    pub fn applies_to_all_ports(&self) -> bool {
        self.ports.is_empty()
    }
}

/// Serializes records into a JSON array for downstream storage
pub fn to_json(rules: &[AtomicFirewallRule]) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(rules)?)
}
