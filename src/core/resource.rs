//! Typed firewall resource schema
//!
//! A cloud firewall resource is deserialized in two steps. First into
//! [`RawFirewallResource`], a serde mirror of the JSON where every field is
//! optional. Then [`FirewallResource::from_raw`] resolves the key-presence
//! rules into sum types ([`Permissions`], [`Targets`]), splits CIDR blocks and
//! expands ports. Every check happens here, so iterating the records of a
//! parsed resource cannot fail.
//!
//! Only fields that feed the records are type-checked. `name` and the range
//! list the direction does not select stay as raw JSON.

use crate::config::{FlattenOptions, MissingFieldPolicy};
use crate::core::error::{Error, Result};
use crate::core::firewall::{Action, Direction, TargetKind};
use crate::core::ports::{PortSet, expand_ports};
use crate::validators::split_cidr;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// `IPProtocol` is a string in the GCE API but a list in some exports
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProtocolField {
    One(String),
    Many(Vec<String>),
}

impl ProtocolField {
    fn into_vec(self) -> Vec<String> {
        match self {
            ProtocolField::One(protocol) => vec![protocol],
            ProtocolField::Many(protocols) => protocols,
        }
    }
}

/// One entry of an `allowed` or `denied` list, as found in the JSON
#[derive(Debug, Clone, Deserialize)]
pub struct RawPermission {
    #[serde(rename = "IPProtocol", default)]
    pub ip_protocol: Option<ProtocolField>,
    #[serde(default)]
    pub ports: Option<Vec<String>>,
}

/// Serde mirror of a firewall resource; unknown fields are ignored
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFirewallResource {
    /// Diagnostics only, so any JSON type is accepted
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub allowed: Option<Vec<RawPermission>>,
    #[serde(default)]
    pub denied: Option<Vec<RawPermission>>,
    #[serde(default)]
    pub creation_timestamp: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub direction: Option<String>,
    /// Kept untyped: booleans and strings are both seen in the wild
    #[serde(default)]
    pub disabled: Option<Value>,
    /// Deserialized only when the direction selects it
    #[serde(default)]
    pub source_ranges: Option<Value>,
    #[serde(default)]
    pub destination_ranges: Option<Value>,
    #[serde(default)]
    pub target_service_accounts: Option<Vec<String>>,
    #[serde(default)]
    pub target_tags: Option<Vec<String>>,
}

/// A permission entry with its ports already expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    pub protocols: Vec<String>,
    pub ports: PortSet,
}

impl PermissionEntry {
    fn from_raw(raw: RawPermission) -> Result<Self> {
        let ports = expand_ports(raw.ports.as_deref().unwrap_or_default())?;
        Ok(Self {
            protocols: raw.ip_protocol.map(ProtocolField::into_vec).unwrap_or_default(),
            ports,
        })
    }
}

/// The permission list and the action it implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permissions {
    Allowed(Vec<PermissionEntry>),
    Denied(Vec<PermissionEntry>),
    /// Neither `allowed` nor `denied` was present
    Missing,
}

impl Permissions {
    pub fn action(&self) -> Option<Action> {
        match self {
            Permissions::Allowed(_) => Some(Action::Allowed),
            Permissions::Denied(_) => Some(Action::Denied),
            Permissions::Missing => None,
        }
    }

    pub fn entries(&self) -> &[PermissionEntry] {
        match self {
            Permissions::Allowed(entries) | Permissions::Denied(entries) => entries,
            Permissions::Missing => &[],
        }
    }

    /// Total number of protocol names across all entries
    pub fn protocol_count(&self) -> usize {
        self.entries().iter().map(|e| e.protocols.len()).sum()
    }
}

/// The identifiers a rule targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    ServiceAccounts(Vec<String>),
    Tags(Vec<String>),
    /// Neither `targetServiceAccounts` nor `targetTags` was present
    Missing,
}

impl Targets {
    pub fn kind(&self) -> Option<TargetKind> {
        match self {
            Targets::ServiceAccounts(_) => Some(TargetKind::ServiceAccount),
            Targets::Tags(_) => Some(TargetKind::Tag),
            Targets::Missing => None,
        }
    }

    pub fn identifiers(&self) -> &[String] {
        match self {
            Targets::ServiceAccounts(ids) | Targets::Tags(ids) => ids,
            Targets::Missing => &[],
        }
    }
}

/// One half-split CIDR block from the selected range list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidrBlock {
    pub address: String,
    pub prefix_length: String,
}

impl CidrBlock {
    pub fn parse(cidr: &str) -> Result<Self> {
        let (address, prefix_length) = split_cidr(cidr)?;
        Ok(Self {
            address: address.to_string(),
            prefix_length: prefix_length.to_string(),
        })
    }
}

/// A validated firewall resource, ready to be flattened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallResource {
    /// Resource name, used only in diagnostics
    pub name: Option<String>,
    pub permissions: Permissions,
    pub targets: Targets,
    pub direction: Direction,
    /// Ranges from `sourceRanges` (ingress) or `destinationRanges` (egress)
    pub ranges: Vec<CidrBlock>,
    pub creation_timestamp: Option<String>,
    pub priority: Option<i64>,
    pub disabled: bool,
}

impl FirewallResource {
    /// Parses resource JSON text.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedInput`] for invalid JSON or shape problems,
    /// [`Error::InvalidPortSpec`] for bad port tokens.
    pub fn parse(json: &str, options: &FlattenOptions) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::malformed("resource", format!("invalid JSON: {e}")))?;
        Self::from_value(value, options)
    }

    /// Validates an already-parsed JSON value.
    pub fn from_value(value: Value, options: &FlattenOptions) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::malformed("resource", "expected a JSON object"));
        }
        let raw: RawFirewallResource = serde_json::from_value(value)
            .map_err(|e| Error::malformed("resource", e.to_string()))?;
        Self::from_raw(raw, options)
    }

    /// Resolves a deserialized resource.
    ///
    /// `allowed` takes precedence over `denied` and `targetServiceAccounts`
    /// over `targetTags`; the losing key is ignored with a warning.
    pub fn from_raw(raw: RawFirewallResource, options: &FlattenOptions) -> Result<Self> {
        let name = raw.name.as_ref().and_then(display_name);

        let permissions = match (raw.allowed, raw.denied) {
            (Some(entries), denied) => {
                if denied.is_some() {
                    warn!(
                        "Firewall resource {:?} has both allowed and denied, ignoring denied",
                        name
                    );
                }
                Permissions::Allowed(convert_entries(entries)?)
            }
            (None, Some(entries)) => Permissions::Denied(convert_entries(entries)?),
            (None, None) => {
                if options.missing_action == MissingFieldPolicy::Reject {
                    return Err(Error::malformed(
                        "allowed",
                        "resource has neither \"allowed\" nor \"denied\"",
                    ));
                }
                Permissions::Missing
            }
        };

        let targets = match (raw.target_service_accounts, raw.target_tags) {
            (Some(ids), tags) => {
                if tags.is_some() {
                    warn!(
                        "Firewall resource {:?} has both service accounts and tags, ignoring tags",
                        name
                    );
                }
                Targets::ServiceAccounts(ids)
            }
            (None, Some(ids)) => Targets::Tags(ids),
            (None, None) => {
                if options.missing_targets == MissingFieldPolicy::Reject {
                    return Err(Error::malformed(
                        "targetServiceAccounts",
                        "resource has neither \"targetServiceAccounts\" nor \"targetTags\"",
                    ));
                }
                Targets::Missing
            }
        };

        let direction = raw
            .direction
            .as_deref()
            .map(Direction::from_resource)
            .ok_or_else(|| Error::malformed("direction", "field is mandatory"))?;

        let ranges_raw = match direction {
            Direction::Ingress => raw.source_ranges,
            Direction::Egress => raw.destination_ranges,
        };
        let ranges = match ranges_raw {
            Some(value) => {
                let cidrs: Vec<String> = serde_json::from_value(value)
                    .map_err(|e| Error::malformed(direction.ranges_field(), e.to_string()))?;
                cidrs
                    .iter()
                    .map(|cidr| CidrBlock::parse(cidr))
                    .collect::<Result<Vec<_>>>()?
            }
            None => {
                debug!(
                    "Firewall resource {:?} has no {}, no records",
                    name,
                    direction.ranges_field()
                );
                Vec::new()
            }
        };

        if permissions == Permissions::Missing {
            warn!(
                "Firewall resource {:?} has no allowed/denied list, producing no records",
                name
            );
        }
        if targets == Targets::Missing {
            warn!(
                "Firewall resource {:?} has no target identifiers, producing no records",
                name
            );
        }

        let resource = Self {
            disabled: options.disabled_policy.resolve(raw.disabled.as_ref()),
            name,
            permissions,
            targets,
            direction,
            ranges,
            creation_timestamp: raw.creation_timestamp,
            priority: raw.priority,
        };

        debug!(
            resource = ?resource.name,
            action = ?resource.permissions.action(),
            direction = %resource.direction,
            identifiers = resource.targets.identifiers().len(),
            ranges = resource.ranges.len(),
            records = resource.record_count(),
            "Parsed firewall resource"
        );

        Ok(resource)
    }

    /// Number of records flattening will produce: identifiers × ranges × protocols
    pub fn record_count(&self) -> usize {
        self.targets.identifiers().len() * self.ranges.len() * self.permissions.protocol_count()
    }
}

fn display_name(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(name) => Some(name.clone()),
        other => Some(other.to_string()),
    }
}

fn convert_entries(entries: Vec<RawPermission>) -> Result<Vec<PermissionEntry>> {
    entries.into_iter().map(PermissionEntry::from_raw).collect()
}
