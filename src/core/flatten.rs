//! Firewall rule flattening
//!
//! Expands one firewall resource into the cross product
//! identifiers × CIDR blocks × protocol names, one [`AtomicFirewallRule`]
//! per combination. Ports are not a dimension of the product: each record
//! carries the whole expanded [`PortSet`](crate::core::ports::PortSet) of the
//! entry its protocol came from.
//!
//! Parsing ([`FirewallResource::parse`]) does all validation up front. The
//! [`Records`] iterator then walks the product lazily, so a resource with
//! thousands of identifiers and ranges never materializes intermediate lists.
//!
//! # Example
//!
//! ```
//! use fwflat::core::firewall::{Action, Direction};
//! use fwflat::core::flatten::flatten;
//!
//! let rules = flatten(r#"{
//!     "allowed": [{"IPProtocol": ["tcp", "udp"], "ports": ["1", "50051"]}],
//!     "direction": "INGRESS",
//!     "disabled": false,
//!     "sourceRanges": ["10.128.0.0/9"],
//!     "targetTags": ["grpc-server"]
//! }"#).unwrap();
//!
//! assert_eq!(rules.len(), 2);
//! assert_eq!(rules[0].protocol, "tcp");
//! assert_eq!(rules[1].protocol, "udp");
//! assert!(rules.iter().all(|r| r.action == Action::Allowed));
//! assert!(rules.iter().all(|r| r.direction == Direction::Ingress));
//! assert!(rules.iter().all(|r| r.ports.iter().eq([1, 50051])));
//! ```

use crate::config::FlattenOptions;
use crate::core::error::Result;
use crate::core::firewall::AtomicFirewallRule;
use crate::core::resource::FirewallResource;
use std::iter::FusedIterator;

/// Flattens resource JSON with default options.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`](crate::Error::MalformedInput) or
/// [`Error::InvalidPortSpec`](crate::Error::InvalidPortSpec) describing the
/// first problem found. No partial result is returned.
pub fn flatten(resource_json: &str) -> Result<Vec<AtomicFirewallRule>> {
    flatten_with(resource_json, &FlattenOptions::default())
}

/// Flattens resource JSON with explicit options.
pub fn flatten_with(
    resource_json: &str,
    options: &FlattenOptions,
) -> Result<Vec<AtomicFirewallRule>> {
    let resource = FirewallResource::parse(resource_json, options)?;
    Ok(resource.records().collect())
}

/// Flattens an already-parsed JSON value.
pub fn flatten_value(
    value: serde_json::Value,
    options: &FlattenOptions,
) -> Result<Vec<AtomicFirewallRule>> {
    let resource = FirewallResource::from_value(value, options)?;
    Ok(resource.records().collect())
}

impl FirewallResource {
    /// Lazily iterates the flattened records.
    ///
    /// Each call starts a fresh pass, so the sequence can be walked any
    /// number of times.
    pub fn records(&self) -> Records<'_> {
        Records {
            resource: self,
            identifier: 0,
            range: 0,
            entry: 0,
            protocol: 0,
            remaining: self.record_count(),
        }
    }
}

impl<'a> IntoIterator for &'a FirewallResource {
    type Item = AtomicFirewallRule;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.records()
    }
}

/// Iterator over the cross product of a parsed resource
///
/// Order: identifier, then CIDR block, then permission entry, then protocol
/// name. The order is deterministic but carries no meaning.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    resource: &'a FirewallResource,
    identifier: usize,
    range: usize,
    entry: usize,
    protocol: usize,
    remaining: usize,
}

impl Records<'_> {
    /// Moves the cursor forward past entries that name no protocols.
    ///
    /// Only called while `remaining > 0`, so every dimension is non-empty
    /// and a valid position exists ahead.
    fn settle(&mut self) {
        let entries = self.resource.permissions.entries();
        while self.protocol >= entries[self.entry].protocols.len() {
            self.protocol = 0;
            self.entry += 1;
            if self.entry == entries.len() {
                self.entry = 0;
                self.range += 1;
                if self.range == self.resource.ranges.len() {
                    self.range = 0;
                    self.identifier += 1;
                }
            }
        }
    }
}

impl Iterator for Records<'_> {
    type Item = AtomicFirewallRule;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.settle();

        let resource = self.resource;
        let action = resource.permissions.action()?;
        let target_kind = resource.targets.kind()?;
        let identifier = &resource.targets.identifiers()[self.identifier];
        let cidr = &resource.ranges[self.range];
        let entry = &resource.permissions.entries()[self.entry];
        let protocol = &entry.protocols[self.protocol];

        self.protocol += 1;
        self.remaining -= 1;

        Some(AtomicFirewallRule {
            creation_timestamp: resource.creation_timestamp.clone(),
            priority: resource.priority,
            ip_address: cidr.address.clone(),
            ip_prefix_length: cidr.prefix_length.clone(),
            identifier: identifier.clone(),
            target_kind,
            action,
            protocol: protocol.clone(),
            ports: entry.ports.clone(),
            direction: resource.direction,
            disabled: resource.disabled,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Records<'_> {}

impl FusedIterator for Records<'_> {}
