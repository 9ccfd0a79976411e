//! fwflat - Firewall rule flattener
//!
//! Converts a nested cloud firewall resource (as returned by a provider's
//! resource API) into a flat list of [`AtomicFirewallRule`]s: one record per
//! (identifier, CIDR block, protocol) with the expanded port set attached.
//! Policy scanners can then answer questions like "is port 22 open to
//! 0.0.0.0/0 for any identifier" with plain set operations.
//!
//! # Architecture
//!
//! - [`core`] - Resource schema, flattening, port expansion, record types
//! - [`validators`] - Token validation (port numbers, CIDR splitting)
//! - [`config`] - Flattening options and their persistence
//! - [`utils`] - Utility functions (XDG directories)
//!
//! # Example
//!
//! ```
//! let rules = fwflat::flatten(r#"{
//!     "allowed": [{"IPProtocol": ["tcp"], "ports": ["22", "8000-8010"]}],
//!     "direction": "INGRESS",
//!     "disabled": false,
//!     "sourceRanges": ["0.0.0.0/0"],
//!     "targetTags": ["bastion"]
//! }"#).unwrap();
//!
//! assert_eq!(rules.len(), 1);
//! assert!(rules[0].ports.covers(22));
//! assert_eq!(rules[0].ports.len(), 12);
//! ```
//!
//! Flattening is a pure function of its input. Nothing is logged beyond
//! `tracing` events, and no subscriber is installed.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod core;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use config::{DisabledPolicy, FlattenOptions, MissingFieldPolicy};
pub use crate::core::error::{Error, PortSpecError, Result};
pub use crate::core::firewall::{Action, AtomicFirewallRule, Direction, TargetKind};
pub use crate::core::flatten::{flatten, flatten_value, flatten_with};
pub use crate::core::ports::{PortRange, PortSet, expand_ports};
pub use crate::core::resource::FirewallResource;
