//! Core firewall flattening functionality
//!
//! This module contains the types and logic for turning one nested firewall
//! resource into atomic permission records. It provides:
//!
//! - [`resource`]: Typed input schema and validation
//! - [`flatten`]: Cross-product expansion into records
//! - [`ports`]: Port specification parsing and expansion
//! - [`firewall`]: The flattened record and its enums
//! - [`error`]: Error types for flattening

pub mod error;
pub mod firewall;
pub mod flatten;
pub mod ports;
pub mod resource;

#[cfg(test)]
pub mod test_helpers;
