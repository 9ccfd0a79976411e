//! Flattening options and their persistence
//!
//! [`FlattenOptions`] holds the policy switches for the parts of the
//! resource format whose interpretation is a judgement call: how the
//! `disabled` field is read, and whether a missing action or target field is
//! an error. Every field has a serde default so partial option files work.

use crate::core::error::Result;
use crate::utils::get_config_dir;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// File name of the options file inside the config directory
pub const OPTIONS_FILE_NAME: &str = "options.json";

/// How the resource `disabled` field is interpreted
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum DisabledPolicy {
    /// Only boolean `false` or the string `"false"` mean enabled.
    /// Everything else, including an absent field, means disabled.
    #[default]
    #[strum(serialize = "literal")]
    Literal,
    /// An absent or null field means enabled, booleans are taken as-is,
    /// the string `"false"` (any case) means enabled, anything else disabled.
    #[strum(serialize = "lenient")]
    Lenient,
}

impl DisabledPolicy {
    /// Resolves the `disabled` flag from the raw field value
    pub fn resolve(self, value: Option<&serde_json::Value>) -> bool {
        use serde_json::Value;

        match self {
            DisabledPolicy::Literal => match value {
                Some(Value::Bool(false)) => false,
                Some(Value::String(s)) => s != "false",
                _ => true,
            },
            DisabledPolicy::Lenient => match value {
                None | Some(Value::Null) => false,
                Some(Value::Bool(disabled)) => *disabled,
                Some(Value::String(s)) => !s.eq_ignore_ascii_case("false"),
                Some(_) => true,
            },
        }
    }
}

/// What to do when a resource lacks a field that the cross product needs
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Produce no records and log a warning
    #[default]
    #[strum(serialize = "empty")]
    Empty,
    /// Fail with a malformed-input error
    #[strum(serialize = "reject")]
    Reject,
}

/// Options controlling how resources are flattened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenOptions {
    #[serde(default)]
    pub disabled_policy: DisabledPolicy,
    /// Applies when neither `allowed` nor `denied` is present
    #[serde(default)]
    pub missing_action: MissingFieldPolicy,
    /// Applies when neither `targetServiceAccounts` nor `targetTags` is present
    #[serde(default)]
    pub missing_targets: MissingFieldPolicy,
}

impl FlattenOptions {
    /// Options that reject resources missing an action or target field
    pub fn strict() -> Self {
        Self {
            missing_action: MissingFieldPolicy::Reject,
            missing_targets: MissingFieldPolicy::Reject,
            ..Self::default()
        }
    }

    pub fn with_disabled_policy(mut self, policy: DisabledPolicy) -> Self {
        self.disabled_policy = policy;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Loads options from `path`.
///
/// Unlike [`load_options_or_default`], a missing or unparseable file is an error.
pub fn load_options(path: &Path) -> Result<FlattenOptions> {
    let json = std::fs::read_to_string(path)?;
    FlattenOptions::from_json_str(&json)
}

/// Loads options from the user config directory, or returns defaults if the
/// file is absent or invalid.
pub fn load_options_or_default() -> FlattenOptions {
    get_config_dir()
        .map(|dir| dir.join(OPTIONS_FILE_NAME))
        .filter(|path| path.exists())
        .map_or_else(FlattenOptions::default, |path| {
            load_options(&path).unwrap_or_else(|e| {
                warn!("Ignoring options file {:?}: {}", path, e);
                FlattenOptions::default()
            })
        })
}
