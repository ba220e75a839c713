//! Wiring settings.
//!
//! The only knob today decides what happens when two built instances
//! provide the same capability.

use std::fmt;

use serde::Deserialize;

/// What to do when a capability is claimed by a second provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityPolicy {
    /// The later commit replaces the earlier binding. Logged as a warning.
    #[default]
    Override,

    /// The build fails with [`CapabilityConflict`](crate::error::WireboxError::CapabilityConflict).
    Reject,
}

impl fmt::Display for CapabilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityPolicy::Override => write!(f, "override"),
            CapabilityPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Settings for a [`Container`](crate::container::Container).
///
/// Deserializable, so it can live in the application's config file:
///
/// ```
/// use wirebox_container::settings::{CapabilityPolicy, WiringSettings};
///
/// let settings = WiringSettings::default();
/// assert_eq!(settings.capability_conflicts, CapabilityPolicy::Override);
///
/// let strict = WiringSettings::default().capability_conflicts(CapabilityPolicy::Reject);
/// assert_eq!(strict.capability_conflicts, CapabilityPolicy::Reject);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WiringSettings {
    pub capability_conflicts: CapabilityPolicy,
}

impl WiringSettings {
    pub fn capability_conflicts(mut self, policy: CapabilityPolicy) -> Self {
        self.capability_conflicts = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_overrides() {
        assert_eq!(WiringSettings::default().capability_conflicts, CapabilityPolicy::Override);
    }

    #[test]
    fn deserialize_reject() {
        let settings: WiringSettings =
            serde_json::from_str(r#"{ "capability_conflicts": "reject" }"#).unwrap();
        assert_eq!(settings.capability_conflicts, CapabilityPolicy::Reject);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let settings: WiringSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.capability_conflicts, CapabilityPolicy::Override);
    }

    #[test]
    fn unknown_policy_fails() {
        let json = r#"{ "capability_conflicts": "merge" }"#;
        let result = serde_json::from_str::<WiringSettings>(json);
        assert!(result.is_err());
    }

    #[test]
    fn policy_display() {
        assert_eq!(CapabilityPolicy::Override.to_string(), "override");
        assert_eq!(CapabilityPolicy::Reject.to_string(), "reject");
    }
}
