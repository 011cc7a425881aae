//! Version policy blobs attached to device types, and the lint that guards them.
//!
//! A policy is a JSON array of role entries:
//!
//! ```json
//! [{"role": "default",
//!   "versions": {"target_active_version": ["17.9"],
//!                "accepted_active_versions": ["17.6"],
//!                "retired_versions": {"15.1": "EoL"}}}]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::JobLog;

pub const DEFAULT_ROLE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleVersions {
    pub target_active_version: Vec<String>,
    pub accepted_active_versions: Vec<String>,
    /// Retired version -> retirement reason
    pub retired_versions: BTreeMap<String, String>,
}

impl RoleVersions {
    pub fn target_version(&self) -> Option<&str> {
        self.target_active_version.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub role: String,
    pub versions: RoleVersions,
}

/// Decoded version policy for one device type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionPolicy(pub Vec<RoleEntry>);

impl VersionPolicy {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// First entry for `role`
    pub fn role(&self, role: &str) -> Option<&RoleEntry> {
        self.0.iter().find(|e| e.role == role)
    }

    /// Entry for `role`, falling back to the default role
    pub fn role_or_default(&self, role: &str) -> Option<&RoleEntry> {
        self.role(role).or_else(|| self.role(DEFAULT_ROLE))
    }
}

fn has_role(entries: &[Value], role: &str) -> bool {
    entries
        .iter()
        .any(|e| e.get("role").and_then(Value::as_str) == Some(role))
}

/// Shape check over a raw policy blob. Logs the reason for the first failure.
pub fn is_valid_version_data(data: &Value, log: &mut JobLog) -> bool {
    let Some(entries) = data.as_array() else {
        log.log("Version data is not a list of role entries");
        return false;
    };

    if !has_role(entries, DEFAULT_ROLE) {
        log.log("Version data missing default role");
        return false;
    }

    for (idx, entry) in entries.iter().enumerate() {
        let Some(role) = entry.get("role").and_then(Value::as_str) else {
            log.log(format!("Role entry {}: role is not a string", idx));
            return false;
        };
        let versions = entry.get("versions");
        let field = |name: &str| versions.and_then(|v| v.get(name));

        if !field("accepted_active_versions").is_some_and(Value::is_array) {
            log.log(format!("Role '{}': accepted_active_versions is not a list", role));
            return false;
        }
        if !field("retired_versions").is_some_and(Value::is_object) {
            log.log(format!("Role '{}': retired_versions is not a mapping", role));
            return false;
        }
        match field("target_active_version").and_then(Value::as_array) {
            Some(target) if target.len() == 1 => {}
            _ => {
                log.log(format!(
                    "Role '{}': target_active_version must be a single-element list",
                    role
                ));
                return false;
            }
        }
    }

    true
}

/// Lint a raw policy blob and decode it when it passes.
///
/// Returns `None` when the blob fails the shape check or carries values that
/// are not strings where versions and reasons are expected.
pub fn lint_software_version_data(data: &Value, log: &mut JobLog) -> Option<VersionPolicy> {
    let decoded = if is_valid_version_data(data, log) {
        match VersionPolicy::from_value(data) {
            Ok(policy) => Some(policy),
            Err(e) => {
                log.log(format!("Version data could not be decoded: {}", e));
                None
            }
        }
    } else {
        None
    };

    if decoded.is_some() {
        log.log("Version data passed lint check");
    } else {
        log.log("Version data failed lint check");
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(role: &str, target: Value) -> Value {
        json!({
            "role": role,
            "versions": {
                "target_active_version": target,
                "accepted_active_versions": ["17.6"],
                "retired_versions": {"15.1": "EoL"}
            }
        })
    }

    #[test]
    fn test_valid_policy_passes() {
        let mut log = JobLog::new();
        let data = json!([entry("default", json!(["17.9"])), entry("access", json!(["17.12"]))]);
        let policy = lint_software_version_data(&data, &mut log).unwrap();
        assert_eq!(policy.0.len(), 2);
        assert!(log.contains("Version data passed lint check"));
    }

    #[test]
    fn test_missing_default_role_fails() {
        let mut log = JobLog::new();
        let data = json!([entry("access", json!(["17.9"])), entry("core", json!(["17.9"]))]);
        assert!(!is_valid_version_data(&data, &mut log));
        assert!(log.contains("Version data missing default role"));

        let mut log = JobLog::new();
        assert!(lint_software_version_data(&data, &mut log).is_none());
        assert!(log.contains("Version data failed lint check"));
    }

    #[test]
    fn test_target_must_have_exactly_one_element() {
        let mut log = JobLog::new();
        assert!(!is_valid_version_data(&json!([entry("default", json!([]))]), &mut log));
        assert!(!is_valid_version_data(
            &json!([entry("default", json!(["17.9", "17.12"]))]),
            &mut log
        ));
        assert!(!is_valid_version_data(&json!([entry("default", json!("17.9"))]), &mut log));
    }

    #[test]
    fn test_wrong_container_types_fail() {
        let mut log = JobLog::new();
        let accepted_not_list = json!([{
            "role": "default",
            "versions": {
                "target_active_version": ["17.9"],
                "accepted_active_versions": "17.6",
                "retired_versions": {}
            }
        }]);
        assert!(!is_valid_version_data(&accepted_not_list, &mut log));

        let retired_not_map = json!([{
            "role": "default",
            "versions": {
                "target_active_version": ["17.9"],
                "accepted_active_versions": [],
                "retired_versions": ["15.1"]
            }
        }]);
        assert!(!is_valid_version_data(&retired_not_map, &mut log));

        let no_versions = json!([{"role": "default"}]);
        assert!(!is_valid_version_data(&no_versions, &mut log));
    }

    #[test]
    fn test_non_string_role_fails_even_with_default_present() {
        let mut log = JobLog::new();
        let data = json!([entry("default", json!(["17.9"])), {"role": 7, "versions": {}}]);
        assert!(!is_valid_version_data(&data, &mut log));
    }

    #[test]
    fn test_not_a_list_fails() {
        let mut log = JobLog::new();
        assert!(!is_valid_version_data(&json!({"role": "default"}), &mut log));
    }

    #[test]
    fn test_non_string_versions_fail_decode() {
        let mut log = JobLog::new();
        let data = json!([entry("default", json!([17.9]))]);
        assert!(is_valid_version_data(&data, &mut log));
        assert!(lint_software_version_data(&data, &mut log).is_none());
        assert!(log.contains("Version data failed lint check"));
    }

    #[test]
    fn test_role_lookup_falls_back_to_default() {
        let data = json!([entry("default", json!(["17.9"])), entry("core", json!(["17.12"]))]);
        let policy = VersionPolicy::from_value(&data).unwrap();
        assert_eq!(
            policy.role_or_default("core").and_then(|e| e.versions.target_version()),
            Some("17.12")
        );
        assert_eq!(
            policy.role_or_default("access").and_then(|e| e.versions.target_version()),
            Some("17.9")
        );
    }
}
