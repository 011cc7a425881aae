
use super::policy::VersionPolicy;
use super::status::{CurrencyStatus, StatusLabels};
use crate::models::{JobLog, SoftwareFields};

pub const RETIREMENT_NOTE_PREFIX: &str = "Retirement Reason: ";
/// Substring that marks notes written by a retirement classification
pub const RETIREMENT_NOTE_MARKER: &str = "Retirement";

/// Outcome of evaluating one device against its version policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyReport {
    pub current_version: Option<String>,
    pub software_version_target: String,
    pub software_currency_status: CurrencyStatus,
    pub software_currency_notes: String,
    pub update_data: bool,
}

/// Classify a device's software version.
///
/// `fields` is the device's currently stored custom field data. The policy
/// entry for `role` is used, falling back to the default role; `None` means no
/// usable entry exists and nothing should be written.
pub fn sw_currency_check(
    fields: &SoftwareFields,
    policy: &VersionPolicy,
    role: &str,
    labels: &StatusLabels,
    log: &mut JobLog,
) -> Option<CurrencyReport> {
    let Some(versions) = policy.role_or_default(role).map(|e| &e.versions) else {
        log.log("No valid role data found, skipping check");
        return None;
    };
    let Some(target_version) = versions.target_version() else {
        log.log("No valid role data found, skipping check");
        return None;
    };

    let sw_version = fields.software_version.as_deref();
    let mut status = CurrencyStatus::UpgradeRequired;
    let mut notes = String::new();

    // Order matters: retired wins over accepted, accepted over target.
    if let Some(reason) = sw_version.and_then(|v| versions.retired_versions.get(v)) {
        status = CurrencyStatus::UpgradeRequiredRetired;
        notes = format!("{}{}", RETIREMENT_NOTE_PREFIX, reason);
    } else if sw_version.is_some_and(|v| versions.accepted_active_versions.iter().any(|a| a == v)) {
        status = CurrencyStatus::AcceptedActive;
    } else if sw_version.is_some_and(|v| versions.target_active_version.iter().any(|t| t == v)) {
        status = CurrencyStatus::TargetActive;
    }

    let stored_status = fields
        .software_currency_status
        .as_deref()
        .and_then(|s| labels.parse(s));
    let update_data = stored_status != Some(status)
        || fields.software_version_target.as_deref() != Some(target_version);

    Some(CurrencyReport {
        current_version: fields.software_version.clone(),
        software_version_target: target_version.to_string(),
        software_currency_status: status,
        software_currency_notes: notes,
        update_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy() -> VersionPolicy {
        VersionPolicy::from_value(&json!([
            {
                "role": "default",
                "versions": {
                    "target_active_version": ["17.9"],
                    "accepted_active_versions": ["17.6"],
                    "retired_versions": {"15.1": "EoL"}
                }
            },
            {
                "role": "core",
                "versions": {
                    "target_active_version": ["17.12"],
                    "accepted_active_versions": ["17.9", "15.1"],
                    "retired_versions": {"15.1": "Security advisory"}
                }
            }
        ]))
        .unwrap()
    }

    fn fields(version: Option<&str>, status: Option<&str>, target: Option<&str>) -> SoftwareFields {
        SoftwareFields {
            software_version: version.map(String::from),
            software_currency_status: status.map(String::from),
            software_version_target: target.map(String::from),
            software_currency_notes: None,
        }
    }

    fn check(f: &SoftwareFields, role: &str) -> CurrencyReport {
        let mut log = JobLog::new();
        sw_currency_check(f, &policy(), role, &StatusLabels::default(), &mut log).unwrap()
    }

    #[test]
    fn test_retired_version_requires_upgrade() {
        let report = check(&fields(Some("15.1"), Some("ACCEPTED_ACTIVE"), Some("17.9")), "default");
        assert_eq!(report.software_currency_status, CurrencyStatus::UpgradeRequiredRetired);
        assert_eq!(report.software_currency_notes, "Retirement Reason: EoL");
        assert_eq!(report.software_version_target, "17.9");
        assert!(report.update_data);
    }

    #[test]
    fn test_retired_wins_over_accepted() {
        let report = check(&fields(Some("15.1"), None, None), "core");
        assert_eq!(report.software_currency_status, CurrencyStatus::UpgradeRequiredRetired);
        assert_eq!(report.software_currency_notes, "Retirement Reason: Security advisory");
    }

    #[test]
    fn test_accepted_wins_over_target() {
        let p = VersionPolicy::from_value(&json!([{
            "role": "default",
            "versions": {
                "target_active_version": ["17.9"],
                "accepted_active_versions": ["17.9"],
                "retired_versions": {}
            }
        }]))
        .unwrap();
        let mut log = JobLog::new();
        let report = sw_currency_check(
            &fields(Some("17.9"), None, None),
            &p,
            "default",
            &StatusLabels::default(),
            &mut log,
        )
        .unwrap();
        assert_eq!(report.software_currency_status, CurrencyStatus::AcceptedActive);
    }

    #[test]
    fn test_target_version_is_target_active() {
        let report = check(&fields(Some("17.9"), None, None), "default");
        assert_eq!(report.software_currency_status, CurrencyStatus::TargetActive);
        assert!(report.software_currency_notes.is_empty());
    }

    #[test]
    fn test_unknown_version_requires_upgrade() {
        let report = check(&fields(Some("16.3"), None, None), "default");
        assert_eq!(report.software_currency_status, CurrencyStatus::UpgradeRequired);
        let report = check(&fields(None, None, None), "default");
        assert_eq!(report.software_currency_status, CurrencyStatus::UpgradeRequired);
        assert_eq!(report.current_version, None);
    }

    #[test]
    fn test_no_update_when_already_current() {
        let report = check(&fields(Some("17.9"), Some("TARGET_ACTIVE"), Some("17.9")), "default");
        assert!(!report.update_data);
    }

    #[test]
    fn test_update_when_only_target_is_stale() {
        let report = check(&fields(Some("17.9"), Some("TARGET_ACTIVE"), Some("17.6")), "default");
        assert!(report.update_data);
    }

    #[test]
    fn test_role_specific_entry_is_preferred() {
        let report = check(&fields(Some("17.9"), None, None), "core");
        assert_eq!(report.software_currency_status, CurrencyStatus::AcceptedActive);
        assert_eq!(report.software_version_target, "17.12");
    }

    #[test]
    fn test_unknown_role_uses_default() {
        let report = check(&fields(Some("17.6"), None, None), "access");
        assert_eq!(report.software_currency_status, CurrencyStatus::AcceptedActive);
        assert_eq!(report.software_version_target, "17.9");
    }

    #[test]
    fn test_no_matching_entry_returns_none() {
        let p = VersionPolicy::from_value(&json!([{
            "role": "core",
            "versions": {
                "target_active_version": ["17.9"],
                "accepted_active_versions": [],
                "retired_versions": {}
            }
        }]))
        .unwrap();
        let mut log = JobLog::new();
        let report = sw_currency_check(
            &fields(Some("17.9"), None, None),
            &p,
            "access",
            &StatusLabels::default(),
            &mut log,
        );
        assert!(report.is_none());
        assert!(log.contains("No valid role data found, skipping check"));
    }

    #[test]
    fn test_comparison_uses_configured_labels() {
        let labels = StatusLabels {
            target_active: "Current".to_string(),
            ..Default::default()
        };
        let mut log = JobLog::new();
        let current = fields(Some("17.9"), Some("Current"), Some("17.9"));
        let report = sw_currency_check(&current, &policy(), "default", &labels, &mut log).unwrap();
        assert!(!report.update_data);

        // The symbolic name is not a stored label under this configuration
        let stale = fields(Some("17.9"), Some("TARGET_ACTIVE"), Some("17.9"));
        let report = sw_currency_check(&stale, &policy(), "default", &labels, &mut log).unwrap();
        assert!(report.update_data);
    }
}
