use anyhow::Result;

use crate::currency::{
    lint_software_version_data, sw_currency_check, CurrencyStatus, RETIREMENT_NOTE_MARKER,
};
use crate::db::{Store, ValidationError};
use crate::models::*;

/// Counters reported at the end of a review pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub device_types: usize,
    pub device_types_skipped: usize,
    pub devices_evaluated: usize,
    pub devices_updated: usize,
}

/// Write `new_value` into `field` when it differs from the stored value
fn update_field(
    device_name: &str,
    fields: &mut SoftwareFields,
    field: SoftwareField,
    new_value: &str,
    log: &mut JobLog,
) -> bool {
    let current = fields.get(field);
    if current == Some(new_value) {
        return false;
    }
    log.log(format!(
        "[{}] Updating '{}': [{}] -> [{}]",
        device_name,
        field.key(),
        current.unwrap_or("None"),
        new_value
    ));
    fields.set(field, new_value);
    true
}

/// Checks a device must pass before its custom fields are saved.
/// Stored field values are not checked against the current labels; a relabel
/// leaves old values in place until the review rewrites them.
fn validate_device(device: &Device) -> Result<()> {
    if device.name.trim().is_empty() {
        return Err(ValidationError::new(format!("Device {} has no name", device.id)).into());
    }
    Ok(())
}

/// Evaluate every device of every device type carrying a version policy and
/// write back changed currency fields.
pub async fn process_device_version_info(store: &Store, log: &mut JobLog) -> Result<ReviewSummary> {
    let settings = store.get_settings().await?;
    let labels = &settings.status_labels;
    let exempted = labels.label(CurrencyStatus::Exempted);
    let mut summary = ReviewSummary::default();

    for dev_type in store.list_device_types_with_policy().await? {
        let Some(blob) = dev_type.version_policy_blob() else {
            continue;
        };
        summary.device_types += 1;
        log.log(format!("{} - Processing version data", dev_type.model));

        let Some(policy) = lint_software_version_data(blob, log) else {
            summary.device_types_skipped += 1;
            continue;
        };

        for device in store.list_devices_for_review(dev_type.id).await? {
            summary.devices_evaluated += 1;
            let role = device.role_slug.as_deref().unwrap_or_default();
            let Some(report) = sw_currency_check(&device.custom_fields, &policy, role, labels, log) else {
                continue;
            };
            if !report.update_data {
                continue;
            }

            let mut fields = device.custom_fields.clone();
            let mut updated = update_field(
                &device.name,
                &mut fields,
                SoftwareField::VersionTarget,
                &report.software_version_target,
                log,
            );

            let stored_status = device.custom_fields.software_currency_status.as_deref();
            if device.custom_fields.software_version.is_some() && stored_status != Some(exempted) {
                updated |= update_field(
                    &device.name,
                    &mut fields,
                    SoftwareField::CurrencyStatus,
                    labels.label(report.software_currency_status),
                    log,
                );

                if report.software_currency_status == CurrencyStatus::UpgradeRequiredRetired {
                    updated |= update_field(
                        &device.name,
                        &mut fields,
                        SoftwareField::CurrencyNotes,
                        &report.software_currency_notes,
                        log,
                    );
                } else if device
                    .custom_fields
                    .software_currency_notes
                    .as_deref()
                    .is_some_and(|n| n.contains(RETIREMENT_NOTE_MARKER))
                {
                    updated |= update_field(&device.name, &mut fields, SoftwareField::CurrencyNotes, "", log);
                }
            }

            if updated {
                validate_device(&device)?;
                store.save_device_custom_fields(device.id, &fields).await?;
                summary.devices_updated += 1;
            }
        }
    }

    tracing::info!(
        "Software currency review: {} device types ({} skipped), {} devices evaluated, {} updated",
        summary.device_types,
        summary.device_types_skipped,
        summary.devices_evaluated,
        summary.devices_updated
    );
    Ok(summary)
}

/// Lint the version policy of every device type without touching devices
pub async fn lint_device_version_info(store: &Store, log: &mut JobLog) -> Result<()> {
    for dev_type in store.list_device_types().await? {
        match dev_type.version_policy_blob() {
            Some(blob) => {
                log.log(format!("Device-Type: {} - Linting version data", dev_type.model));
                lint_software_version_data(blob, log);
            }
            None => {
                log.log(format!("Device-Type: {} - No software version data", dev_type.model));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use serde_json::json;

    struct Seeded {
        store: Store,
        device_type_id: i64,
        role_id: i64,
        ip_id: i64,
    }

    async fn seed(policy: Option<serde_json::Value>) -> Seeded {
        let store = Store::in_memory().await.unwrap();
        let mfr = fixtures::manufacturer(&store, "cisco").await;
        let role = fixtures::role(&store, "access").await;
        let dt = fixtures::device_type(&store, mfr.id, "C9300", policy).await;
        let ip = fixtures::ip_address(&store, &fixtures::ip_request("10.0.0.1/24")).await;
        Seeded {
            store,
            device_type_id: dt.id,
            role_id: role.id,
            ip_id: ip.id,
        }
    }

    async fn add_device(s: &Seeded, name: &str, fields: SoftwareFields, with_ip: bool) -> Device {
        let mut req = fixtures::device_request(name, s.device_type_id, s.role_id);
        req.custom_fields = fields;
        if with_ip {
            req.primary_ip4_id = Some(s.ip_id);
        }
        fixtures::device(&s.store, &req).await
    }

    fn fields(version: Option<&str>, status: Option<&str>, target: Option<&str>, notes: Option<&str>) -> SoftwareFields {
        SoftwareFields {
            software_version: version.map(String::from),
            software_currency_status: status.map(String::from),
            software_version_target: target.map(String::from),
            software_currency_notes: notes.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_retired_version_updates_status_and_notes() {
        let s = seed(Some(fixtures::sample_policy())).await;
        let dev = add_device(&s, "sw1", fields(Some("15.1"), Some("ACCEPTED_ACTIVE"), Some("17.9"), None), true).await;

        let mut log = JobLog::new();
        let summary = process_device_version_info(&s.store, &mut log).await.unwrap();
        assert_eq!(summary.devices_updated, 1);

        let dev = s.store.get_device(dev.id).await.unwrap().unwrap();
        assert_eq!(dev.custom_fields.software_currency_status.as_deref(), Some("UPGRADE_REQUIRED_RETIRED"));
        assert_eq!(dev.custom_fields.software_currency_notes.as_deref(), Some("Retirement Reason: EoL"));
        assert!(log.contains("C9300 - Processing version data"));
        assert!(log.contains("[sw1] Updating 'software_currency_status': [ACCEPTED_ACTIVE] -> [UPGRADE_REQUIRED_RETIRED]"));
    }

    #[tokio::test]
    async fn test_exempted_device_keeps_status_but_gets_target() {
        let s = seed(Some(fixtures::sample_policy())).await;
        let dev = add_device(&s, "sw1", fields(Some("15.1"), Some("EXEMPTED"), Some("16.0"), None), true).await;

        let mut log = JobLog::new();
        process_device_version_info(&s.store, &mut log).await.unwrap();

        let dev = s.store.get_device(dev.id).await.unwrap().unwrap();
        assert_eq!(dev.custom_fields.software_currency_status.as_deref(), Some("EXEMPTED"));
        assert_eq!(dev.custom_fields.software_version_target.as_deref(), Some("17.9"));
        assert_eq!(dev.custom_fields.software_currency_notes, None);
    }

    #[tokio::test]
    async fn test_stale_retirement_notes_cleared() {
        let s = seed(Some(fixtures::sample_policy())).await;
        let dev = add_device(
            &s,
            "sw1",
            fields(Some("17.6"), Some("UPGRADE_REQUIRED_RETIRED"), Some("17.9"), Some("Retirement Reason: EoL")),
            true,
        )
        .await;

        let mut log = JobLog::new();
        process_device_version_info(&s.store, &mut log).await.unwrap();

        let dev = s.store.get_device(dev.id).await.unwrap().unwrap();
        assert_eq!(dev.custom_fields.software_currency_status.as_deref(), Some("ACCEPTED_ACTIVE"));
        assert_eq!(dev.custom_fields.software_currency_notes.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_unrelated_notes_left_alone() {
        let s = seed(Some(fixtures::sample_policy())).await;
        let dev = add_device(
            &s,
            "sw1",
            fields(Some("17.9"), Some("UPGRADE_REQUIRED"), Some("17.9"), Some("Change window Friday")),
            true,
        )
        .await;

        let mut log = JobLog::new();
        process_device_version_info(&s.store, &mut log).await.unwrap();

        let dev = s.store.get_device(dev.id).await.unwrap().unwrap();
        assert_eq!(dev.custom_fields.software_currency_status.as_deref(), Some("TARGET_ACTIVE"));
        assert_eq!(dev.custom_fields.software_currency_notes.as_deref(), Some("Change window Friday"));
    }

    #[tokio::test]
    async fn test_device_without_primary_ip4_ignored() {
        let s = seed(Some(fixtures::sample_policy())).await;
        let dev = add_device(&s, "sw1", fields(Some("15.1"), None, None, None), false).await;

        let mut log = JobLog::new();
        let summary = process_device_version_info(&s.store, &mut log).await.unwrap();
        assert_eq!(summary.devices_evaluated, 0);

        let dev = s.store.get_device(dev.id).await.unwrap().unwrap();
        assert_eq!(dev.custom_fields.software_version_target, None);
    }

    #[tokio::test]
    async fn test_missing_version_only_writes_target() {
        let s = seed(Some(fixtures::sample_policy())).await;
        let dev = add_device(&s, "sw1", SoftwareFields::default(), true).await;

        let mut log = JobLog::new();
        process_device_version_info(&s.store, &mut log).await.unwrap();

        let dev = s.store.get_device(dev.id).await.unwrap().unwrap();
        assert_eq!(dev.custom_fields.software_version_target.as_deref(), Some("17.9"));
        assert_eq!(dev.custom_fields.software_currency_status, None);
        assert!(log.contains("[sw1] Updating 'software_version_target': [None] -> [17.9]"));
    }

    #[tokio::test]
    async fn test_invalid_policy_skips_device_type() {
        let policy = json!([{"role": "core", "versions": {
            "target_active_version": ["17.9"],
            "accepted_active_versions": [],
            "retired_versions": {}
        }}]);
        let s = seed(Some(policy)).await;
        let dev = add_device(&s, "sw1", fields(Some("15.1"), None, None, None), true).await;

        let mut log = JobLog::new();
        let summary = process_device_version_info(&s.store, &mut log).await.unwrap();
        assert_eq!(summary.device_types_skipped, 1);
        assert!(log.contains("Version data missing default role"));

        let dev = s.store.get_device(dev.id).await.unwrap().unwrap();
        assert_eq!(dev.custom_fields.software_version_target, None);
    }

    #[tokio::test]
    async fn test_second_run_changes_nothing() {
        let s = seed(Some(fixtures::sample_policy())).await;
        add_device(&s, "sw1", fields(Some("15.1"), None, None, None), true).await;

        let mut log = JobLog::new();
        let first = process_device_version_info(&s.store, &mut log).await.unwrap();
        assert_eq!(first.devices_updated, 1);

        let mut log = JobLog::new();
        let second = process_device_version_info(&s.store, &mut log).await.unwrap();
        assert_eq!(second.devices_updated, 0);
        assert!(!log.messages().any(|m| m.contains("Updating")));
    }

    #[tokio::test]
    async fn test_relabel_does_not_abort_review() {
        let s = seed(Some(fixtures::sample_policy())).await;
        let stale = add_device(&s, "a", fields(None, Some("TARGET_ACTIVE"), None, None), true).await;
        let retired = add_device(&s, "b", fields(Some("15.1"), None, None, None), true).await;

        let mut settings = s.store.get_settings().await.unwrap();
        settings.status_labels.target_active = "Current".to_string();
        s.store.update_settings(&settings).await.unwrap();

        let mut log = JobLog::new();
        let summary = process_device_version_info(&s.store, &mut log).await.unwrap();
        assert_eq!(summary.devices_updated, 2);

        let stale = s.store.get_device(stale.id).await.unwrap().unwrap();
        assert_eq!(stale.custom_fields.software_version_target.as_deref(), Some("17.9"));
        assert_eq!(stale.custom_fields.software_currency_status.as_deref(), Some("TARGET_ACTIVE"));

        let retired = s.store.get_device(retired.id).await.unwrap().unwrap();
        assert_eq!(
            retired.custom_fields.software_currency_status.as_deref(),
            Some("UPGRADE_REQUIRED_RETIRED")
        );
    }

    #[tokio::test]
    async fn test_blank_device_name_fails_run_after_earlier_writes() {
        let s = seed(Some(fixtures::sample_policy())).await;
        let first = add_device(&s, "sw1", fields(Some("15.1"), None, None, None), true).await;
        let mfr = fixtures::manufacturer(&s.store, "juniper").await;
        let dt = fixtures::device_type(&s.store, mfr.id, "EX4300", Some(fixtures::sample_policy())).await;
        let mut req = fixtures::device_request("  ", dt.id, s.role_id);
        req.custom_fields = fields(Some("15.1"), None, None, None);
        req.primary_ip4_id = Some(s.ip_id);
        fixtures::device(&s.store, &req).await;

        let mut log = JobLog::new();
        let err = process_device_version_info(&s.store, &mut log).await.unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());

        let first = s.store.get_device(first.id).await.unwrap().unwrap();
        assert_eq!(first.custom_fields.software_version_target.as_deref(), Some("17.9"));
    }

    #[tokio::test]
    async fn test_lint_pass_reports_each_type() {
        let s = seed(Some(fixtures::sample_policy())).await;
        let mfr = fixtures::manufacturer(&s.store, "arista").await;
        fixtures::device_type(&s.store, mfr.id, "7050X", None).await;

        let mut log = JobLog::new();
        lint_device_version_info(&s.store, &mut log).await.unwrap();

        assert!(log.contains("Device-Type: C9300 - Linting version data"));
        assert!(log.contains("Version data passed lint check"));
        assert!(log.contains("Device-Type: 7050X - No software version data"));
    }
}
