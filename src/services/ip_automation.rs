use anyhow::{Context, Result};
use tokio::task::JoinHandle;

use crate::db::{Committed, Store};
use crate::models::*;

/// Why the automation stopped before making all of its changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    NotOnInterface,
    NoDevice,
    NotPrimaryIp,
    ManufacturerNotAllowed,
    SkipDiscovery,
}

/// What one run of the automation changed on an IP address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpAutomationOutcome {
    pub stopped: Option<StopReason>,
    pub mgmt_tag_added: bool,
    pub tenant_tag_added: Option<String>,
    pub vrf_assigned: Option<String>,
}

impl IpAutomationOutcome {
    fn stop(reason: StopReason) -> Self {
        Self {
            stopped: Some(reason),
            ..Default::default()
        }
    }

    pub fn changed_anything(&self) -> bool {
        self.mgmt_tag_added || self.tenant_tag_added.is_some() || self.vrf_assigned.is_some()
    }
}

/// Post-save hook for IP addresses.
/// Only addresses assigned to an interface are scheduled; the work runs in a
/// spawned task and never reports errors back to the saving request.
pub fn on_ip_saved(store: Store, saved: Committed<IpAddress>) -> Option<JoinHandle<()>> {
    let ip = saved.into_inner();
    if !ip.is_assigned_to_interface() {
        return None;
    }

    Some(tokio::spawn(async move {
        match apply_tags_and_vrf(&store, ip.id).await {
            Ok(outcome) if outcome.changed_anything() => {
                tracing::info!("IP automation updated {} ({}): {:?}", ip.address, ip.id, outcome);
            }
            Ok(outcome) => {
                tracing::debug!("IP automation for {} ({}): {:?}", ip.address, ip.id, outcome);
            }
            Err(e) => {
                tracing::error!("IP automation failed for {} ({}): {}", ip.address, ip.id, e);
            }
        }
    }))
}

/// Tag a device's primary IP for management and default its VRF.
/// Reads the current state of the address, so repeated runs are no-ops.
pub async fn apply_tags_and_vrf(store: &Store, ip_id: i64) -> Result<IpAutomationOutcome> {
    let settings = store.get_settings().await?;
    let ip = store
        .get_ip_address(ip_id)
        .await?
        .with_context(|| format!("IP address {} not found", ip_id))?;

    let interface_id = match ip.assigned_object_id {
        Some(id) if ip.is_assigned_to_interface() => id,
        _ => {
            tracing::info!("IP {} not assigned to an interface", ip.address);
            return Ok(IpAutomationOutcome::stop(StopReason::NotOnInterface));
        }
    };

    let device = match store.get_interface(interface_id).await? {
        Some(interface) => store.get_device(interface.device_id).await?,
        None => None,
    };
    let Some(device) = device else {
        tracing::info!("IP {} interface is not on a device", ip.address);
        return Ok(IpAutomationOutcome::stop(StopReason::NoDevice));
    };

    if device.primary_ip4_id != Some(ip.id) && device.primary_ip6_id != Some(ip.id) {
        return Ok(IpAutomationOutcome::stop(StopReason::NotPrimaryIp));
    }

    let manufacturer = device.manufacturer_slug.as_deref().unwrap_or_default();
    if !settings.manufacturer_allowed(manufacturer) {
        return Ok(IpAutomationOutcome::stop(StopReason::ManufacturerNotAllowed));
    }

    let mut outcome = IpAutomationOutcome::default();
    // Tags as they were before this run; the skip check uses this snapshot
    let mut tag_slugs = ip.tags.clone();

    match store.get_tag_by_slug(&settings.network_mgmt_tag_slug).await? {
        Some(tag) => {
            if !tag_slugs.contains(&tag.slug) {
                outcome.mgmt_tag_added = store.add_ip_address_tag(ip.id, tag.id).await?;
                tag_slugs.push(tag.slug);
            }
        }
        None => tracing::warn!("Missing tag: '{}'", settings.network_mgmt_tag_slug),
    }

    if ip.has_tag(&settings.skip_discovery_tag_slug) {
        tracing::info!("Discovery exempt tag present on {}, stopping", ip.address);
        outcome.stopped = Some(StopReason::SkipDiscovery);
        return Ok(outcome);
    }

    let has_tenant_tag = settings
        .tenant_tag_to_ip_tag
        .values()
        .any(|slug| tag_slugs.contains(slug));
    if !has_tenant_tag {
        let mapped = ip
            .tenant_slug
            .as_deref()
            .and_then(|t| settings.tenant_tag_to_ip_tag.get(t));
        if let Some(target_slug) = mapped {
            match store.get_tag_by_slug(target_slug).await? {
                Some(tag) => {
                    store.add_ip_address_tag(ip.id, tag.id).await?;
                    outcome.tenant_tag_added = Some(tag.slug);
                }
                None => tracing::warn!("Missing tag: '{}'", target_slug),
            }
        }
    }

    if ip.vrf_id.is_none() {
        match store.find_vrf_by_name(&settings.default_vrf_name).await? {
            Some(vrf) => {
                store.set_ip_address_vrf(ip.id, Some(vrf.id)).await?;
                outcome.vrf_assigned = Some(vrf.name);
            }
            None => {
                tracing::warn!(
                    "VRF '{}' not found. Skipping VRF assignment.",
                    settings.default_vrf_name
                );
            }
        }
    }

    Ok(outcome)
}
