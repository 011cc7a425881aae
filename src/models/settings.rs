use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::currency::StatusLabels;

/// PluginSettings holds the operator-tunable options for both automations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSettings {
    // Software currency labels
    #[serde(default)]
    pub status_labels: StatusLabels,
    // IP address automation
    #[serde(default = "default_network_mgmt_tag_slug")]
    pub network_mgmt_tag_slug: String,
    #[serde(default = "default_skip_discovery_tag_slug")]
    pub skip_discovery_tag_slug: String,
    #[serde(default = "default_manufacturer_name_slugs")]
    pub manufacturer_name_slugs: Vec<String>,
    /// Tenant slug -> IP tag slug
    #[serde(default)]
    pub tenant_tag_to_ip_tag: BTreeMap<String, String>,
    #[serde(default = "default_vrf_name")]
    pub default_vrf_name: String,
}

fn default_network_mgmt_tag_slug() -> String {
    "network-mgmt".to_string()
}
fn default_skip_discovery_tag_slug() -> String {
    "skip-discovery".to_string()
}
fn default_manufacturer_name_slugs() -> Vec<String> {
    vec!["cisco".to_string(), "arista".to_string(), "juniper".to_string()]
}
fn default_vrf_name() -> String {
    "global".to_string()
}

impl PluginSettings {
    /// Case-insensitive manufacturer allow-list check
    pub fn manufacturer_allowed(&self, slug: &str) -> bool {
        let slug = slug.to_lowercase();
        self.manufacturer_name_slugs
            .iter()
            .any(|m| m.to_lowercase() == slug)
    }
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            status_labels: StatusLabels::default(),
            network_mgmt_tag_slug: default_network_mgmt_tag_slug(),
            skip_discovery_tag_slug: default_skip_discovery_tag_slug(),
            manufacturer_name_slugs: default_manufacturer_name_slugs(),
            tenant_tag_to_ip_tag: BTreeMap::new(),
            default_vrf_name: default_vrf_name(),
        }
    }
}
