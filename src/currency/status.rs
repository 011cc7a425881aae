use serde::{Deserialize, Serialize};
use std::fmt;

/// Software currency classification of a device.
///
/// The stored/displayed string for each state comes from [`StatusLabels`], so
/// comparisons are always made on this enum and never on the label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrencyStatus {
    TargetActive,
    AcceptedActive,
    Exempted,
    UpgradeRequired,
    UpgradeRequiredRetired,
}

impl CurrencyStatus {
    pub const ALL: [CurrencyStatus; 5] = [
        CurrencyStatus::TargetActive,
        CurrencyStatus::AcceptedActive,
        CurrencyStatus::Exempted,
        CurrencyStatus::UpgradeRequired,
        CurrencyStatus::UpgradeRequiredRetired,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            CurrencyStatus::TargetActive => "TARGET_ACTIVE",
            CurrencyStatus::AcceptedActive => "ACCEPTED_ACTIVE",
            CurrencyStatus::Exempted => "EXEMPTED",
            CurrencyStatus::UpgradeRequired => "UPGRADE_REQUIRED",
            CurrencyStatus::UpgradeRequiredRetired => "UPGRADE_REQUIRED_RETIRED",
        }
    }
}

impl fmt::Display for CurrencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Configured label for each currency status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLabels {
    #[serde(default = "default_target_active")]
    pub target_active: String,
    #[serde(default = "default_accepted_active")]
    pub accepted_active: String,
    #[serde(default = "default_exempted")]
    pub exempted: String,
    #[serde(default = "default_upgrade_required")]
    pub upgrade_required: String,
    #[serde(default = "default_upgrade_required_retired")]
    pub upgrade_required_retired: String,
}

fn default_target_active() -> String {
    CurrencyStatus::TargetActive.symbol().to_string()
}
fn default_accepted_active() -> String {
    CurrencyStatus::AcceptedActive.symbol().to_string()
}
fn default_exempted() -> String {
    CurrencyStatus::Exempted.symbol().to_string()
}
fn default_upgrade_required() -> String {
    CurrencyStatus::UpgradeRequired.symbol().to_string()
}
fn default_upgrade_required_retired() -> String {
    CurrencyStatus::UpgradeRequiredRetired.symbol().to_string()
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            target_active: default_target_active(),
            accepted_active: default_accepted_active(),
            exempted: default_exempted(),
            upgrade_required: default_upgrade_required(),
            upgrade_required_retired: default_upgrade_required_retired(),
        }
    }
}

impl StatusLabels {
    pub fn label(&self, status: CurrencyStatus) -> &str {
        match status {
            CurrencyStatus::TargetActive => &self.target_active,
            CurrencyStatus::AcceptedActive => &self.accepted_active,
            CurrencyStatus::Exempted => &self.exempted,
            CurrencyStatus::UpgradeRequired => &self.upgrade_required,
            CurrencyStatus::UpgradeRequiredRetired => &self.upgrade_required_retired,
        }
    }

    /// Map a stored label back to its status. Unknown labels yield `None`.
    pub fn parse(&self, label: &str) -> Option<CurrencyStatus> {
        CurrencyStatus::ALL
            .into_iter()
            .find(|s| self.label(*s) == label)
    }

    /// Labels must be non-empty and pairwise distinct to round-trip through `parse`.
    pub fn validate(&self) -> Result<(), String> {
        for (i, a) in CurrencyStatus::ALL.iter().enumerate() {
            let label = self.label(*a);
            if label.trim().is_empty() {
                return Err(format!("label for {} must not be empty", a));
            }
            for b in &CurrencyStatus::ALL[i + 1..] {
                if self.label(*b) == label {
                    return Err(format!("{} and {} share the label '{}'", a, b, label));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_custom_labels() {
        let labels = StatusLabels {
            target_active: "Target".to_string(),
            exempted: "Exempt".to_string(),
            ..Default::default()
        };
        for status in CurrencyStatus::ALL {
            assert_eq!(labels.parse(labels.label(status)), Some(status));
        }
        assert_eq!(labels.parse("TARGET_ACTIVE"), None);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let labels = StatusLabels {
            exempted: "ACCEPTED_ACTIVE".to_string(),
            ..Default::default()
        };
        assert!(labels.validate().is_err());
        assert!(StatusLabels::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank() {
        let labels = StatusLabels {
            upgrade_required: "  ".to_string(),
            ..Default::default()
        };
        assert!(labels.validate().is_err());
    }
}
