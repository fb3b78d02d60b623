use crate::domain::alert::{Alert, Urgency};
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum UrgencyFilter {
    #[default]
    All,
    Critical,
    Medium,
    Info,
}

impl UrgencyFilter {
    pub fn matches(self, urgency: Urgency) -> bool {
        match self {
            UrgencyFilter::All => true,
            UrgencyFilter::Critical => urgency == Urgency::Critical,
            UrgencyFilter::Medium => urgency == Urgency::Medium,
            UrgencyFilter::Info => urgency == Urgency::Info,
        }
    }
}

impl FromStr for UrgencyFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(UrgencyFilter::All),
            "critical" => Ok(UrgencyFilter::Critical),
            "medium" => Ok(UrgencyFilter::Medium),
            "info" => Ok(UrgencyFilter::Info),
            other => bail!("unknown urgency filter {other:?} (expected all, critical, medium or info)"),
        }
    }
}

impl TryFrom<String> for UrgencyFilter {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

pub fn filter_alerts(alerts: &[Alert], filter: UrgencyFilter) -> Vec<Alert> {
    alerts
        .iter()
        .filter(|a| filter.matches(a.urgency))
        .cloned()
        .collect()
}

/// Number shown on the notification bell.
pub fn badge_count(alerts: &[Alert]) -> usize {
    alerts.len()
}

/// Per-tier counts for an alert list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub medium: usize,
    pub info: usize,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        alerts.iter().fold(
            Self {
                total: alerts.len(),
                ..Self::default()
            },
            |mut acc, a| {
                match a.urgency {
                    Urgency::Critical => acc.critical += 1,
                    Urgency::Medium => acc.medium += 1,
                    Urgency::Info => acc.info += 1,
                }
                acc
            },
        )
    }

    pub fn requires_attention(&self) -> usize {
        self.critical
    }

    pub fn count_for(&self, filter: UrgencyFilter) -> usize {
        match filter {
            UrgencyFilter::All => self.total,
            UrgencyFilter::Critical => self.critical,
            UrgencyFilter::Medium => self.medium,
            UrgencyFilter::Info => self.info,
        }
    }
}
