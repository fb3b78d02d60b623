use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub urgency: Urgency,
    pub title: String,
    pub description: String,
    pub recommended_action: String,
    pub impact_if_ignored: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CashCrunch,
    // Not produced by any rule yet.
    PaymentDelay,
    ExpenseSpike,
    Opportunity,
    TaxDeadline,
}

impl AlertKind {
    pub fn label(self) -> &'static str {
        match self {
            AlertKind::CashCrunch => "Cash Alert",
            AlertKind::PaymentDelay => "Payment",
            AlertKind::ExpenseSpike => "Expense",
            AlertKind::Opportunity => "Opportunity",
            AlertKind::TaxDeadline => "Tax",
        }
    }
}

/// Severity tier. Serialized as the integer 1..=3; ordering follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Urgency {
    Info = 1,
    Medium = 2,
    Critical = 3,
}

impl Urgency {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Urgency::Critical => "CRITICAL",
            Urgency::Medium => "MEDIUM",
            Urgency::Info => "INFO",
        }
    }
}

impl From<Urgency> for u8 {
    fn from(value: Urgency) -> Self {
        value.level()
    }
}

impl TryFrom<u8> for Urgency {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Urgency::Info),
            2 => Ok(Urgency::Medium),
            3 => Ok(Urgency::Critical),
            other => Err(format!("urgency must be 1, 2 or 3 (got {other})")),
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
