use crate::domain::snapshot::{CashFlowPoint, ExpenseItem, FinancialSnapshot};
use crate::health::financial_health_score;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// One month of dashboard metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub month: String,
    pub cash_flow_stability_score: f64,
    pub net_monthly_cash_flow: f64,
    #[serde(default)]
    pub cash_flow_trend: Vec<CashFlowPoint>,
    pub credit_score: f64,
    #[serde(default)]
    pub expense_breakdown: Vec<ExpenseItem>,
    #[serde(default)]
    pub coach_recommendation: String,
}

impl MonthlyRecord {
    pub fn to_snapshot(&self) -> FinancialSnapshot {
        FinancialSnapshot {
            stability_score: self.cash_flow_stability_score,
            net_cash_flow: self.net_monthly_cash_flow,
            expense_breakdown: self.expense_breakdown.clone(),
            cash_flow_trend: self.cash_flow_trend.clone(),
        }
    }

    pub fn health_score(&self) -> f64 {
        financial_health_score(
            self.cash_flow_stability_score,
            self.net_monthly_cash_flow,
            self.credit_score,
        )
    }
}

/// Months in chronological order, as listed in the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardDataset {
    months: Vec<MonthlyRecord>,
}

#[derive(Debug, Deserialize)]
struct DatasetFile {
    months: Vec<MonthlyRecord>,
}

impl DashboardDataset {
    pub fn new(months: Vec<MonthlyRecord>) -> anyhow::Result<Self> {
        ensure!(!months.is_empty(), "dashboard dataset must contain at least one month");

        let mut seen = BTreeSet::new();
        for record in &months {
            let label = record.month.trim();
            ensure!(!label.is_empty(), "month label must be non-empty");
            ensure!(seen.insert(label.to_string()), "duplicate month: {label}");
        }

        Ok(Self { months })
    }

    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let file = serde_json::from_str::<DatasetFile>(s)
            .context("dashboard dataset is not valid JSON for the months schema")?;
        Self::new(file.months)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard dataset {}", path.display()))?;
        let dataset = Self::from_json_str(&raw)
            .with_context(|| format!("invalid dashboard dataset {}", path.display()))?;
        tracing::debug!(path = %path.display(), months = dataset.months.len(), "loaded dashboard dataset");
        Ok(dataset)
    }

    pub fn months(&self) -> impl Iterator<Item = &str> {
        self.months.iter().map(|m| m.month.as_str())
    }

    pub fn get(&self, month: &str) -> Option<&MonthlyRecord> {
        self.position(month).map(|i| &self.months[i])
    }

    pub fn previous(&self, month: &str) -> Option<&MonthlyRecord> {
        let i = self.position(month)?;
        i.checked_sub(1).map(|p| &self.months[p])
    }

    pub fn latest(&self) -> &MonthlyRecord {
        // Non-empty by construction.
        &self.months[self.months.len() - 1]
    }

    fn position(&self, month: &str) -> Option<usize> {
        let month = month.trim();
        self.months.iter().position(|m| m.month.trim() == month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn month(label: &str, stability: f64, net: f64) -> serde_json::Value {
        json!({
            "month": label,
            "cash_flow_stability_score": stability,
            "net_monthly_cash_flow": net,
            "credit_score": 60,
            "cash_flow_trend": [
                { "date": "7", "net_flow": 800000 },
                { "date": "14", "net_flow": 700000 },
                { "date": "21", "net_flow": 650000 },
            ],
            "expense_breakdown": [
                { "category": "COGS / Inventory", "amount": 3500000, "percentage": 35 },
            ],
            "coach_recommendation": "Keep going.",
        })
    }

    fn dataset() -> DashboardDataset {
        let raw = json!({
            "months": [month("Jan 2025", 55.2, 2_500_000.0), month("Feb 2025", 58.9, 2_700_000.0)]
        })
        .to_string();
        DashboardDataset::from_json_str(&raw).unwrap()
    }

    #[test]
    fn keeps_file_order_and_resolves_neighbours() {
        let d = dataset();
        assert_eq!(d.months().collect::<Vec<_>>(), vec!["Jan 2025", "Feb 2025"]);
        assert_eq!(d.latest().month, "Feb 2025");
        assert_eq!(d.previous("Feb 2025").unwrap().month, "Jan 2025");
        assert!(d.previous("Jan 2025").is_none());
        assert!(d.get("Mar 2025").is_none());
    }

    #[test]
    fn converts_to_snapshot() {
        let d = dataset();
        let snapshot = d.get("Jan 2025").unwrap().to_snapshot();
        assert_eq!(snapshot.stability_score, 55.2);
        assert_eq!(snapshot.net_cash_flow, 2_500_000.0);
        assert_eq!(snapshot.cash_flow_trend.len(), 3);
        assert_eq!(snapshot.expense_breakdown[0].category, "COGS / Inventory");
    }

    #[test]
    fn rejects_duplicates_and_empty() {
        let dup = json!({ "months": [month("Jan 2025", 1.0, 1.0), month("Jan 2025", 2.0, 2.0)] })
            .to_string();
        assert!(DashboardDataset::from_json_str(&dup).is_err());
        assert!(DashboardDataset::from_json_str(r#"{"months":[]}"#).is_err());
    }

    #[test]
    fn bundled_sample_parses() {
        let raw = include_str!("../../../data/dashboard.json");
        let d = DashboardDataset::from_json_str(raw).unwrap();
        assert!(d.months().count() >= 2);
    }
}
