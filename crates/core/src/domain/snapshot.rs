use serde::{Deserialize, Serialize};

/// Financial metrics the alert rules are evaluated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    #[serde(alias = "stabilityScore")]
    pub stability_score: f64,
    #[serde(alias = "netCashFlow")]
    pub net_cash_flow: f64,
    #[serde(default, alias = "expenseBreakdown")]
    pub expense_breakdown: Vec<ExpenseItem>,
    #[serde(default, alias = "cashFlowTrend")]
    pub cash_flow_trend: Vec<CashFlowPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub date: String,
    pub net_flow: f64,
}

impl FinancialSnapshot {
    /// First expense whose category contains `token` (case-sensitive).
    pub fn find_expense(&self, token: &str) -> Option<&ExpenseItem> {
        self.expense_breakdown
            .iter()
            .find(|e| e.category.contains(token))
    }
}
