use crate::dataset::MonthlyRecord;
use serde::{Deserialize, Serialize};

const STABILITY_WEIGHT: f64 = 0.4;
const CASH_FLOW_WEIGHT: f64 = 0.3;
const CREDIT_WEIGHT: f64 = 0.3;

// Net monthly cash flow that maps to a full 100 on the cash-flow component.
const CASH_FLOW_CEILING: f64 = 5_000_000.0;

/// Weighted 0–100 blend of stability, capped net cash flow and credit score.
pub fn financial_health_score(
    stability_score: f64,
    net_monthly_cash_flow: f64,
    credit_score: f64,
) -> f64 {
    let normalized_cash_flow = (net_monthly_cash_flow / CASH_FLOW_CEILING * 100.0).min(100.0);
    stability_score * STABILITY_WEIGHT
        + normalized_cash_flow * CASH_FLOW_WEIGHT
        + credit_score * CREDIT_WEIGHT
}

/// Percentage change from `previous`; zero when there is no usable baseline.
pub fn percent_change(current: f64, previous: Option<f64>) -> f64 {
    match previous {
        Some(prev) if prev != 0.0 => (current - prev) / prev * 100.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityGrade {
    Excellent,
    Good,
    Fair,
}

impl StabilityGrade {
    pub fn from_score(stability_score: f64) -> Self {
        if stability_score >= 70.0 {
            StabilityGrade::Excellent
        } else if stability_score >= 60.0 {
            StabilityGrade::Good
        } else {
            StabilityGrade::Fair
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub month: String,
    pub health_score: f64,
    pub health_score_change: f64,
    pub stability_score: f64,
    pub stability_grade: StabilityGrade,
    pub stability_change: f64,
    pub net_cash_flow: f64,
    pub net_cash_flow_change: f64,
    pub coach_recommendation: String,
}

impl HealthReport {
    pub fn for_month(current: &MonthlyRecord, previous: Option<&MonthlyRecord>) -> Self {
        let health_score = current.health_score();
        Self {
            month: current.month.clone(),
            health_score,
            health_score_change: percent_change(
                health_score,
                previous.map(MonthlyRecord::health_score),
            ),
            stability_score: current.cash_flow_stability_score,
            stability_grade: StabilityGrade::from_score(current.cash_flow_stability_score),
            stability_change: percent_change(
                current.cash_flow_stability_score,
                previous.map(|p| p.cash_flow_stability_score),
            ),
            net_cash_flow: current.net_monthly_cash_flow,
            net_cash_flow_change: percent_change(
                current.net_monthly_cash_flow,
                previous.map(|p| p.net_monthly_cash_flow),
            ),
            coach_recommendation: current.coach_recommendation.clone(),
        }
    }
}
