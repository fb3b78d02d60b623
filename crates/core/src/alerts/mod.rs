//! Smart-alert rule engine.
//!
//! A fixed catalog of independent heuristics is evaluated against a
//! [`FinancialSnapshot`]; each rule contributes at most one [`Alert`]. The
//! result is ordered by urgency, most severe first, with ties kept in rule
//! order.

mod rules;
pub mod summary;

use crate::domain::alert::Alert;
use crate::domain::snapshot::FinancialSnapshot;
use crate::tax::TaxSchedule;
use chrono::{DateTime, NaiveDate, Utc};

pub use rules::RULE_IDS;

/// Per-call inputs that are not part of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationContext {
    pub reference_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl EvaluationContext {
    pub fn new(reference_date: NaiveDate, created_at: DateTime<Utc>) -> Self {
        Self {
            reference_date,
            created_at,
        }
    }

    /// Current instant, with the reference date taken from Lagos local time.
    pub fn now() -> Self {
        let created_at = Utc::now();
        let reference_date = crate::time::wat::resolve_reference_date(None, created_at)
            .unwrap_or_else(|_| created_at.date_naive());
        Self::new(reference_date, created_at)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlertEngine {
    tax_schedule: TaxSchedule,
}

impl AlertEngine {
    pub fn new(tax_schedule: TaxSchedule) -> Self {
        Self { tax_schedule }
    }

    pub fn tax_schedule(&self) -> &TaxSchedule {
        &self.tax_schedule
    }

    pub fn evaluate(&self, snapshot: &FinancialSnapshot, ctx: &EvaluationContext) -> Vec<Alert> {
        let input = rules::RuleInput {
            snapshot,
            ctx,
            tax_schedule: &self.tax_schedule,
        };

        let mut alerts: Vec<Alert> = rules::CATALOG
            .iter()
            .filter_map(|rule| rule(&input))
            .collect();

        // `sort_by` is stable: equal urgencies stay in rule order.
        alerts.sort_by(|a, b| b.urgency.cmp(&a.urgency));

        tracing::debug!(
            reference_date = %ctx.reference_date,
            fired = alerts.len(),
            "evaluated smart alerts"
        );

        alerts
    }
}

/// Evaluates with the default tax calendar and the current clock.
pub fn evaluate(snapshot: &FinancialSnapshot) -> Vec<Alert> {
    AlertEngine::default().evaluate(snapshot, &EvaluationContext::now())
}
