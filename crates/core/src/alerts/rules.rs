use super::EvaluationContext;
use crate::domain::alert::{Alert, AlertKind, Urgency};
use crate::domain::snapshot::FinancialSnapshot;
use crate::format::to_fixed_1;
use crate::tax::TaxSchedule;

pub(super) struct RuleInput<'a> {
    pub snapshot: &'a FinancialSnapshot,
    pub ctx: &'a EvaluationContext,
    pub tax_schedule: &'a TaxSchedule,
}

type Rule = fn(&RuleInput<'_>) -> Option<Alert>;

/// Evaluation order. Also the tie-break order for alerts of equal urgency.
pub(super) const CATALOG: [Rule; 7] = [
    cash_crunch,
    declining_trend,
    high_cogs,
    logistics,
    growth,
    tax_deadline,
    payroll,
];

pub const RULE_IDS: [&str; 7] = [
    "alert_cash_crunch",
    "alert_declining_trend",
    "alert_high_cogs",
    "alert_logistics",
    "alert_growth",
    "alert_tax",
    "alert_payroll",
];

const CASH_CRUNCH_STABILITY_BELOW: f64 = 60.0;
const GROWTH_NET_CASH_FLOW_ABOVE: f64 = 3_000_000.0;
const GROWTH_STABILITY_ABOVE: f64 = 65.0;
const DECLINING_TREND_WINDOW: usize = 3;

const COGS_PCT_ABOVE: f64 = 30.0;
const LOGISTICS_PCT_ABOVE: f64 = 15.0;
const PAYROLL_PCT_ABOVE: f64 = 22.0;

fn cash_crunch(input: &RuleInput<'_>) -> Option<Alert> {
    let s = input.snapshot;
    let fires = s.stability_score < CASH_CRUNCH_STABILITY_BELOW;
    if !fires {
        return None;
    }

    // Linear projection: every 1M of monthly net flow buys ~30 days.
    let runway_days = ((s.net_cash_flow / 1_000_000.0) * 30.0).floor() as i64;

    Some(Alert {
        id: "alert_cash_crunch".to_string(),
        kind: AlertKind::CashCrunch,
        urgency: Urgency::Critical,
        title: "Low Cash Flow Stability Detected".to_string(),
        description: format!(
            "Your stability score is {}/100. Estimated cash runway: ~{runway_days} days.",
            to_fixed_1(s.stability_score)
        ),
        recommended_action:
            "Consider invoice financing or negotiate extended payment terms with suppliers."
                .to_string(),
        impact_if_ignored: "Risk of missing payroll or supplier payments within 30-45 days."
            .to_string(),
        potential_savings: Some(1_400_000.0),
        created_at: input.ctx.created_at,
    })
}

fn declining_trend(input: &RuleInput<'_>) -> Option<Alert> {
    let trend = &input.snapshot.cash_flow_trend;
    if trend.len() < DECLINING_TREND_WINDOW {
        return None;
    }

    let last = &trend[trend.len() - DECLINING_TREND_WINDOW..];
    if !last.windows(2).all(|w| w[1].net_flow < w[0].net_flow) {
        return None;
    }

    Some(Alert {
        id: "alert_declining_trend".to_string(),
        kind: AlertKind::CashCrunch,
        urgency: Urgency::Medium,
        title: "Declining Cash Flow Trend".to_string(),
        description: "Your cash flow has decreased for 3 consecutive weeks.".to_string(),
        recommended_action: "Review receivables aging and accelerate collections. Consider offering early payment discounts.".to_string(),
        impact_if_ignored: "Continued decline may lead to working capital shortage.".to_string(),
        potential_savings: Some(850_000.0),
        created_at: input.ctx.created_at,
    })
}

fn high_cogs(input: &RuleInput<'_>) -> Option<Alert> {
    let item = input.snapshot.find_expense("COGS")?;
    let fires = item.percentage > COGS_PCT_ABOVE;
    if !fires {
        return None;
    }

    Some(Alert {
        id: "alert_high_cogs".to_string(),
        kind: AlertKind::ExpenseSpike,
        urgency: Urgency::Medium,
        title: "High Cost of Goods Sold".to_string(),
        description: format!(
            "COGS is {}% of expenses (industry average: 30%).",
            to_fixed_1(item.percentage)
        ),
        recommended_action: "Negotiate bulk purchasing discounts with top 3 suppliers or explore alternative suppliers.".to_string(),
        impact_if_ignored: "Missing 5-10% cost reduction opportunities monthly.".to_string(),
        potential_savings: Some(item.amount * 0.05),
        created_at: input.ctx.created_at,
    })
}

fn logistics(input: &RuleInput<'_>) -> Option<Alert> {
    let item = input.snapshot.find_expense("Logistics")?;
    let fires = item.percentage > LOGISTICS_PCT_ABOVE;
    if !fires {
        return None;
    }

    Some(Alert {
        id: "alert_logistics".to_string(),
        kind: AlertKind::Opportunity,
        urgency: Urgency::Info,
        title: "Logistics Optimization Opportunity".to_string(),
        description: format!(
            "Logistics costs are {}% of expenses (target: <15%).",
            to_fixed_1(item.percentage)
        ),
        recommended_action: "Consider route optimization software or negotiate bulk rates with logistics partners.".to_string(),
        impact_if_ignored: "Overpaying by approximately 8% on logistics monthly.".to_string(),
        potential_savings: Some(item.amount * 0.08),
        created_at: input.ctx.created_at,
    })
}

fn growth(input: &RuleInput<'_>) -> Option<Alert> {
    let s = input.snapshot;
    let fires =
        s.net_cash_flow > GROWTH_NET_CASH_FLOW_ABOVE && s.stability_score > GROWTH_STABILITY_ABOVE;
    if !fires {
        return None;
    }

    Some(Alert {
        id: "alert_growth".to_string(),
        kind: AlertKind::Opportunity,
        urgency: Urgency::Info,
        title: "Growth Capital Available".to_string(),
        description: "Strong cash position detected. You may qualify for growth financing."
            .to_string(),
        recommended_action: "Consider inventory expansion, new equipment, or market expansion."
            .to_string(),
        impact_if_ignored: "Missing potential 15-25% revenue growth opportunities.".to_string(),
        potential_savings: Some(s.net_cash_flow * 0.2),
        created_at: input.ctx.created_at,
    })
}

// Unconditional: every evaluation carries exactly one tax reminder.
fn tax_deadline(input: &RuleInput<'_>) -> Option<Alert> {
    let description = match input.tax_schedule.next_deadline(input.ctx.reference_date) {
        Some(deadline) => deadline.describe(),
        None => "No upcoming filings on the tax calendar. Confirm deadlines with your accountant."
            .to_string(),
    };

    Some(Alert {
        id: "alert_tax".to_string(),
        kind: AlertKind::TaxDeadline,
        urgency: Urgency::Medium,
        title: "Upcoming Tax Deadline".to_string(),
        description,
        recommended_action:
            "Ensure all transaction records are up-to-date. Consult with your accountant."
                .to_string(),
        impact_if_ignored: "Risk of penalties (5-10% of tax owed) plus interest charges."
            .to_string(),
        potential_savings: None,
        created_at: input.ctx.created_at,
    })
}

fn payroll(input: &RuleInput<'_>) -> Option<Alert> {
    let item = input.snapshot.find_expense("Payroll")?;
    let fires = item.percentage > PAYROLL_PCT_ABOVE;
    if !fires {
        return None;
    }

    Some(Alert {
        id: "alert_payroll".to_string(),
        kind: AlertKind::ExpenseSpike,
        urgency: Urgency::Medium,
        title: "High Payroll Ratio".to_string(),
        description: format!(
            "Payroll is {}% of expenses (recommended: <22%).",
            to_fixed_1(item.percentage)
        ),
        recommended_action:
            "Review productivity metrics. Consider automation for repetitive tasks.".to_string(),
        impact_if_ignored: "Reduced profitability and competitiveness.".to_string(),
        potential_savings: Some(item.amount * 0.03),
        created_at: input.ctx.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::{CashFlowPoint, ExpenseItem};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn ctx() -> EvaluationContext {
        EvaluationContext::new(
            NaiveDate::from_ymd_opt(2025, 12, 11).unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 11, 9, 0, 0).unwrap(),
        )
    }

    fn base() -> FinancialSnapshot {
        FinancialSnapshot {
            stability_score: 80.0,
            net_cash_flow: 1_000_000.0,
            expense_breakdown: vec![],
            cash_flow_trend: vec![],
        }
    }

    fn trend(flows: &[f64]) -> Vec<CashFlowPoint> {
        flows
            .iter()
            .enumerate()
            .map(|(i, f)| CashFlowPoint {
                date: format!("Week {}", i + 1),
                net_flow: *f,
            })
            .collect()
    }

    fn expense(category: &str, amount: f64, percentage: f64) -> ExpenseItem {
        ExpenseItem {
            category: category.to_string(),
            amount,
            percentage,
        }
    }

    fn run(rule: Rule, snapshot: &FinancialSnapshot) -> Option<Alert> {
        let ctx = ctx();
        let schedule = TaxSchedule::default();
        rule(&RuleInput {
            snapshot,
            ctx: &ctx,
            tax_schedule: &schedule,
        })
    }

    #[test]
    fn catalog_matches_rule_ids() {
        let mut s = base();
        s.stability_score = 70.0;
        s.net_cash_flow = 4_000_000.0;
        s.cash_flow_trend = trend(&[3.0, 2.0, 1.0]);
        s.expense_breakdown = vec![
            expense("COGS", 10.0, 40.0),
            expense("Logistics", 10.0, 40.0),
            expense("Payroll", 10.0, 40.0),
        ];
        let mut low = s.clone();
        low.stability_score = 10.0;

        let fired: Vec<String> = CATALOG
            .iter()
            .enumerate()
            .filter_map(|(i, rule)| if i == 0 { run(*rule, &low) } else { run(*rule, &s) })
            .map(|a| a.id)
            .collect();
        assert_eq!(fired, RULE_IDS.to_vec());
    }

    #[test]
    fn runway_floors_and_goes_negative() {
        let mut s = base();
        s.stability_score = 40.0;
        s.net_cash_flow = -250_000.0;
        let alert = run(cash_crunch, &s).unwrap();
        // -7.5 floors to -8.
        assert!(alert.description.ends_with("~-8 days."), "{}", alert.description);
    }

    #[test]
    fn declining_trend_only_looks_at_last_three() {
        let mut s = base();
        s.cash_flow_trend = trend(&[1.0, 5.0, 4.0, 3.0]);
        assert!(run(declining_trend, &s).is_some());

        s.cash_flow_trend = trend(&[5.0, 4.0, 3.0, 3.0]);
        assert!(run(declining_trend, &s).is_none());

        s.cash_flow_trend = trend(&[5.0, 4.0]);
        assert!(run(declining_trend, &s).is_none());
    }

    #[test]
    fn declining_trend_requires_strict_decrease() {
        let mut s = base();
        s.cash_flow_trend = trend(&[5.0, 5.0, 4.0]);
        assert!(run(declining_trend, &s).is_none());
    }

    #[test]
    fn category_rules_use_first_match_only() {
        let mut s = base();
        s.expense_breakdown = vec![
            expense("COGS / Inventory", 1_000.0, 10.0),
            expense("COGS / Freight", 9_000.0, 90.0),
        ];
        assert!(run(high_cogs, &s).is_none());
    }

    #[test]
    fn category_match_is_case_sensitive() {
        let mut s = base();
        s.expense_breakdown = vec![expense("logistics", 1_000.0, 50.0)];
        assert!(run(logistics, &s).is_none());
    }

    #[test]
    fn thresholds_are_strict() {
        let mut s = base();
        s.expense_breakdown = vec![
            expense("Logistics", 1_000.0, 15.0),
            expense("Payroll", 1_000.0, 22.0),
        ];
        assert!(run(logistics, &s).is_none());
        assert!(run(payroll, &s).is_none());

        s.expense_breakdown = vec![
            expense("Logistics", 1_000.0, 15.1),
            expense("Payroll", 1_000.0, 22.1),
        ];
        assert!(run(logistics, &s).is_some());
        assert!(run(payroll, &s).is_some());
    }

    #[test]
    fn growth_needs_both_conditions() {
        let mut s = base();
        s.net_cash_flow = 3_000_001.0;
        s.stability_score = 65.0;
        assert!(run(growth, &s).is_none());
        s.stability_score = 65.5;
        assert!(run(growth, &s).is_some());
        s.net_cash_flow = 3_000_000.0;
        assert!(run(growth, &s).is_none());
    }

    #[test]
    fn nan_inputs_suppress_threshold_rules() {
        let mut s = base();
        s.stability_score = f64::NAN;
        s.expense_breakdown = vec![expense("COGS", 1.0, f64::NAN)];
        assert!(run(cash_crunch, &s).is_none());
        assert!(run(high_cogs, &s).is_none());
        assert!(run(tax_deadline, &s).is_some());
    }

    #[test]
    fn tax_falls_back_when_calendar_is_exhausted() {
        let ctx = ctx();
        let schedule = TaxSchedule {
            recurring: vec![],
            dated: vec![],
        };
        let s = base();
        let alert = tax_deadline(&RuleInput {
            snapshot: &s,
            ctx: &ctx,
            tax_schedule: &schedule,
        })
        .unwrap();
        assert!(alert.description.starts_with("No upcoming filings"));
        assert_eq!(alert.potential_savings, None);
    }

    #[test]
    fn halfway_percentages_round_up_in_descriptions() {
        let mut s = base();
        s.stability_score = 59.75;
        s.expense_breakdown = vec![
            expense("COGS", 1_000.0, 30.25),
            expense("Logistics", 1_000.0, 15.25),
            expense("Payroll", 1_000.0, 22.25),
        ];
        assert_eq!(
            run(payroll, &s).unwrap().description,
            "Payroll is 22.3% of expenses (recommended: <22%)."
        );
        assert!(run(high_cogs, &s).unwrap().description.starts_with("COGS is 30.3%"));
        assert!(run(logistics, &s).unwrap().description.starts_with("Logistics costs are 15.3%"));
        assert!(run(cash_crunch, &s).unwrap().description.starts_with("Your stability score is 59.8/100."));
    }

    #[test]
    fn negative_zero_runway_prints_as_zero() {
        let mut s = base();
        s.stability_score = 59.75;
        s.net_cash_flow = -0.0;
        let alert = run(cash_crunch, &s).unwrap();
        assert!(alert.description.ends_with("~0 days."), "{}", alert.description);
    }
}
