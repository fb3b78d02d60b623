use anyhow::{ensure, Context};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A filing due every month on `day_of_month`, clamped to the last day of shorter months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringFiling {
    pub name: String,
    pub day_of_month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedFiling {
    pub name: String,
    pub due: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSchedule {
    #[serde(default)]
    pub recurring: Vec<RecurringFiling>,
    #[serde(default)]
    pub dated: Vec<DatedFiling>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub due: NaiveDate,
    pub filings: Vec<String>,
    pub days_left: i64,
}

/// How close a deadline is: a week or less is critical, two weeks or less a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineUrgency {
    Critical,
    Warning,
    Normal,
}

impl DeadlineUrgency {
    pub fn from_days_left(days_left: i64) -> Self {
        if days_left <= 7 {
            DeadlineUrgency::Critical
        } else if days_left <= 14 {
            DeadlineUrgency::Warning
        } else {
            DeadlineUrgency::Normal
        }
    }
}

impl Default for TaxSchedule {
    fn default() -> Self {
        let monthly = |name: &str, day_of_month| RecurringFiling {
            name: name.to_string(),
            day_of_month,
        };
        Self {
            recurring: vec![monthly("PAYE", 10), monthly("VAT", 21), monthly("WHT", 21)],
            dated: Vec::new(),
        }
    }
}

impl TaxSchedule {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let schedule = serde_json::from_str::<Self>(s).context("tax schedule is not valid JSON")?;
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tax schedule {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("invalid tax schedule {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        for filing in &self.recurring {
            ensure!(!filing.name.trim().is_empty(), "filing name must be non-empty");
            ensure!(
                (1..=31).contains(&filing.day_of_month),
                "day_of_month must be 1..=31 for {} (got {})",
                filing.name,
                filing.day_of_month
            );
        }
        for filing in &self.dated {
            ensure!(!filing.name.trim().is_empty(), "filing name must be non-empty");
        }
        Ok(())
    }

    /// Earliest due date on or after `reference`, with every filing due that day.
    pub fn next_deadline(&self, reference: NaiveDate) -> Option<Deadline> {
        let candidates: Vec<(NaiveDate, &str)> = self
            .recurring
            .iter()
            .filter_map(|f| f.next_due(reference).map(|d| (d, f.name.as_str())))
            .chain(
                self.dated
                    .iter()
                    .filter(|f| f.due >= reference)
                    .map(|f| (f.due, f.name.as_str())),
            )
            .collect();

        let due = candidates.iter().map(|(d, _)| *d).min()?;
        let filings = candidates
            .iter()
            .filter(|(d, _)| *d == due)
            .map(|(_, name)| name.to_string())
            .collect();

        Some(Deadline {
            due,
            filings,
            days_left: (due - reference).num_days(),
        })
    }
}

impl RecurringFiling {
    fn next_due(&self, reference: NaiveDate) -> Option<NaiveDate> {
        let this_month = due_in_month(reference.year(), reference.month(), self.day_of_month)?;
        if this_month >= reference {
            return Some(this_month);
        }
        let (year, month) = if reference.month() == 12 {
            (reference.year() + 1, 1)
        } else {
            (reference.year(), reference.month() + 1)
        };
        due_in_month(year, month, self.day_of_month)
    }
}

impl Deadline {
    pub fn urgency_level(&self) -> DeadlineUrgency {
        DeadlineUrgency::from_days_left(self.days_left)
    }

    /// "VAT", "VAT and WHT", "PAYE, VAT and WHT".
    pub fn filings_label(&self) -> String {
        match self.filings.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [init @ .., last] => format!("{} and {last}", init.join(", ")),
        }
    }

    pub fn describe(&self) -> String {
        let remaining = match self.days_left {
            0 => "due today".to_string(),
            1 => "1 day left".to_string(),
            n => format!("{n} days left"),
        };
        format!(
            "{} filings due by {} ({remaining}).",
            self.filings_label(),
            self.due.format("%b %-d, %Y")
        )
    }
}

fn due_in_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)?))
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}
