pub mod alerts;
pub mod dataset;
pub mod domain;
pub mod format;
pub mod health;
pub mod tax;
pub mod time;

pub use alerts::{evaluate, AlertEngine, EvaluationContext};

pub mod config {
    use crate::alerts::{AlertEngine, EvaluationContext};
    use crate::dataset::DashboardDataset;
    use crate::tax::TaxSchedule;
    use anyhow::Context;
    use std::path::{Path, PathBuf};

    const DEFAULT_PORT: u16 = 3000;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub dashboard_data_path: Option<PathBuf>,
        pub tax_schedule_path: Option<PathBuf>,
        pub reference_date: Option<String>,
        pub port: Option<u16>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                dashboard_data_path: non_empty_var("FINEDGE_DASHBOARD_DATA").map(PathBuf::from),
                tax_schedule_path: non_empty_var("FINEDGE_TAX_SCHEDULE").map(PathBuf::from),
                reference_date: non_empty_var("FINEDGE_REFERENCE_DATE"),
                port: non_empty_var("PORT").and_then(|v| v.trim().parse().ok()),
            })
        }

        pub fn port_or_default(&self) -> u16 {
            self.port.unwrap_or(DEFAULT_PORT)
        }

        pub fn require_dashboard_data_path(&self) -> anyhow::Result<&Path> {
            self.dashboard_data_path
                .as_deref()
                .context("FINEDGE_DASHBOARD_DATA is required")
        }

        pub fn load_dashboard(&self) -> anyhow::Result<DashboardDataset> {
            DashboardDataset::load(self.require_dashboard_data_path()?)
        }

        /// Configured tax calendar, or the built-in monthly PAYE/VAT/WHT schedule.
        pub fn load_tax_schedule(&self) -> anyhow::Result<TaxSchedule> {
            match self.tax_schedule_path.as_deref() {
                Some(path) => TaxSchedule::load(path),
                None => Ok(TaxSchedule::default()),
            }
        }

        pub fn build_engine(&self) -> anyhow::Result<AlertEngine> {
            Ok(AlertEngine::new(self.load_tax_schedule()?))
        }

        /// Context for an evaluation happening now, honouring a pinned reference date.
        pub fn evaluation_context(&self) -> anyhow::Result<EvaluationContext> {
            let now = chrono::Utc::now();
            let reference_date =
                crate::time::wat::resolve_reference_date(self.reference_date.as_deref(), now)?;
            Ok(EvaluationContext::new(reference_date, now))
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        #[test]
        fn defaults_to_builtin_tax_schedule() {
            let settings = Settings::default();
            assert_eq!(settings.load_tax_schedule().unwrap(), TaxSchedule::default());
            assert!(settings.require_dashboard_data_path().is_err());
            assert_eq!(settings.port_or_default(), 3000);

            let pinned = Settings {
                port: Some(8080),
                ..Settings::default()
            };
            assert_eq!(pinned.port_or_default(), 8080);
        }

        #[test]
        fn pinned_reference_date_is_used() {
            let settings = Settings {
                reference_date: Some("2025-12-11".to_string()),
                ..Settings::default()
            };
            let ctx = settings.evaluation_context().unwrap();
            assert_eq!(ctx.reference_date, NaiveDate::from_ymd_opt(2025, 12, 11).unwrap());
        }

        #[test]
        fn loads_bundled_files() {
            let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
            let settings = Settings {
                dashboard_data_path: Some(root.join("dashboard.json")),
                tax_schedule_path: Some(root.join("tax_schedule.json")),
                ..Settings::default()
            };
            assert_eq!(settings.load_dashboard().unwrap().latest().month, "Nov 2025");
            assert_eq!(settings.load_tax_schedule().unwrap().dated.len(), 1);
        }
    }
}
