use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finedge_core::alerts::summary::{badge_count, filter_alerts, AlertSummary, UrgencyFilter};
use finedge_core::config::Settings;
use finedge_core::domain::alert::Alert;
use finedge_core::domain::snapshot::FinancialSnapshot;
use finedge_core::format::format_naira;

#[derive(Debug, Parser)]
#[command(name = "finedge_cli", about = "Evaluate smart alerts for a financial snapshot")]
struct Args {
    /// Snapshot JSON file to evaluate; `-` reads stdin.
    #[arg(long, conflicts_with = "month")]
    snapshot: Option<PathBuf>,

    /// Dashboard month to evaluate (e.g. "Nov 2025"). Defaults to the latest month.
    #[arg(long)]
    month: Option<String>,

    /// Dashboard dataset JSON. Overrides FINEDGE_DASHBOARD_DATA.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Reference date for the tax calendar (YYYY-MM-DD). Defaults to today's Lagos date.
    #[arg(long)]
    as_of_date: Option<String>,

    /// Only print alerts of this tier: all, critical, medium or info.
    #[arg(long, default_value = "all")]
    urgency: UrgencyFilter,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match run(args, settings) {
        Ok(rendered) => {
            println!("{rendered}");
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "alert evaluation failed");
            Err(err)
        }
    }
}

fn run(args: Args, mut settings: Settings) -> anyhow::Result<String> {
    if let Some(d) = args.as_of_date {
        settings.reference_date = Some(d);
    }
    if let Some(path) = args.data {
        settings.dashboard_data_path = Some(path);
    }

    let snapshot = match args.snapshot.as_deref() {
        Some(path) => read_snapshot(path)?,
        None => {
            let dataset = settings.load_dashboard()?;
            let record = match args.month.as_deref() {
                Some(month) => dataset
                    .get(month)
                    .with_context(|| format!("month {month:?} not found in dashboard dataset"))?,
                None => dataset.latest(),
            };
            tracing::info!(month = %record.month, "evaluating dashboard month");
            record.to_snapshot()
        }
    };

    let engine = settings.build_engine()?;
    let ctx = settings.evaluation_context()?;
    let all = engine.evaluate(&snapshot, &ctx);
    let summary = AlertSummary::from_alerts(&all);
    let shown = filter_alerts(&all, args.urgency);

    tracing::info!(
        reference_date = %ctx.reference_date,
        total = summary.total,
        shown = shown.len(),
        "alerts evaluated"
    );

    match args.output {
        OutputFormat::Text => Ok(render_text(&shown, &summary)),
        OutputFormat::Json => {
            let out = serde_json::json!({
                "filter": args.urgency,
                "alerts": shown,
                "summary": summary,
                "badge_count": badge_count(&all),
            });
            Ok(serde_json::to_string_pretty(&out)?)
        }
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<FinancialSnapshot> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read snapshot from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?
    };

    serde_json::from_str(&raw).context("snapshot is not valid JSON for the snapshot schema")
}

fn render_text(alerts: &[Alert], summary: &AlertSummary) -> String {
    let mut out = String::new();
    if alerts.is_empty() {
        out.push_str("No alerts in this category\n");
    }

    for alert in alerts {
        out.push_str(&format!(
            "[{}] {} ({})\n  {}\n  Action: {}\n  If ignored: {}\n",
            alert.urgency.label(),
            alert.title,
            alert.kind.label(),
            alert.description,
            alert.recommended_action,
            alert.impact_if_ignored,
        ));
        if let Some(savings) = alert.potential_savings {
            out.push_str(&format!("  Potential impact: {}\n", format_naira(savings)));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "{} active alerts, {} require attention",
        summary.total,
        summary.requires_attention()
    ));
    out
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
