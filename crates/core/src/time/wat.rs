use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};

// West Africa Time (Lagos), no daylight saving.
const WAT_OFFSET_SECS: i32 = 3600;

/// Date used for calendar-relative rules: the explicit `YYYY-MM-DD` argument when given,
/// otherwise today's date in Lagos.
pub fn resolve_reference_date(
    reference_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = reference_date_arg {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid reference date {s:?} (expected YYYY-MM-DD)"));
    }

    let wat = chrono::FixedOffset::east_opt(WAT_OFFSET_SECS).context("invalid WAT offset")?;
    Ok(now_utc.with_timezone(&wat).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn explicit_argument_wins() {
        let now = Utc.with_ymd_and_hms(2026, 1, 3, 8, 0, 0).unwrap();
        let d = resolve_reference_date(Some("2025-12-11"), now).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 12, 11).unwrap());
    }

    #[test]
    fn late_utc_evening_is_next_day_in_lagos() {
        // 2025-12-31 23:30 UTC = 2026-01-01 00:30 WAT
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 30, 0).unwrap();
        let d = resolve_reference_date(None, now).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn same_day_before_offset_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 22, 59, 0).unwrap();
        let d = resolve_reference_date(None, now).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn rejects_malformed_argument() {
        let now = Utc.with_ymd_and_hms(2026, 1, 3, 8, 0, 0).unwrap();
        assert!(resolve_reference_date(Some("11/12/2025"), now).is_err());
    }
}
