//! Due-date urgency classification for maintenance records.
//!
//! Everything here is pure: callers pass the reference date explicitly, so the
//! dashboard queries and the unit tests share the exact same bucketing logic.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Due dates within this many days of the reference date are `urgent`.
pub const URGENT_WINDOW_DAYS: i64 = 7;

/// Due dates within this many days of the reference date are still relevant
/// to the dashboard. Anything further out is `ok`.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;

/// Urgency bucket derived from a maintenance due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyStatus {
    Overdue,
    Urgent,
    Upcoming,
    Ok,
}

impl UrgencyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyStatus::Overdue => "overdue",
            UrgencyStatus::Urgent => "urgent",
            UrgencyStatus::Upcoming => "upcoming",
            UrgencyStatus::Ok => "ok",
        }
    }

    /// Sort rank for dashboard listings: most pressing first.
    pub fn rank(&self) -> u8 {
        match self {
            UrgencyStatus::Overdue => 0,
            UrgencyStatus::Urgent => 1,
            UrgencyStatus::Upcoming => 2,
            UrgencyStatus::Ok => 3,
        }
    }
}

impl std::fmt::Display for UrgencyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected value for the dashboard `status` filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown urgency status: {0}")]
pub struct ParseUrgencyError(String);

impl std::str::FromStr for UrgencyStatus {
    type Err = ParseUrgencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overdue" => Ok(UrgencyStatus::Overdue),
            "urgent" => Ok(UrgencyStatus::Urgent),
            "upcoming" => Ok(UrgencyStatus::Upcoming),
            "ok" => Ok(UrgencyStatus::Ok),
            _ => Err(ParseUrgencyError(s.to_string())),
        }
    }
}

/// Parse a stored `YYYY-MM-DD` calendar date. Returns None on any malformed
/// input rather than an error; classification fails open to `Ok`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Classify a single nullable due date against a reference date.
pub fn classify(due: Option<&str>, today: NaiveDate) -> UrgencyStatus {
    let due = match due.and_then(parse_date) {
        Some(d) => d,
        None => return UrgencyStatus::Ok,
    };
    classify_date(due, today)
}

/// Classify an already-parsed due date against a reference date.
pub fn classify_date(due: NaiveDate, today: NaiveDate) -> UrgencyStatus {
    if due < today {
        UrgencyStatus::Overdue
    } else if due <= today + Duration::days(URGENT_WINDOW_DAYS) {
        UrgencyStatus::Urgent
    } else if due <= today + Duration::days(UPCOMING_WINDOW_DAYS) {
        UrgencyStatus::Upcoming
    } else {
        UrgencyStatus::Ok
    }
}

/// Per-asset aggregate over its maintenance due dates.
///
/// Only dates inside the 30-day dashboard window count: `soonest` is the
/// minimum such date and `within_window` how many there are. Dates past the
/// window, missing dates, and unparseable dates are all ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DueRollup {
    pub soonest: Option<NaiveDate>,
    pub within_window: i64,
}

impl DueRollup {
    pub fn status(&self, today: NaiveDate) -> UrgencyStatus {
        match self.soonest {
            Some(d) => classify_date(d, today),
            None => UrgencyStatus::Ok,
        }
    }
}

/// Roll up an asset's due dates: keep those within `today + 30d`, track the
/// soonest and the count.
pub fn rollup<'a, I>(dues: I, today: NaiveDate) -> DueRollup
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let horizon = today + Duration::days(UPCOMING_WINDOW_DAYS);
    let mut agg = DueRollup::default();

    for due in dues.into_iter().flatten().filter_map(parse_date) {
        if due > horizon {
            continue;
        }
        agg.within_window += 1;
        agg.soonest = match agg.soonest {
            Some(current) if current <= due => Some(current),
            _ => Some(due),
        };
    }

    agg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_classify_thresholds() {
        let today = day("2025-03-15");

        assert_eq!(classify(Some("2025-03-14"), today), UrgencyStatus::Overdue);
        assert_eq!(classify(Some("2024-01-01"), today), UrgencyStatus::Overdue);

        // Today through today+7 inclusive is urgent
        assert_eq!(classify(Some("2025-03-15"), today), UrgencyStatus::Urgent);
        assert_eq!(classify(Some("2025-03-22"), today), UrgencyStatus::Urgent);

        // today+8 through today+30 inclusive is upcoming
        assert_eq!(classify(Some("2025-03-23"), today), UrgencyStatus::Upcoming);
        assert_eq!(classify(Some("2025-04-14"), today), UrgencyStatus::Upcoming);

        // Past the 30-day horizon
        assert_eq!(classify(Some("2025-04-15"), today), UrgencyStatus::Ok);
        assert_eq!(classify(Some("2026-01-01"), today), UrgencyStatus::Ok);
    }

    #[test]
    fn test_classify_missing_or_invalid_is_ok() {
        let today = day("2025-03-15");

        assert_eq!(classify(None, today), UrgencyStatus::Ok);
        assert_eq!(classify(Some(""), today), UrgencyStatus::Ok);
        assert_eq!(classify(Some("not-a-date"), today), UrgencyStatus::Ok);
        assert_eq!(classify(Some("2025-13-40"), today), UrgencyStatus::Ok);
        assert_eq!(classify(Some("15/03/2025"), today), UrgencyStatus::Ok);
    }

    #[test]
    fn test_classify_covers_every_offset() {
        // Exactly one bucket for any date in a wide window around today.
        let today = day("2025-03-15");
        for offset in -60..=60 {
            let due = today + Duration::days(offset);
            let status = classify_date(due, today);
            let expected = if offset < 0 {
                UrgencyStatus::Overdue
            } else if offset <= URGENT_WINDOW_DAYS {
                UrgencyStatus::Urgent
            } else if offset <= UPCOMING_WINDOW_DAYS {
                UrgencyStatus::Upcoming
            } else {
                UrgencyStatus::Ok
            };
            assert_eq!(status, expected, "offset {}", offset);
        }
    }

    #[test]
    fn test_rollup_picks_soonest_within_window() {
        let today = day("2025-03-15");
        // T-1, T+5, T+20 are inside the window; T+40 is excluded.
        let dues = vec![
            Some("2025-03-14"),
            Some("2025-03-20"),
            Some("2025-04-04"),
            Some("2025-04-24"),
        ];

        let agg = rollup(dues, today);
        assert_eq!(agg.soonest, Some(day("2025-03-14")));
        assert_eq!(agg.within_window, 3);
        assert_eq!(agg.status(today), UrgencyStatus::Overdue);
    }

    #[test]
    fn test_rollup_ignores_missing_and_invalid() {
        let today = day("2025-03-15");
        let dues = vec![None, Some("garbage"), Some("2025-03-20"), None];

        let agg = rollup(dues, today);
        assert_eq!(agg.soonest, Some(day("2025-03-20")));
        assert_eq!(agg.within_window, 1);
        assert_eq!(agg.status(today), UrgencyStatus::Urgent);
    }

    #[test]
    fn test_rollup_empty_is_ok() {
        let today = day("2025-03-15");
        let agg = rollup(Vec::<Option<&str>>::new(), today);
        assert_eq!(agg.soonest, None);
        assert_eq!(agg.within_window, 0);
        assert_eq!(agg.status(today), UrgencyStatus::Ok);
    }

    #[test]
    fn test_status_parse_and_display() {
        for s in ["overdue", "urgent", "upcoming", "ok"] {
            let status: UrgencyStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
        assert!("atrasada".parse::<UrgencyStatus>().is_err());
        assert!("".parse::<UrgencyStatus>().is_err());
    }

    #[test]
    fn test_rank_orders_most_pressing_first() {
        assert!(UrgencyStatus::Overdue.rank() < UrgencyStatus::Urgent.rank());
        assert!(UrgencyStatus::Urgent.rank() < UrgencyStatus::Upcoming.rank());
        assert!(UrgencyStatus::Upcoming.rank() < UrgencyStatus::Ok.rank());
    }
}
