//! Week numbering for the weekly loot rotation.
//!
//! Lootpools and raidpools rotate every Friday at 18:00 UTC. Week numbers
//! count whole 7-day periods since a fixed reference rotation instant, so the
//! same week number always refers to the same pool contents regardless of
//! when the query is made.

use chrono::{DateTime, TimeZone, Utc};

use crate::entities::PoolWindow;
use crate::error::DomainError;

/// Unix timestamp of the reference rotation: Friday 2024-07-05 18:00:00 UTC.
/// Week 0 starts here.
pub const ROTATION_ANCHOR_UNIX: i64 = 1_720_202_400;

const WEEK_SECONDS: i64 = 7 * 86_400;

/// The reference rotation instant (week 0 start).
pub fn rotation_anchor() -> DateTime<Utc> {
    // The anchor constant is verified by tests; fallback is unreachable.
    Utc.timestamp_opt(ROTATION_ANCHOR_UNIX, 0)
        .single()
        .unwrap_or_default()
}

/// Week number containing `timestamp`.
///
/// Timestamps before the anchor have no week number and are an error.
pub fn week_number(timestamp: DateTime<Utc>) -> Result<u32, DomainError> {
    let elapsed = timestamp.timestamp() - ROTATION_ANCHOR_UNIX;
    if elapsed < 0 {
        return Err(DomainError::BeforeRotationAnchor {
            timestamp,
            anchor: rotation_anchor(),
        });
    }
    Ok((elapsed / WEEK_SECONDS) as u32)
}

/// Start and end instants of the given rotation week.
///
/// The window is half-open: `start <= t < end`.
pub fn week_window(week: u32) -> PoolWindow {
    let start_unix = ROTATION_ANCHOR_UNIX + i64::from(week) * WEEK_SECONDS;
    // Instants past chrono's range saturate; a fabricated epoch window would
    // be worse than a pinned far-future one.
    let start = Utc
        .timestamp_opt(start_unix, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let end = Utc
        .timestamp_opt(start_unix + WEEK_SECONDS, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    PoolWindow { week, start, end }
}

/// Week number for the current instant.
pub fn current_week(now: DateTime<Utc>) -> Result<u32, DomainError> {
    week_number(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Weekday};

    #[test]
    fn anchor_is_a_friday_at_reset_time() {
        let anchor = rotation_anchor();
        assert_eq!(anchor.weekday(), Weekday::Fri);
        assert_eq!(anchor.hour(), 18);
        assert_eq!(anchor.minute(), 0);
    }

    #[test]
    fn anchor_is_week_zero() {
        assert_eq!(week_number(rotation_anchor()), Ok(0));
    }

    #[test]
    fn instant_before_anchor_is_rejected() {
        let before = rotation_anchor() - chrono::Duration::seconds(1);
        assert!(matches!(
            week_number(before),
            Err(DomainError::BeforeRotationAnchor { .. })
        ));
    }

    #[test]
    fn last_second_of_week_zero() {
        let t = rotation_anchor() + chrono::Duration::days(7) - chrono::Duration::seconds(1);
        assert_eq!(week_number(t), Ok(0));
    }

    #[test]
    fn first_second_of_week_one() {
        let t = rotation_anchor() + chrono::Duration::days(7);
        assert_eq!(week_number(t), Ok(1));
    }

    #[test]
    fn window_bounds_match_week_number() {
        let window = week_window(42);
        assert_eq!(window.week, 42);
        assert_eq!(week_number(window.start), Ok(42));
        assert_eq!(
            week_number(window.end - chrono::Duration::seconds(1)),
            Ok(42)
        );
        assert_eq!(week_number(window.end), Ok(43));
    }

    #[test]
    fn windows_are_contiguous() {
        assert_eq!(week_window(9).end, week_window(10).start);
    }

    #[test]
    fn out_of_range_week_saturates_instead_of_wrapping_to_epoch() {
        let window = week_window(u32::MAX);
        assert_eq!(window.start, DateTime::<Utc>::MAX_UTC);
        assert_eq!(window.end, DateTime::<Utc>::MAX_UTC);
        assert!(window.start > rotation_anchor());
    }
}
