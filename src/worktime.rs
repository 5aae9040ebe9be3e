//! Wall-clock shift time helpers.
//!
//! All times are local `HH:MM` strings without a date or timezone. A shift
//! whose end time is earlier than its start time crosses midnight.

use chrono::NaiveTime;

/// Parses an `HH:MM` string into minutes since midnight.
///
/// Returns `None` for anything that is not a valid 24h wall-clock time.
#[must_use]
pub fn time_to_minutes(value: &str) -> Option<u32> {
    let time = NaiveTime::parse_from_str(value, "%H:%M").ok()?;
    use chrono::Timelike;
    Some(time.hour() * 60 + time.minute())
}

/// Formats minutes since midnight back into `HH:MM`, wrapping past 24h.
#[must_use]
pub fn minutes_to_time(minutes: u32) -> String {
    let hours = (minutes / 60) % 24;
    let mins = minutes % 60;
    format!("{hours:02}:{mins:02}")
}

/// Computes elapsed hours between two wall-clock times.
///
/// When `end < start` the shift is treated as crossing midnight and a full
/// day is added before subtracting. `start == end` yields 0.0, which callers
/// must reject as a degenerate submission.
///
/// Returns `None` when either input is not a valid `HH:MM` time.
#[must_use]
pub fn calculate_duration(start: &str, end: &str) -> Option<f64> {
    let start_min = time_to_minutes(start)?;
    let mut end_min = time_to_minutes(end)?;

    if end_min < start_min {
        end_min += 24 * 60;
    }

    Some(f64::from(end_min - start_min) / 60.0)
}

/// Rounds an hour value to two decimals, matching what is stored on a
/// request record.
#[must_use]
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Human-readable duration, e.g. `9 h 0 min (9.00 h)`.
#[must_use]
pub fn format_duration(hours: f64) -> String {
    let whole = hours.floor();
    let minutes = ((hours - whole) * 60.0).round();
    format!("{whole:.0} h {minutes:.0} min ({hours:.2} h)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!(time_to_minutes("00:00"), Some(0));
        assert_eq!(time_to_minutes("07:30"), Some(450));
        assert_eq!(time_to_minutes("23:59"), Some(1439));
    }

    #[test]
    fn rejects_malformed_times() {
        assert_eq!(time_to_minutes("24:00"), None);
        assert_eq!(time_to_minutes("7:30pm"), None);
        assert_eq!(time_to_minutes("1930"), None);
        assert_eq!(time_to_minutes(""), None);
    }

    #[test]
    fn minutes_round_trip() {
        assert_eq!(minutes_to_time(450), "07:30");
        assert_eq!(minutes_to_time(0), "00:00");
        // Past-midnight minutes wrap back onto the clock face.
        assert_eq!(minutes_to_time(24 * 60 + 270), "04:30");
    }

    #[test]
    fn same_day_duration() {
        assert_eq!(calculate_duration("16:40", "19:00"), Some(7.0 / 3.0));
        assert_eq!(calculate_duration("07:30", "16:40"), Some(55.0 / 6.0));
    }

    #[test]
    fn overnight_duration_wraps() {
        // SHIFT 2 OFFDAY: 19:30 -> 04:30 crosses midnight and is 9 hours.
        assert_eq!(calculate_duration("19:30", "04:30"), Some(9.0));
        assert_eq!(calculate_duration("23:00", "01:00"), Some(2.0));
    }

    #[test]
    fn equal_times_are_zero() {
        assert_eq!(calculate_duration("08:00", "08:00"), Some(0.0));
    }

    #[test]
    fn invalid_input_is_none() {
        assert_eq!(calculate_duration("19:30", "oops"), None);
        assert_eq!(calculate_duration("oops", "04:30"), None);
    }

    #[test]
    fn rounding_to_two_decimals() {
        assert_eq!(round_hours(7.0 / 3.0), 2.33);
        assert_eq!(round_hours(9.0), 9.0);
    }

    #[test]
    fn formats_duration() {
        assert_eq!(format_duration(9.0), "9 h 0 min (9.00 h)");
        assert_eq!(format_duration(2.5), "2 h 30 min (2.50 h)");
    }
}
