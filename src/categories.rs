//! Fixed registry of overtime categories.
//!
//! Each category carries the default shift window it covers. Picking a
//! category pre-fills the start and end times of a submission, but the
//! submitted times win: duration is always computed from what the requester
//! actually entered.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OvertimeCategory {
    pub key: &'static str,
    pub name: &'static str,
    pub start_time: &'static str,
    pub end_time: &'static str,
}

/// The fixed category registry, in display order.
///
/// `shift2_offday` and `shift2_offday_longshift` are overnight spans.
pub const CATEGORIES: &[OvertimeCategory] = &[
    OvertimeCategory {
        key: "shift1_weekday",
        name: "SHIFT 1 WEEKDAY",
        start_time: "16:40",
        end_time: "19:00",
    },
    OvertimeCategory {
        key: "shift1_friday",
        name: "SHIFT 1 FRIDAY",
        start_time: "17:15",
        end_time: "19:05",
    },
    OvertimeCategory {
        key: "shift2_weekday",
        name: "SHIFT 2 WEEKDAY",
        start_time: "04:30",
        end_time: "06:50",
    },
    OvertimeCategory {
        key: "shift1_offday",
        name: "SHIFT 1 OFFDAY",
        start_time: "07:30",
        end_time: "16:40",
    },
    OvertimeCategory {
        key: "shift1_offday_friday",
        name: "SHIFT 1 OFFDAY FRIDAY",
        start_time: "07:30",
        end_time: "17:15",
    },
    OvertimeCategory {
        key: "shift2_offday",
        name: "SHIFT 2 OFFDAY",
        start_time: "19:30",
        end_time: "04:30",
    },
    OvertimeCategory {
        key: "shift1_offday_longshift",
        name: "SHIFT 1 OFFDAY LONGSHIFT",
        start_time: "07:30",
        end_time: "19:00",
    },
    OvertimeCategory {
        key: "shift2_offday_longshift",
        name: "SHIFT 2 OFFDAY LONGSHIFT",
        start_time: "19:30",
        end_time: "06:50",
    },
];

/// Looks up a category by its key.
#[must_use]
pub fn lookup(key: &str) -> Option<&'static OvertimeCategory> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// All registered categories in display order.
#[must_use]
pub const fn all() -> &'static [OvertimeCategory] {
    CATEGORIES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worktime::calculate_duration;

    #[test]
    fn registry_has_eight_entries() {
        assert_eq!(CATEGORIES.len(), 8);
    }

    #[test]
    fn keys_are_unique() {
        for (i, a) in CATEGORIES.iter().enumerate() {
            for b in &CATEGORIES[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn lookup_known_key() {
        let cat = lookup("shift2_offday").expect("registered category");
        assert_eq!(cat.name, "SHIFT 2 OFFDAY");
        assert_eq!(cat.start_time, "19:30");
        assert_eq!(cat.end_time, "04:30");
    }

    #[test]
    fn lookup_unknown_key() {
        assert!(lookup("shift3_weekday").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn default_windows_have_positive_duration() {
        for cat in CATEGORIES {
            let hours = calculate_duration(cat.start_time, cat.end_time)
                .expect("registry times are well-formed");
            assert!(hours > 0.0, "{} has a zero-length window", cat.key);
        }
    }

    #[test]
    fn overnight_category_duration() {
        let cat = lookup("shift2_offday").unwrap();
        assert_eq!(calculate_duration(cat.start_time, cat.end_time), Some(9.0));
    }
}
