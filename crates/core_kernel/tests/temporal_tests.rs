//! Tests for clocks and validity windows

use chrono::{Duration, TimeZone, Utc};
use core_kernel::{Clock, FixedClock, SystemClock, TemporalError, ValidityWindow};

mod validity_window {
    use super::*;

    mod creation {
        use super::*;

        #[test]
        fn test_new_rejects_inverted_window() {
            let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
            let end = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
            assert!(matches!(
                ValidityWindow::new(start, end),
                Err(TemporalError::InvalidWindow { .. })
            ));
        }

        #[test]
        fn test_new_rejects_empty_window() {
            let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
            assert!(ValidityWindow::new(start, start).is_err());
        }

        #[test]
        fn test_days_from_thirty_days_exactly() {
            let start = Utc.with_ymd_and_hms(2025, 2, 10, 14, 5, 9).unwrap();
            let window = ValidityWindow::days_from(start, 30).unwrap();
            assert_eq!(window.expires_at - window.starts_at, Duration::days(30));
            assert_eq!(window.expires_at, Utc.with_ymd_and_hms(2025, 3, 12, 14, 5, 9).unwrap());
        }

        #[test]
        fn test_days_from_past_max_date_rejected() {
            let start = Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap();
            assert!(matches!(
                ValidityWindow::days_from(start, 365 * 300_000),
                Err(TemporalError::OutOfRange { .. })
            ));
        }

        #[test]
        fn test_days_from_negative_rejected() {
            let start = Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap();
            assert_eq!(
                ValidityWindow::days_from(start, -3),
                Err(TemporalError::NonPositiveLength(-3))
            );
        }
    }

    mod expiry {
        use super::*;

        #[test]
        fn test_not_expired_inside_window() {
            let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
            let window = ValidityWindow::days_from(start, 30).unwrap();
            assert!(!window.is_expired_at(start + Duration::days(10)));
        }

        #[test]
        fn test_expired_after_end() {
            let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
            let window = ValidityWindow::days_from(start, 30).unwrap();
            assert!(window.is_expired_at(start + Duration::days(31)));
        }

        #[test]
        fn test_window_serializes_both_bounds() {
            let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
            let window = ValidityWindow::days_from(start, 30).unwrap();
            let json = serde_json::to_value(window).unwrap();
            assert!(json.get("starts_at").is_some());
            assert!(json.get("expires_at").is_some());
        }
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_set() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let later = Utc.with_ymd_and_hms(2030, 7, 4, 12, 0, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
