//! Property-based tests for rotation arithmetic and capacity normalization

use operator_pool::balancer::rotation_index;
use operator_pool::types::operator::{normalize_max_sessions, OperatorId, OperatorRecord};
use operator_pool::types::DEFAULT_MAX_SESSIONS;
use proptest::prelude::*;

proptest! {
    #[test]
    fn rotation_index_stays_in_bounds(cursor in any::<usize>(), len in 1usize..1000) {
        let index = rotation_index(cursor, len).unwrap();
        prop_assert!(index < len);
    }

    #[test]
    fn rotation_index_visits_each_position_once(start in 0usize..1_000_000, len in 1usize..64) {
        let mut seen = vec![false; len];
        for step in 0..len {
            let index = rotation_index(start + step, len).unwrap();
            prop_assert!(!seen[index]);
            seen[index] = true;
        }
        prop_assert!(seen.iter().all(|v| *v));
        // K+1回目は1回目と同じ位置
        prop_assert_eq!(
            rotation_index(start + len, len),
            rotation_index(start, len)
        );
    }

    #[test]
    fn rotation_index_empty_set_has_no_position(cursor in any::<usize>()) {
        prop_assert_eq!(rotation_index(cursor, 0), None);
    }

    #[test]
    fn normalized_capacity_is_positive(declared in any::<i64>()) {
        let normalized = normalize_max_sessions(declared);
        prop_assert!(normalized >= 1);
        if declared <= 0 {
            prop_assert_eq!(normalized, DEFAULT_MAX_SESSIONS);
        } else if declared <= i64::from(u32::MAX) {
            prop_assert_eq!(i64::from(normalized), declared);
        }
    }

    #[test]
    fn eligibility_matches_flag_and_capacity(
        available in any::<bool>(),
        max_sessions in 1i64..20,
        active in 0u32..25,
    ) {
        let mut record = OperatorRecord::new(OperatorId::generate(), available, max_sessions);
        record.active_sessions = active;
        let expected = available && active < record.max_sessions;
        prop_assert_eq!(record.is_eligible(), expected);
    }
}
