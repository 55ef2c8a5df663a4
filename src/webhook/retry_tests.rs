//! Tests for `RetryPolicy`.

use super::RetryPolicy;
use std::time::Duration;

mod defaults {
    use super::*;

    #[test]
    fn new_matches_default_constants() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(2));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
        assert!((policy.multiplier - 2.0).abs() < f64::EPSILON);
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn no_retry_makes_a_single_attempt() {
        let policy = RetryPolicy::no_retry();

        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.should_retry(1));
        assert_eq!(policy.delays().count(), 0);
    }
}

mod builder {
    use super::*;

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        assert_eq!(RetryPolicy::new().with_max_attempts(0).max_attempts, 1);
    }

    #[test]
    fn invalid_multiplier_is_ignored() {
        for bad in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let policy = RetryPolicy::new().with_multiplier(bad);
            assert!((policy.multiplier - RetryPolicy::DEFAULT_MULTIPLIER).abs() < f64::EPSILON);
        }
        let policy = RetryPolicy::new().with_multiplier(1.5);
        assert!((policy.multiplier - 1.5).abs() < f64::EPSILON);
    }
}

mod schedule {
    use super::*;

    #[test]
    fn delays_grow_exponentially() {
        let policy = RetryPolicy::new()
            .with_max_attempts(4)
            .with_initial_delay(Duration::from_millis(100));

        let delays: Vec<_> = policy.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
    }

    #[test]
    fn delays_are_capped() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_secs(10))
            .with_max_delay(Duration::from_secs(15));

        assert_eq!(policy.delay_for_retry(0), Duration::from_secs(10));
        assert_eq!(policy.delay_for_retry(1), Duration::from_secs(15));
        assert_eq!(policy.delay_for_retry(40), Duration::from_secs(15));
    }

    #[test]
    fn huge_retry_numbers_stay_at_cap() {
        let policy = RetryPolicy::new();
        assert_eq!(policy.delay_for_retry(u32::MAX), policy.max_delay);
    }

    #[test]
    fn zero_initial_delay_stays_zero() {
        let policy = RetryPolicy::new().with_initial_delay(Duration::ZERO);
        assert!(policy.delays().all(|d| d == Duration::ZERO));
    }

    #[test]
    fn should_retry_counts_attempts() {
        let policy = RetryPolicy::new();

        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }
}
