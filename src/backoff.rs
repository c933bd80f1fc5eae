use std::time::Duration;

/// Backoff that gives up once `budget` has elapsed. The ranked list is fetched
/// while a request may hold the cache lock, so the budget has to stay within
/// the cache timing rather than a fixed retry window.
pub(crate) fn backoff_within(budget: Duration) -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoffBuilder::new()
        .with_initial_interval((budget / 10).min(Duration::from_millis(500)))
        .with_max_interval(budget / 4)
        .with_max_elapsed_time(Some(budget))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoff::backoff::Backoff;

    #[test]
    fn test_intervals_fit_in_budget() {
        let budget = Duration::from_secs(3);
        let mut backoff = backoff_within(budget);

        assert_eq!(backoff.max_elapsed_time, Some(budget));
        assert!(backoff.initial_interval <= Duration::from_millis(300));
        for _ in 0..10 {
            let wait = backoff.next_backoff().unwrap();
            // Default randomization is +-50% around the capped interval.
            assert!(wait <= budget / 4 + budget / 8);
        }
    }
}
