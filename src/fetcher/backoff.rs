use rand::Rng;
use std::time::Duration;

/// Exponential backoff with ±30% jitter: `base * 2^attempt`, exponent capped at 10.
pub fn calculate_backoff_delay(attempt: u32, base: Duration) -> Duration {
    let capped_attempt = attempt.min(10);

    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(2_u64.saturating_pow(capped_attempt));

    let jitter_factor = rand::thread_rng().gen_range(0.7..1.3);
    let delay_with_jitter = (delay_ms as f64 * jitter_factor).round() as u64;

    Duration::from_millis(delay_with_jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_progression() {
        let base = Duration::from_millis(500);

        let delay0 = calculate_backoff_delay(0, base).as_millis();
        let delay1 = calculate_backoff_delay(1, base).as_millis();
        let delay2 = calculate_backoff_delay(2, base).as_millis();

        assert!((350..=650).contains(&delay0)); // 500ms ±30%
        assert!((700..=1300).contains(&delay1)); // 1s ±30%
        assert!((1400..=2600).contains(&delay2)); // 2s ±30%
    }

    #[test]
    fn test_backoff_cap() {
        let base = Duration::from_millis(100);

        // 100ms * 2^10 = 102.4s, with jitter 71.7s..133.1s
        let delay_high = calculate_backoff_delay(20, base).as_millis();
        let delay_capped = calculate_backoff_delay(10, base).as_millis();

        assert!((71_000..=134_000).contains(&delay_high));
        assert!((71_000..=134_000).contains(&delay_capped));
    }

    #[test]
    fn test_zero_base_never_waits() {
        assert_eq!(calculate_backoff_delay(3, Duration::ZERO), Duration::ZERO);
    }
}
