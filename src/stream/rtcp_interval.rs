use std::time::Duration;

use rand::Rng;

/// Next report delay: `max(average, floor)` scaled by a uniform factor in
/// [0.5, 1.5] so that peers do not synchronize their reports.
pub fn next_rtcp_interval<R: Rng + ?Sized>(average: Duration, floor: Duration, rng: &mut R) -> Duration {
    let base = average.max(floor);
    base.mul_f64(rng.gen_range(0.5..=1.5))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn stays_within_half_to_one_and_a_half() {
        let mut rng = StdRng::seed_from_u64(7);
        let avg = Duration::from_secs(5);
        for _ in 0..1000 {
            let d = next_rtcp_interval(avg, Duration::from_secs(1), &mut rng);
            assert!(d >= Duration::from_millis(2500) && d <= Duration::from_millis(7500));
        }
    }

    #[test]
    fn floor_applies_before_randomization() {
        let mut rng = StdRng::seed_from_u64(1);
        let d = next_rtcp_interval(Duration::from_millis(100), Duration::from_secs(4), &mut rng);
        assert!(d >= Duration::from_secs(2));
    }
}
