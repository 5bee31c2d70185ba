//! Wall-clock instrumentation. Nothing here affects search results.

use std::time::{Duration, Instant};

use log::info;

/// Formats a duration for logs: minutes and seconds past a minute, then
/// seconds, milliseconds or microseconds with three decimals.
pub fn human_time(d: Duration) -> String {
    let t = d.as_secs_f64();
    if t > 60.0 {
        let rest = Duration::new(d.as_secs() % 60, d.subsec_nanos());
        format!("{}m {:.3}s", d.as_secs() / 60, rest.as_secs_f64())
    } else if t > 0.1 {
        format!("{:.3}s", t)
    } else if t > 0.0001 {
        format!("{:.3}ms", t * 1e3)
    } else {
        format!("{:.3}us", t * 1e6)
    }
}

/// Runs `f`, logging `name` with how long it took.
pub fn timed<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    info!("{} {}", name, human_time(start.elapsed()));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_unit_by_magnitude() {
        assert_eq!(human_time(Duration::from_micros(50)), "50.000us");
        assert_eq!(human_time(Duration::from_millis(5)), "5.000ms");
        assert_eq!(human_time(Duration::from_millis(500)), "0.500s");
        assert_eq!(human_time(Duration::from_millis(61_500)), "1m 1.500s");
        assert_eq!(human_time(Duration::from_millis(120_050)), "2m 0.050s");
    }

    #[test]
    fn timed_returns_the_result() {
        assert_eq!(timed("answer", || 42), 42);
    }
}
