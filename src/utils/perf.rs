/// Runs `$block` and, when performance logging is on, warns if it took longer
/// than `$threshold_micros` (500 = 0.5ms). Evaluates to the block's value.
#[macro_export]
macro_rules! trace_time {
    ($name:expr, $threshold_micros:expr, $block:block) => {{
        if $crate::config::LOG_PERFORMANCE {
            let started = $crate::utils::AppInstant::now();
            let value = $block;
            let micros = started.elapsed().as_micros();
            if micros > $threshold_micros {
                log::warn!(
                    "🐢 SLOW [{}]: '{}' took {:.3}ms (limit {:.3}ms)",
                    if cfg!(debug_assertions) { "debug" } else { "release" },
                    $name,
                    micros as f64 / 1000.0,
                    $threshold_micros as f64 / 1000.0
                );
            }
            value
        } else {
            $block
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn yields_block_value() {
        let total = crate::trace_time!("sum", 0, { (1..=4).sum::<i32>() });
        assert_eq!(total, 10);
    }
}
