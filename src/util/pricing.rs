//! Money arithmetic shared by quotes, trackings and reports.

/// Rounds to cents.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Price billed to the client for a purchase of `cost` with a percentage markup.
pub fn calculate_charged_amount(cost: f64, markup_percent: f64) -> f64 {
    round2(cost * (1.0 + markup_percent / 100.0))
}

/// Percentage change from `previous` to `current`; 0 when there is no baseline.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    round2((current - previous) / previous * 100.0)
}

/// Share of quotes that left the quoting stage, in percent.
pub fn conversion_rate(total: u64, pending: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(total.saturating_sub(pending) as f64 / total as f64 * 100.0)
}
