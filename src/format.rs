//! Human-readable formatting shared by the views and the CSV export.

/// Formats minutes as `"2h 5m"`, or just `"45m"` under an hour.
pub fn format_duration(minutes: f64) -> String {
    let minutes = if minutes.is_finite() { minutes.max(0.0) } else { 0.0 };
    let mut hours = (minutes / 60.0).floor() as u64;
    let mut mins = (minutes % 60.0).round() as u64;
    // 59.6 minutes past the hour rounds up into the next one.
    if mins == 60 {
        hours += 1;
        mins = 0;
    }
    if hours == 0 {
        format!("{mins}m")
    } else {
        format!("{hours}h {mins}m")
    }
}

/// Formats a whole euro amount with thousands separators, e.g. `"€12,500"`.
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-€{grouped}")
    } else {
        format!("€{grouped}")
    }
}

/// Formats a distance in whole kilometres with thousands separators.
pub fn format_distance(km: f64) -> String {
    let rounded = if km.is_finite() { km.round() as i64 } else { 0 };
    format_currency(rounded).replace('€', "") + " km"
}
