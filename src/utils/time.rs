use chrono::Duration;

/// Short human duration, `1h2m3s`, `2m3s` or `3s`.
pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}

/// Clock style duration, `HH:MM:SS`. Negative durations read as zero.
pub fn format_clock(v: Duration) -> String {
    let v = v.max(Duration::zero());
    format!(
        "{:02}:{:02}:{:02}",
        v.num_hours(),
        v.num_minutes() % 60,
        v.num_seconds() % 60
    )
}

/// Drops everything below a whole second.
pub fn truncate_to_seconds(v: Duration) -> Duration {
    Duration::seconds(v.num_seconds())
}
