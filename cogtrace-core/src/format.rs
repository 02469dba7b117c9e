//! Formatting helpers shared across the text renderers.

/// Placeholder for a rate with no defined value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Activity bar: two cells per tool use, capped at 40.
pub fn activity_bar(tool_uses: usize) -> String {
    "█".repeat((tool_uses * 2).min(40))
}

/// Intensity bar scaled against the peak to at most 30 cells.
pub fn intensity_bar(score: u64, peak: u64) -> String {
    if peak == 0 {
        return String::new();
    }
    let cells = (score as f64 / peak as f64 * 30.0) as usize;
    "▓".repeat(cells.min(30))
}

/// Flow arrow whose shaft grows with the transition count, e.g. `══>`.
pub fn flow_arrow(count: usize) -> String {
    format!("{}>", "═".repeat(count))
}

/// Format a fraction in `[0, 1]` as a percentage, or `N/A` when undefined.
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}%", rate * 100.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Format a percentage that is already scaled to 0..=100.
pub fn format_percent(percent: Option<f64>) -> String {
    match percent {
        Some(p) => format!("{:.1}%", p),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Format a ratio with two decimals, or `N/A`.
pub fn format_ratio(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Format a millisecond duration (e.g. "1 hr 5 min", "42 seconds").
pub fn format_duration_ms(ms: i64) -> String {
    let secs = (ms / 1000).max(0);
    if secs == 0 {
        "<1 second".to_string()
    } else if secs == 1 {
        "1 second".to_string()
    } else if secs < 60 {
        format!("{} seconds", secs)
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        if remaining_secs > 0 {
            format!("{} min {} sec", mins, remaining_secs)
        } else if mins == 1 {
            "1 minute".to_string()
        } else {
            format!("{} minutes", mins)
        }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins > 0 {
            format!("{} hr {} min", hours, mins)
        } else if hours == 1 {
            "1 hour".to_string()
        } else {
            format!("{} hours", hours)
        }
    }
}

/// `hypothesis_formation` -> `Hypothesis Formation`.
pub fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
