use chrono::{DateTime, Utc};

/// Format an XRP amount: up to 6 decimal places with trailing zeros
/// stripped, keeping at least one decimal digit.
pub fn format_xrp(amount: f64) -> String {
    let s = format!("{:.6}", amount);
    let trimmed = s.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Format a USD value with two decimals and a dollar sign.
pub fn format_usd(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${:.2}", amount)
    }
}

/// Shorten a transaction hash or address for table output: first and last
/// few characters around an ellipsis.
pub fn short_id(id: &str) -> String {
    if id.len() <= 12 {
        id.to_string()
    } else {
        format!("{}..{}", &id[..6], &id[id.len() - 4..])
    }
}

/// Render a timestamp as a compact local-free date.
pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate a string for a fixed-width column, adding an ellipsis.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_xrp() {
        assert_eq!(format_xrp(25.0), "25.0");
        assert_eq!(format_xrp(0.000012), "0.000012");
        assert_eq!(format_xrp(1250.5), "1250.5");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(812.82), "$812.82");
        assert_eq!(format_usd(1.0), "$1.00");
        assert_eq!(format_usd(-45.5), "-$45.50");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("A3F1"), "A3F1");
        assert_eq!(
            short_id("rDNvpqSzJzk8Qx2oCYbjxbKaAaVkEK2Qwz"),
            "rDNvpq..2Qwz"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Cold storage", 20), "Cold storage");
        assert_eq!(truncate("Cold storage wallet", 12), "Cold stor...");
    }
}
