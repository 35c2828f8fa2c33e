//! Display formatting for dashboard values.
//!
//! Amounts are rupees with Indian digit grouping (`₹1,23,456`); dates are
//! shown in India Standard Time.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

/// UTC+05:30.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Group an unsigned digit string the Indian way: last three, then pairs.
///
/// ```
/// assert_eq!(squad::format::group_indian("1234567"), "12,34,567");
/// ```
pub fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

fn grouped(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    match rendered.split_once('.') {
        Some((whole, fraction)) => format!("{}.{fraction}", group_indian(whole)),
        None => group_indian(&rendered),
    }
}

/// Format rupees, rounded to whole rupees.
///
/// Non-finite input renders as `₹0`.
pub fn format_currency(amount: f64) -> String {
    format_currency_with(amount, false)
}

/// Format rupees, optionally with paise.
pub fn format_currency_with(amount: f64, show_decimals: bool) -> String {
    if !amount.is_finite() {
        return "₹0".to_string();
    }
    let decimals = if show_decimals { 2 } else { 0 };
    let body = grouped(amount, decimals);
    let is_zero = body.chars().all(|c| matches!(c, '0' | '.' | ','));
    if amount < 0.0 && !is_zero {
        format!("-₹{body}")
    } else {
        format!("₹{body}")
    }
}

/// Format a points total with Indian grouping and up to three decimals.
pub fn format_points(points: f64) -> String {
    if !points.is_finite() {
        return "0".to_string();
    }
    let body = grouped(points, 3);
    let body = body.trim_end_matches('0').trim_end_matches('.').to_string();
    if points < 0.0 && body != "0" {
        format!("-{body}")
    } else {
        body
    }
}

/// Cut `text` to `max_chars` characters, appending `...` when shortened.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

/// Up to two uppercase initials. Blank names give `??`.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if letters.is_empty() {
        "??".to_string()
    } else {
        letters
    }
}

/// Incentive cycle for `now`, such as `2025Q4`.
pub fn current_cycle_id(now: DateTime<Utc>) -> String {
    let local = now.with_timezone(&ist());
    let quarter = (local.month() - 1) / 3 + 1;
    format!("{}Q{quarter}", local.year())
}

/// Parse a backend timestamp. Naive values are taken as UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whether `input` falls in the current Monday-to-Sunday week, in IST.
pub fn is_this_week(input: &str, now: DateTime<Utc>) -> bool {
    let Some(when) = parse_timestamp(input) else {
        return false;
    };
    let today = now.with_timezone(&ist()).date_naive();
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let sunday = monday + Duration::days(6);
    let day = when.with_timezone(&ist()).date_naive();
    monday <= day && day <= sunday
}

/// `8 Oct 2025, 02:30 pm` in IST. Unparseable input is returned unchanged.
pub fn format_date_time(input: &str) -> String {
    match parse_timestamp(input) {
        Some(when) => when
            .with_timezone(&ist())
            .format("%-d %b %Y, %I:%M %P")
            .to_string(),
        None => input.to_string(),
    }
}

/// `8 Oct 2025` in IST. Unparseable input is returned unchanged.
pub fn format_date(input: &str) -> String {
    match parse_timestamp(input) {
        Some(when) => when.with_timezone(&ist()).format("%-d %b %Y").to_string(),
        None => input.to_string(),
    }
}
