//! Typed views over backend responses.
//!
//! Spreadsheet cells arrive as numbers, numeric strings, empty strings or
//! nulls depending on how the sheet was edited. The deserializers here accept
//! all of them; anything unparseable reads as zero or empty.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A row of the `users` operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub rep: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    /// Columns this server does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Parse the `users` response, which must be a JSON array.
    pub fn list_from(value: &Value) -> Result<Vec<Self>, String> {
        let Value::Array(rows) = value else {
            return Err(format!("expected an array of users, got {}", kind(value)));
        };
        rows.iter()
            .filter(|row| row.is_object())
            .map(|row| Self::deserialize(row).map_err(|e| e.to_string()))
            .collect()
    }

    /// The row's email, trimmed and lowercased.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// One transaction inside a monthly breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    #[serde(deserialize_with = "lenient_string")]
    pub client: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub lead_id: String,
    #[serde(deserialize_with = "lenient_number")]
    pub amount: f64,
}

/// Totals for one month of achieved deals or refunds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyBreakdown {
    #[serde(deserialize_with = "lenient_string")]
    pub month: String,
    #[serde(deserialize_with = "lenient_number")]
    pub total: f64,
    /// Deal count, on achieved breakdowns.
    #[serde(deserialize_with = "lenient_number")]
    pub deals: f64,
    /// Refund count, on refund breakdowns.
    #[serde(deserialize_with = "lenient_number")]
    pub count: f64,
    #[serde(deserialize_with = "lenient_list")]
    pub transactions: Vec<Transaction>,
}

/// The `user` operation's record for one representative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepDetail {
    #[serde(deserialize_with = "lenient_string")]
    pub rep: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub level: String,

    #[serde(deserialize_with = "lenient_number")]
    pub target: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub achieved: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub remaining: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub refunds: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub points: f64,

    #[serde(rename = "incentiveTotal", deserialize_with = "lenient_number")]
    pub incentive_total: f64,
    #[serde(rename = "incentiveQuarterly", deserialize_with = "lenient_number")]
    pub incentive_quarterly: f64,
    #[serde(rename = "incentiveMonthly", deserialize_with = "lenient_number")]
    pub incentive_monthly: f64,

    #[serde(deserialize_with = "lenient_number")]
    pub demos: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub closures: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub avg_response_time_min: f64,

    /// `"date | text"` strings, newest first.
    #[serde(deserialize_with = "lenient_list")]
    pub rewards: Vec<String>,
    #[serde(deserialize_with = "lenient_optional_string")]
    pub last_computed_at: Option<String>,

    #[serde(rename = "totalArchive", deserialize_with = "lenient_number")]
    pub total_achieved: f64,
    #[serde(rename = "totalDeals", deserialize_with = "lenient_number")]
    pub total_deals: f64,
    #[serde(rename = "totalRefunds", deserialize_with = "lenient_number")]
    pub total_refunds: f64,
    #[serde(rename = "totalCases", deserialize_with = "lenient_number")]
    pub total_cases: f64,
    #[serde(deserialize_with = "lenient_list")]
    pub breakdown: Vec<MonthlyBreakdown>,

    /// Columns this server does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RepDetail {
    /// Parse the `user` response: an array whose first element is the
    /// record, or a bare object. An empty array yields `None`.
    pub fn from_response(value: &Value) -> Result<Option<Self>, String> {
        let record = match value {
            Value::Array(items) => match items.first() {
                Some(first) => first,
                None => return Ok(None),
            },
            Value::Object(_) => value,
            other => return Err(format!("expected a user record, got {}", kind(other))),
        };
        Self::deserialize(record)
            .map(Some)
            .map_err(|e| e.to_string())
    }

    /// Rewards split into `(date, text, points)`.
    pub fn parsed_rewards(&self) -> impl Iterator<Item = Reward<'_>> {
        self.rewards.iter().map(|raw| Reward::parse(raw))
    }
}

/// One entry of [`RepDetail::rewards`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward<'a> {
    pub date: &'a str,
    pub text: &'a str,
    /// Leading token of `text`, conventionally a signed point count.
    pub points: &'a str,
}

impl<'a> Reward<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let (date, text) = raw.split_once(" | ").unwrap_or(("", raw));
        let points = text.split(' ').next().unwrap_or_default();
        Self { date, text, points }
    }
}

/// A row of the `leaderboard` operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub rep_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub level: String,
    #[serde(deserialize_with = "lenient_number")]
    pub points_total: f64,
}

impl LeaderboardEntry {
    /// Parse the `leaderboard` response, sorted by points, highest first.
    pub fn list_from(value: &Value) -> Result<Vec<Self>, String> {
        let Value::Array(rows) = value else {
            return Err(format!("expected a leaderboard array, got {}", kind(value)));
        };
        let mut entries = rows
            .iter()
            .map(|row| Self::deserialize(row).map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by(|a, b| b.points_total.total_cmp(&a.points_total));
        Ok(entries)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse a cell such as `12000`, `"12,000"` or `"₹12,000"`.
pub fn number_from(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
                .collect();
            cleaned.parse().unwrap_or(0.0)
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let number = number_from(&value);
    Ok(if number.is_finite() { number } else { 0.0 })
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    lenient_optional_string(deserializer).map(Option::unwrap_or_default)
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}
