//! HTML templates for the dashboard pages.
//!
//! Simple inline HTML templates without a template engine.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    auth::{AllowList, Session},
    backend::{LeaderboardEntry, MonthlyBreakdown, RepDetail},
    format::{
        current_cycle_id, format_currency, format_currency_with, format_date, format_date_time,
        format_points, initials, is_this_week, truncate_text,
    },
    guard::ErrorCode,
};

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 1000px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #333;
        border-bottom: 2px solid #0066cc;
        padding-bottom: 10px;
    }
    h2 {
        color: #555;
        margin-top: 30px;
    }
    nav a {
        margin-right: 16px;
        color: #0066cc;
        text-decoration: none;
    }
    nav a.active {
        font-weight: bold;
        border-bottom: 2px solid #0066cc;
    }
    .info-row {
        margin: 10px 0;
        padding: 8px;
        background: #f9f9f9;
        border-radius: 4px;
    }
    .label {
        font-weight: bold;
        color: #666;
        display: inline-block;
        width: 200px;
    }
    .value {
        color: #0066cc;
    }
    .muted {
        color: #666;
        font-style: italic;
    }
    button {
        background: #0066cc;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    .logout-btn {
        background: #999;
        float: right;
    }
    table {
        width: 100%;
        border-collapse: collapse;
        margin: 20px 0;
    }
    th, td {
        text-align: left;
        padding: 12px;
        border-bottom: 1px solid #ddd;
    }
    th {
        background: #f0f0f0;
        font-weight: bold;
        color: #333;
    }
    tr.current {
        background: #eef5ff;
    }
    .error {
        color: #d9534f;
        background: #f2dede;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .level {
        padding: 2px 8px;
        border-radius: 10px;
        font-size: 12px;
        background: #eee;
    }
    .level-Hunter { background: #dbeafe; }
    .level-Striker { background: #ede9fe; }
    .level-Slayer { background: #fef9c3; }
"#;

/// Pages reachable from the navigation bar.
const NAV_ITEMS: &[(&str, &str)] = &[
    ("/dashboard", "Dashboard"),
    ("/leaderboard", "Leaderboard"),
    ("/rules", "Rules"),
    ("/achieved-logs", "Achieved"),
    ("/refund-logs", "Refunds"),
];

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Squad - {title}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// A page with the navigation bar and sign-out button.
fn signed_in_page(title: &str, active: &str, session: &Session, body: &str) -> String {
    let nav: String = NAV_ITEMS
        .iter()
        .map(|(href, label)| {
            let class = if *href == active { r#" class="active""# } else { "" };
            format!(r#"<a href="{href}"{class}>{label}</a>"#)
        })
        .collect();

    page(
        title,
        &format!(
            r#"        <form method="POST" action="/api/auth/signout" style="display: inline;">
            <button type="submit" class="logout-btn">Sign out</button>
        </form>
        <nav>{nav}</nav>
        <p class="muted">Signed in as {email}</p>
        <h1>{title}</h1>
{body}"#,
            email = html_escape(&session.email),
            title = html_escape(title),
        ),
    )
}

fn info_row(label: &str, value: &str) -> String {
    format!(
        r#"<div class="info-row"><span class="label">{}</span><span class="value">{}</span></div>"#,
        html_escape(label),
        html_escape(value)
    )
}

/// Render the landing page
pub fn home_page(allow_list: &AllowList) -> String {
    page(
        "Sign in",
        &format!(
            r#"        <h1>Squad Incentive Dashboard</h1>
        <p>Track your targets, points, level and incentives.</p>
        <p class="muted">Sign in with your Google Workspace account ({domains}) to continue.</p>"#,
            domains = html_escape(&domain_list(allow_list)),
        ),
    )
}

fn domain_list(allow_list: &AllowList) -> String {
    allow_list
        .domains()
        .iter()
        .map(|domain| format!("@{domain}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the authentication error page
pub fn auth_error_page(code: Option<ErrorCode>, allow_list: &AllowList) -> String {
    let (message, details) = match code {
        Some(ErrorCode::AccessDenied) => (
            "Access Denied".to_string(),
            format!(
                "Only {} email addresses are allowed to access this application.",
                domain_list(allow_list)
            ),
        ),
        Some(ErrorCode::Configuration) => (
            "Configuration Error".to_string(),
            "There's an issue with the authentication setup. Please contact support.".to_string(),
        ),
        None => (
            "An error occurred during authentication.".to_string(),
            "Please try again or contact support if the issue persists.".to_string(),
        ),
    };

    page(
        "Authentication Error",
        &format!(
            r#"        <h1>{message}</h1>
        <div class="error">{details}</div>
        <p><a href="/">Back to sign in</a></p>"#,
            message = html_escape(&message),
            details = html_escape(&details),
        ),
    )
}

/// Render the page shown when the backend could not be reached
pub fn upstream_error_page(retry_path: &str, reason: &str) -> String {
    page(
        "Unavailable",
        &format!(
            r#"        <h1>Data temporarily unavailable</h1>
        <div class="error">{reason}</div>
        <p><a href="{retry}">Try again</a></p>"#,
            reason = html_escape(reason),
            retry = html_escape(retry_path),
        ),
    )
}

/// Render the not-found page
pub fn not_found_page(path: &str) -> String {
    page(
        "Not Found",
        &format!(
            r#"        <h1>Page not found</h1>
        <p class="muted">{}</p>
        <p><a href="/dashboard">Go to the dashboard</a></p>"#,
            html_escape(path)
        ),
    )
}

/// Render the representative dashboard
pub fn dashboard_page(session: &Session, detail: &RepDetail, now: DateTime<Utc>) -> String {
    let updated = detail
        .last_computed_at
        .as_deref()
        .map(format_date_time)
        .unwrap_or_else(|| "Never".to_string());

    let rewards = if detail.rewards.is_empty() {
        r#"<p class="muted">No rewards yet.</p>"#.to_string()
    } else {
        let rows: String = detail
            .parsed_rewards()
            .take(5)
            .map(|reward| {
                format!(
                    "<tr><td>{}{}</td><td>{}</td><td>{}</td></tr>",
                    html_escape(reward.text),
                    if is_this_week(reward.date, now) {
                        r#" <span class="level">New</span>"#
                    } else {
                        ""
                    },
                    html_escape(reward.date),
                    html_escape(reward.points)
                )
            })
            .collect();
        format!("<table><tr><th>Reward</th><th>Date</th><th>Points</th></tr>{rows}</table>")
    };

    let body = [
        format!(
            "<h2>Welcome back, {}!</h2>",
            html_escape(&detail.rep)
        ),
        info_row("Cycle", &current_cycle_id(now)),
        info_row("Last updated", &updated),
        "<h2>Target</h2>".to_string(),
        info_row("Target", &format_currency(detail.target)),
        info_row("Achieved", &format_currency(detail.achieved)),
        info_row("Remaining", &format_currency(detail.remaining)),
        info_row("Refunds", &format_currency(detail.refunds)),
        "<h2>Level</h2>".to_string(),
        info_row("Level", &detail.level),
        info_row("Points", &format_points(detail.points)),
        "<h2>Incentives</h2>".to_string(),
        info_row("Total", &format_currency(detail.incentive_total)),
        info_row("Quarterly", &format_currency(detail.incentive_quarterly)),
        info_row("Monthly", &format_currency(detail.incentive_monthly)),
        "<h2>Activity</h2>".to_string(),
        info_row("Demos", &format_points(detail.demos)),
        info_row("Closures", &format_points(detail.closures)),
        info_row(
            "Average response",
            &format!("{}m", format_points(detail.avg_response_time_min)),
        ),
        "<h2>Recent Rewards</h2>".to_string(),
        rewards,
    ]
    .join("\n");

    signed_in_page("Dashboard", "/dashboard", session, &body)
}

/// Render the leaderboard, optionally filtered by name
pub fn leaderboard_page(
    session: &Session,
    entries: &[LeaderboardEntry],
    rep_name: Option<&str>,
    query: Option<&str>,
) -> String {
    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
    let rows: String = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| needle.is_empty() || entry.rep_name.to_lowercase().contains(&needle))
        .map(|(index, entry)| {
            let is_current = rep_name.is_some_and(|rep| rep.eq_ignore_ascii_case(&entry.rep_name));
            format!(
                r#"<tr{current}><td>#{rank}</td><td><span class="code">{initials}</span> <span title="{full}">{name}</span></td><td><span class="level level-{level}">{level}</span></td><td>{points}</td></tr>"#,
                current = if is_current { r#" class="current""# } else { "" },
                rank = index + 1,
                initials = html_escape(&initials(&entry.rep_name)),
                full = html_escape(&entry.rep_name),
                name = html_escape(&truncate_text(&entry.rep_name, 20)),
                level = html_escape(&entry.level),
                points = format_points(entry.points_total),
            )
        })
        .collect();

    let table = if rows.is_empty() {
        r#"<p class="muted">No representatives found.</p>"#.to_string()
    } else {
        format!(
            "<table><tr><th>Rank</th><th>Name</th><th>Level</th><th>Points</th></tr>{rows}</table>"
        )
    };

    let body = format!(
        r#"<form method="GET" action="/leaderboard">
            <input type="text" name="q" value="{query}" placeholder="Search representatives">
            <button type="submit">Search</button>
        </form>
        <p><a href="/leaderboard?refresh=1">Refresh</a></p>
        {count}
        {table}"#,
        query = html_escape(query.unwrap_or_default()),
        count = info_row("Representatives", &entries.len().to_string()),
    );

    signed_in_page("Leaderboard", "/leaderboard", session, &body)
}

/// Render the rules document as nested lists
pub fn rules_page(session: &Session, rules: &Value) -> String {
    signed_in_page("Rules", "/rules", session, &render_value(rules))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Object(map) if map.is_empty() => String::new(),
        Value::Object(map) => {
            let items: String = map
                .iter()
                .map(|(key, value)| match value {
                    Value::Object(_) | Value::Array(_) => format!(
                        "<li><strong>{}</strong>{}</li>",
                        html_escape(&humanize(key)),
                        render_value(value)
                    ),
                    scalar => format!(
                        "<li><strong>{}:</strong> {}</li>",
                        html_escape(&humanize(key)),
                        html_escape(&scalar_text(scalar))
                    ),
                })
                .collect();
            format!("<ul>{items}</ul>")
        }
        Value::Array(items) => {
            let items: String = items
                .iter()
                .map(|item| match item {
                    Value::Object(_) | Value::Array(_) => format!("<li>{}</li>", render_value(item)),
                    scalar => format!("<li>{}</li>", html_escape(&scalar_text(scalar))),
                })
                .collect();
            format!("<ul>{items}</ul>")
        }
        scalar => format!("<p>{}</p>", html_escape(&scalar_text(scalar))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `incentiveTotal` and `points_total` become `Incentive total`, `Points total`.
fn humanize(key: &str) -> String {
    let mut words = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c == '_' || c == '-' {
            words.push(' ');
        } else if c.is_uppercase() && i > 0 {
            words.push(' ');
            words.extend(c.to_lowercase());
        } else if i == 0 {
            words.extend(c.to_uppercase());
        } else {
            words.push(c);
        }
    }
    words
}

fn breakdown_section(months: &[MonthlyBreakdown], count_label: &str, refunds: bool) -> String {
    if months.is_empty() {
        return r#"<p class="muted">No records yet.</p>"#.to_string();
    }

    months
        .iter()
        .map(|month| {
            let count = if refunds { month.count } else { month.deals };
            let transactions: String = month
                .transactions
                .iter()
                .map(|tx| {
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        html_escape(&tx.client),
                        html_escape(&format_date(&tx.date)),
                        html_escape(&tx.lead_id),
                        format_currency_with(tx.amount, true)
                    )
                })
                .collect();
            let details = if transactions.is_empty() {
                String::new()
            } else {
                format!(
                    "<details><summary>View details</summary><table><tr><th>Client</th><th>Date</th><th>Lead</th><th>Amount</th></tr>{transactions}</table></details>"
                )
            };
            format!(
                "<h2>{}</h2>{}{}{}",
                html_escape(&month.month),
                info_row("Amount", &format_currency(month.total)),
                info_row(count_label, &format_points(count)),
                details
            )
        })
        .collect()
}

/// Render the achieved-deals log
pub fn achieved_logs_page(session: &Session, detail: &RepDetail) -> String {
    let body = format!(
        "{}{}{}",
        info_row("Total achieved", &format_currency(detail.total_achieved)),
        info_row("Total deals", &format_points(detail.total_deals)),
        breakdown_section(&detail.breakdown, "Deals", false)
    );
    signed_in_page("Achieved Logs", "/achieved-logs", session, &body)
}

/// Render the refund log
pub fn refund_logs_page(session: &Session, detail: &RepDetail) -> String {
    let body = format!(
        "{}{}{}",
        info_row("Total refunds", &format_currency(detail.total_refunds)),
        info_row("Refund cases", &format_points(detail.total_cases)),
        breakdown_section(&detail.breakdown, "Refunds", true)
    );
    signed_in_page("Refund Logs", "/refund-logs", session, &body)
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
