//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, bail};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use regex::Regex;
use wt_core::UserId;
use wt_db::Database;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(second|minute|hour|day|week)s?\s+ago$").unwrap()
});

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a datetime string as either RFC 3339 or relative time, resolving
/// relative times against `now`.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Relative: "90 seconds ago", "2 hours ago", "1 day ago", "1 week ago"
pub fn parse_datetime_at(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if s == "now" {
        return Ok(now);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        bail!(
            "Invalid datetime: {s}. Use RFC 3339 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let duration = match &caps[2] {
        "second" if n <= MAX_RELATIVE_MINUTES * 60 => Duration::seconds(n),
        "minute" if n <= MAX_RELATIVE_MINUTES => Duration::minutes(n),
        "hour" if n <= MAX_RELATIVE_MINUTES / 60 => Duration::hours(n),
        "day" if n <= MAX_RELATIVE_MINUTES / (60 * 24) => Duration::days(n),
        "week" if n <= MAX_RELATIVE_MINUTES / (60 * 24 * 7) => Duration::weeks(n),
        unit => bail!("Relative time value too large: {n} {unit}"),
    };
    Ok(now - duration)
}

/// Resolves an optional `--at` argument, defaulting to `now`.
pub fn time_or_now(at: Option<&str>, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    at.map_or(Ok(now), |s| parse_datetime_at(s, now))
}

/// Looks up the acting user by email.
pub fn resolve_actor(db: &Database, email: Option<&str>) -> anyhow::Result<UserId> {
    let Some(email) = email else {
        bail!("no acting user: pass --as <email> or set `user` in the config file");
    };
    match db.find_user_by_email(email)? {
        Some(user) => Ok(user.id),
        None => bail!("unknown user: {email}"),
    }
}

/// Formats a timestamp for display, to the second.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats whole seconds as `Hh MMm SSs`.
pub fn format_seconds(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}h {minutes:02}m {secs:02}s")
}
