//! Text rendering for command output
//!
//! All functions return strings so the binary only has to print them.

use chrono::{DateTime, Duration, Utc};

use crate::cache::CacheInfoEntry;
use crate::data::{Session, SessionState};

/// Formats a duration as `"{d}d {h}h {m}m"`, or `"{h}h {m}m"` under a day
///
/// Negative durations are formatted by magnitude.
pub fn format_duration(d: Duration) -> String {
    let total_minutes = d.num_minutes().abs();
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

/// Rounds a duration to the nearest whole minute, e.g. for "starts in" messages
pub fn round_to_minute(d: Duration) -> Duration {
    let seconds = d.num_seconds();
    let rounded = (seconds as f64 / 60.0).round() as i64;
    Duration::minutes(rounded)
}

/// Headline for a single session: `"Race - Spa-Francorchamps (Belgium)"`
pub fn session_headline(session: &Session) -> String {
    format!(
        "{} - {} ({})",
        session.session_name, session.circuit_name, session.country_name
    )
}

/// Status lines for a session relative to `now`
pub fn session_status(session: &Session, now: DateTime<Utc>) -> Vec<String> {
    let state = session.state_at(now);
    let mut lines = vec![format!("Status: {}", state.label())];

    match state {
        SessionState::Future => {
            lines.push(format!("Starts in: {}", format_duration(session.date_start - now)));
        }
        SessionState::Live => match session.date_end {
            Some(end) => lines.push(format!("Ends in: {}", format_duration(end - now))),
            None => lines.push("Ends: unknown".to_string()),
        },
        SessionState::Finished => {
            if let Some(end) = session.date_end {
                lines.push(format!("Ended: {} ago", format_duration(now - end)));
            }
        }
    }

    lines
}

/// Groups sessions by weekday abbreviation ("Fri", "Sat", ...) in chronological order
pub fn group_by_day(sessions: &[Session]) -> Vec<(String, Vec<&Session>)> {
    let mut ordered: Vec<&Session> = sessions.iter().collect();
    ordered.sort_by_key(|s| s.date_start);

    let mut groups: Vec<(String, Vec<&Session>)> = Vec::new();
    for session in ordered {
        let day = session.date_start.format("%a").to_string();
        match groups.last_mut() {
            Some((last_day, members)) if *last_day == day => members.push(session),
            _ => groups.push((day, vec![session])),
        }
    }
    groups
}

/// Renders a weekend schedule with a Grand Prix heading and one block per day
pub fn weekend_schedule(sessions: &[Session]) -> String {
    let Some(first) = sessions.first() else {
        return String::new();
    };

    let mut out = format!("{} Grand Prix - {}\n\n", first.country_name, first.circuit_name);
    for (day, members) in group_by_day(sessions) {
        out.push_str(&day);
        out.push('\n');
        for session in members {
            out.push_str(&format!(
                "\t{}\t{}\n",
                session.session_name,
                session.date_start.format("%H:%M")
            ));
        }
        out.push('\n');
    }
    out
}

/// Renders the `cache info` table
pub fn cache_info_table(entries: &[CacheInfoEntry], location: &str) -> String {
    let mut out = format!("Cache Location: {}\nTotal Entries:  {}\n", location, entries.len());
    if entries.is_empty() {
        return out;
    }

    out.push('\n');
    out.push_str(&format!("{:<30} {:<20} {:<10} {:<10}\n", "KEY", "CREATED AT", "STALE", "SIZE"));
    for entry in entries {
        let stale = if entry.is_expired { "YES" } else { "no" };
        out.push_str(&format!(
            "{:<30} {:<20} {:<10} {} B\n",
            entry.key,
            entry.created_at.format("%d %b %H:%M").to_string(),
            stale,
            entry.size
        ));
    }
    out
}
