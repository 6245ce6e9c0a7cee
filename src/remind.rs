//! Session reminder check

use chrono::{DateTime, Duration, Utc};

/// Default reminder window in minutes
pub const DEFAULT_THRESHOLD_MINUTES: u32 = 30;

/// Decides whether a session starting at `start` warrants a reminder at `now`
///
/// Triggers when the session is still ahead and starts within `threshold_minutes`,
/// i.e. the time until start lies in `(0, threshold]`.
///
/// # Returns
/// The decision together with the signed time until start.
pub fn should_remind(now: DateTime<Utc>, start: DateTime<Utc>, threshold_minutes: u32) -> (bool, Duration) {
    let diff = start - now;
    let threshold = Duration::minutes(i64::from(threshold_minutes));
    (diff > Duration::zero() && diff <= threshold, diff)
}
