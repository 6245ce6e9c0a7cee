//! Core data models for Pitwall
//!
//! This module contains the domain types for race sessions and the mapping from the
//! OpenF1 wire format into them.

pub mod openf1;

pub use openf1::{ApiError, ApiSession, OpenF1Client, SessionSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning an API record into a domain `Session`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    /// A timestamp field was missing or not RFC 3339
    #[error("Invalid {field} '{value}': expected an RFC 3339 timestamp")]
    InvalidDate { field: &'static str, value: String },
}

/// Where a session sits relative to a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Future,
    Live,
    Finished,
}

impl SessionState {
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Future => "Future",
            SessionState::Live => "Live",
            SessionState::Finished => "Finished",
        }
    }
}

/// A single session of a race weekend (practice, qualifying, sprint, race)
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_key: u32,
    /// e.g. "Practice 1", "Sprint", "Race"
    pub session_name: String,
    pub date_start: DateTime<Utc>,
    /// Absent when the API has not published an end time
    pub date_end: Option<DateTime<Utc>>,
    pub location: String,
    pub country_name: String,
    pub circuit_name: String,
    pub meeting_key: u32,
    pub year: i32,
    /// State at the moment this value was produced
    pub state: SessionState,
}

impl Session {
    /// Maps an API record into a `Session`, deriving its state against `now`
    ///
    /// # Returns
    /// * `Err(MappingError::InvalidDate)` if `date_start` is unparseable, or if
    ///   `date_end` is present but unparseable
    pub fn from_api(raw: &ApiSession, now: DateTime<Utc>) -> Result<Self, MappingError> {
        let date_start = parse_date("date_start", &raw.date_start)?;
        let date_end = match raw.date_end.as_deref() {
            None | Some("") => None,
            Some(value) => Some(parse_date("date_end", value)?),
        };

        let mut session = Session {
            session_key: raw.session_key,
            session_name: raw.session_name.clone(),
            date_start,
            date_end,
            location: raw.location.clone(),
            country_name: raw.country_name.clone(),
            circuit_name: raw.circuit_short_name.clone(),
            meeting_key: raw.meeting_key,
            year: raw.year,
            state: SessionState::Future,
        };
        session.state = session.state_at(now);
        Ok(session)
    }

    /// Classifies the session relative to `now`
    ///
    /// Future before the start, Live from the start until the end (or indefinitely
    /// when no end is known), Finished from the end onwards.
    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if now < self.date_start {
            return SessionState::Future;
        }
        match self.date_end {
            Some(end) if now >= end => SessionState::Finished,
            _ => SessionState::Live,
        }
    }
}

/// Maps every record, failing on the first malformed one
pub fn map_sessions(raw: &[ApiSession], now: DateTime<Utc>) -> Result<Vec<Session>, MappingError> {
    raw.iter().map(|s| Session::from_api(s, now)).collect()
}

/// Parses an RFC 3339 timestamp (any offset) into UTC
pub fn parse_date(field: &'static str, value: &str) -> Result<DateTime<Utc>, MappingError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| MappingError::InvalidDate {
            field,
            value: value.to_string(),
        })
}
