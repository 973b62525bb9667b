//! Victim-report domain types.
//!
//! A `Report` is a single caller's statement of who needs help and where,
//! filed by the voice frontend. Reports are keyed by the call identifier so
//! a retried webhook for the same call updates the existing report instead
//! of duplicating it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Triage state of a report as responders work it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Filed, nobody has looked at it yet
    #[default]
    Received,
    /// A responder has seen it
    Acknowledged,
    /// Help was dispatched
    Actioned,
}

/// An emergency report filed by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Unique ID, assigned by the store on insert when left empty
    pub id: String,

    /// Call identifier from the voice platform — the idempotency key
    pub call_sid: String,

    /// Caller's phone number, when the platform provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_number: Option<String>,

    /// Free-text location description
    pub location: String,

    /// How many people need help
    pub people_count: u32,

    /// What is needed, in the caller's words
    pub need_description: String,

    /// Triage state
    #[serde(default)]
    pub status: ReportStatus,

    /// Whether the call was flagged as an immediate medical emergency
    #[serde(default)]
    pub is_urgent_medical: bool,

    /// When the report was filed or last updated
    pub timestamp: DateTime<Utc>,
}

impl Report {
    /// Create a new report pending insertion. The store assigns the ID.
    pub fn new(
        call_sid: impl Into<String>,
        location: impl Into<String>,
        people_count: u32,
        need_description: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            call_sid: call_sid.into(),
            caller_number: None,
            location: location.into(),
            people_count,
            need_description: need_description.into(),
            status: ReportStatus::Received,
            is_urgent_medical: false,
            timestamp: Utc::now(),
        }
    }

    /// Set the caller's phone number.
    pub fn with_caller_number(mut self, number: impl Into<String>) -> Self {
        self.caller_number = Some(number.into());
        self
    }

    /// Flag the report as an immediate medical emergency.
    pub fn with_urgent_medical(mut self, urgent: bool) -> Self {
        self.is_urgent_medical = urgent;
        self
    }

    /// Assign a fresh UUID if the ID is empty. Returns the final ID.
    pub fn ensure_id(&mut self) -> String {
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
        self.id.clone()
    }
}
