//! Core types for FIR HRF retrieval
//!
//! This module provides the event schedule types:
//! - Events (onset, condition code, duration, label)
//! - Event tables with first-appearance condition discovery
//! - Parsing of the plain-text 4-column event format

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EventTableError, EventTableResult};

// ============================================================================
// Events
// ============================================================================

/// Integer code identifying an experimental condition
pub type ConditionCode = i64;

/// A single stimulus event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Onset time relative to the first acquisition (s)
    pub onset_s: f64,
    /// Condition the event belongs to
    pub code: ConditionCode,
    /// Event duration (s)
    pub duration_s: f64,
    /// Display label
    pub label: String,
}

impl Event {
    /// Create a new event
    #[must_use]
    pub fn new(onset_s: f64, code: ConditionCode, duration_s: f64, label: impl Into<String>) -> Self {
        Self {
            onset_s,
            code,
            duration_s,
            label: label.into(),
        }
    }
}

/// Identity of a condition discovered in an event table
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionInfo {
    /// Condition code
    pub code: ConditionCode,
    /// Label of the first event carrying this code
    pub label: String,
    /// Number of events with this code
    pub n_events: usize,
}

// ============================================================================
// Event Table
// ============================================================================

/// Ordered collection of events
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTable {
    events: Vec<Event>,
}

impl EventTable {
    /// Create a table from events in file order
    #[must_use]
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Parse the 4-column text format.
    ///
    /// Each non-empty line is `onset code duration label`, separated by
    /// whitespace, commas or semicolons. Lines whose first
    /// non-blank character is `#` are comments.
    ///
    /// # Errors
    ///
    /// Returns an [`EventTableError`] naming the 1-based line for rows with
    /// the wrong column count or unparsable numeric fields.
    pub fn parse(text: &str) -> EventTableResult<Self> {
        let mut events = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed
                .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
                .filter(|field| !field.is_empty())
                .collect();
            let [onset, code, duration, label] = fields.as_slice() else {
                return Err(EventTableError::ColumnCount {
                    line,
                    found: fields.len(),
                });
            };

            events.push(Event {
                onset_s: parse_seconds(onset, line, "onset")?,
                code: code.parse().map_err(|_| EventTableError::InvalidField {
                    line,
                    column: "code",
                    text: code.to_string(),
                })?,
                duration_s: parse_seconds(duration, line, "duration")?,
                label: label.to_string(),
            });
        }

        Ok(Self { events })
    }

    /// Check that every onset and duration is finite.
    ///
    /// Tables from [`EventTable::parse`] always pass; tables built in memory
    /// may not.
    ///
    /// # Errors
    ///
    /// Returns [`EventTableError::InvalidField`] for the first offending
    /// event, with `line` set to its 1-based position in the table.
    pub fn validate(&self) -> EventTableResult<()> {
        for (index, event) in self.events.iter().enumerate() {
            for (column, value) in [("onset", event.onset_s), ("duration", event.duration_s)] {
                if !value.is_finite() {
                    return Err(EventTableError::InvalidField {
                        line: index + 1,
                        column,
                        text: value.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// All events in file order
    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the table has no events
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Unique conditions in order of first appearance.
    ///
    /// Each condition takes the label of its first event.
    pub fn conditions(&self) -> Vec<ConditionInfo> {
        let mut conditions: Vec<ConditionInfo> = Vec::new();

        for event in &self.events {
            match conditions.iter_mut().find(|c| c.code == event.code) {
                Some(existing) => existing.n_events += 1,
                None => conditions.push(ConditionInfo {
                    code: event.code,
                    label: event.label.clone(),
                    n_events: 1,
                }),
            }
        }

        conditions
    }

    /// Onsets (s) of every event with the given code, in file order
    pub fn onsets_for(&self, code: ConditionCode) -> Vec<f64> {
        self.events
            .iter()
            .filter(|e| e.code == code)
            .map(|e| e.onset_s)
            .collect()
    }
}

impl FromStr for EventTable {
    type Err = EventTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromIterator<Event> for EventTable {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn parse_seconds(text: &str, line: usize, column: &'static str) -> EventTableResult<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EventTableError::InvalidField {
            line,
            column,
            text: text.to_string(),
        })
}

// ============================================================================
// Tests
// ============================================================================
