//! Outcome reporting
//!
//! Every call to `MediationEngine::handle_event` produces one [`OutcomeRecord`]
//! that is handed to each registered [`TelemetrySink`]. Sinks cannot fail:
//! they log their own errors and move on, so a broken sink never reaches the
//! engine's caller.

pub mod journal;
pub mod privacy;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::mediation::{MediationOutcome, UiStateChangeEvent};

pub use journal::OutcomeJournal;
pub use privacy::{PrivacyLevel, PrivacyShield};

/// One handled event as seen by telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source_package: String,
    /// Outcome with node text masked according to the privacy level
    pub outcome: MediationOutcome,
    pub elapsed_us: u64,
}

impl OutcomeRecord {
    pub fn new(source_package: String, outcome: MediationOutcome, elapsed: Duration) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            source_package,
            outcome,
            elapsed_us: elapsed.as_micros().min(u64::MAX as u128) as u64,
        }
    }
}

pub trait TelemetrySink: Send + Sync {
    fn record(&self, record: &OutcomeRecord);
}

/// Fan-out of outcome records to a set of sinks
#[derive(Clone)]
pub struct Telemetry {
    shield: PrivacyShield,
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new().with_sink(Arc::new(TracingSink))
    }
}

impl Telemetry {
    /// Telemetry with no sinks and verbatim text
    pub fn new() -> Self {
        Self {
            shield: PrivacyShield::default(),
            sinks: Vec::new(),
        }
    }

    pub fn with_privacy(mut self, level: PrivacyLevel) -> Self {
        self.shield = PrivacyShield::new(level);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn privacy_level(&self) -> PrivacyLevel {
        self.shield.level()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn record(&self, event: &UiStateChangeEvent, outcome: &MediationOutcome, elapsed: Duration) {
        if self.sinks.is_empty() {
            return;
        }

        let masked = match outcome {
            MediationOutcome::Acted(text) => MediationOutcome::Acted(self.shield.mask(text)),
            other => other.clone(),
        };
        let record = OutcomeRecord::new(event.source_package.clone(), masked, elapsed);

        for sink in &self.sinks {
            if panic::catch_unwind(AssertUnwindSafe(|| sink.record(&record))).is_err() {
                tracing::error!(record_id = %record.id, "Telemetry sink panicked; record dropped for that sink");
            }
        }
    }
}

/// Writes each record as a structured `tracing` event
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, record: &OutcomeRecord) {
        let kind = record.outcome.kind().as_str();
        let package = record.source_package.as_str();
        match &record.outcome {
            MediationOutcome::Acted(text) => {
                tracing::info!(kind, package, text = %text, elapsed_us = record.elapsed_us, "Click mediated");
            }
            MediationOutcome::NotFound => {
                tracing::warn!(kind, package, "No matching element on the current screen");
            }
            MediationOutcome::ActionFailed => {
                tracing::error!(kind, package, "Platform rejected the click");
            }
            MediationOutcome::ActionError(message) => {
                tracing::error!(kind, package, error = %message, "Click dispatch failed");
            }
            MediationOutcome::NoClickableMatch => {
                tracing::debug!(kind, package, "Matches found but none clickable");
            }
            MediationOutcome::Skipped(reason) => {
                tracing::trace!(kind, package, reason = %reason, "Event skipped");
            }
        }
    }
}

/// Keeps the most recent records in memory
pub struct MemorySink {
    capacity: usize,
    records: Mutex<VecDeque<OutcomeRecord>>,
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    /// Records currently held, oldest first
    pub fn records(&self) -> Vec<OutcomeRecord> {
        match self.records.lock() {
            Ok(records) => records.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, record: &OutcomeRecord) {
        let mut records = match self.records.lock() {
            Ok(records) => records,
            Err(poisoned) => poisoned.into_inner(),
        };
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
    }
}

/// Publishes records to live subscribers
pub struct BroadcastSink {
    sender: broadcast::Sender<OutcomeRecord>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutcomeRecord> {
        self.sender.subscribe()
    }
}

impl TelemetrySink for BroadcastSink {
    fn record(&self, record: &OutcomeRecord) {
        // No subscribers is not an error
        let _ = self.sender.send(record.clone());
    }
}
