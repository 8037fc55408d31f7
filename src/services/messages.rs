// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Operator message log.
//!
//! Chronological record of everything a migration wants the operator to see.
//! Each entry is also emitted as a tracing event. The process-wide log keeps
//! the newest [`MAX_ENTRIES`]; each migration writes to a scoped child log
//! whose entries are returned with that migration's report.

use crate::time_utils::format_utc_rfc3339;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Entries kept by a log before the oldest are dropped.
pub const MAX_ENTRIES: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogEntry {
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub level: MessageLevel,
    pub message: String,
}

/// Shared handle to a message log; clones append to the same log.
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
    /// Log that also receives every entry of this one.
    parent: Option<Box<MessageLog>>,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(MAX_ENTRIES)
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log that keeps at most `capacity` entries, dropping the oldest.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
            parent: None,
        }
    }

    /// Fresh log for one migration. Its entries are also appended here.
    pub fn scoped(&self) -> MessageLog {
        MessageLog {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            capacity: self.capacity,
            parent: Some(Box::new(self.clone())),
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(MessageLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(MessageLevel::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(MessageLevel::Error, message.into());
    }

    /// Snapshot of the retained entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, level: MessageLevel, message: String) {
        match level {
            MessageLevel::Info => tracing::info!(operator_message = %message, "Migration message"),
            MessageLevel::Warn => tracing::warn!(operator_message = %message, "Migration message"),
            MessageLevel::Error => tracing::error!(operator_message = %message, "Migration message"),
        }

        self.append(LogEntry {
            timestamp: format_utc_rfc3339(chrono::Utc::now()),
            level,
            message,
        });
    }

    fn append(&self, entry: LogEntry) {
        if let Some(parent) = &self.parent {
            parent.append(entry.clone());
        }
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        // A panic while holding the lock cannot leave a deque half-pushed.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_chronological() {
        let log = MessageLog::new();
        log.info("Fetched 3 features");
        log.warn("Feature 2 has no climate action");
        log.error("Diagram 3 update failed");

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].level, MessageLevel::Info);
        assert_eq!(entries[1].level, MessageLevel::Warn);
        assert_eq!(entries[2].level, MessageLevel::Error);
        assert_eq!(entries[2].message, "Diagram 3 update failed");
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_clones_share_the_log() {
        let log = MessageLog::new();
        let handle = log.clone();
        handle.warn("from a clone");

        assert_eq!(log.len(), 1);
        assert!(!log.is_empty());
    }

    #[test]
    fn test_oldest_entries_are_dropped_at_capacity() {
        let log = MessageLog::with_capacity(3);
        for i in 0..5 {
            log.info(format!("message {}", i));
        }

        let messages: Vec<_> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["message 2", "message 3", "message 4"]);
    }

    #[test]
    fn test_scoped_logs_are_separate_but_forward() {
        let log = MessageLog::new();
        let first = log.scoped();
        let second = log.scoped();

        first.warn("first migration");
        second.error("second migration");

        assert_eq!(first.entries().len(), 1);
        assert_eq!(first.entries()[0].message, "first migration");
        assert_eq!(second.entries().len(), 1);
        assert_eq!(second.entries()[0].message, "second migration");

        let all: Vec<_> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(all, vec!["first migration", "second migration"]);
    }

    #[test]
    fn test_entry_serialization() {
        let log = MessageLog::new();
        log.warn("careful");

        let json = serde_json::to_value(log.entries()).unwrap();
        assert_eq!(json[0]["level"], "warn");
        assert_eq!(json[0]["message"], "careful");
        assert!(json[0]["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
