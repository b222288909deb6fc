use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::format_bytes;
use crate::model::Id;

/// Estimated size difference between a strong and a weak descriptor
pub const BYTES_SAVED_PER_REFERENCE: u64 = 20;

/// Outcome of one conversion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub converted_count: usize,
    pub errors: Vec<String>,
    pub space_saved_estimate_bytes: u64,
    /// Documents whose patch failed, in processing order
    #[serde(default)]
    pub failed_document_ids: Vec<Id>,
    #[serde(default)]
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ConversionResult {
    pub fn new(dry_run: bool) -> Self {
        Self {
            converted_count: 0,
            errors: Vec::new(),
            space_saved_estimate_bytes: 0,
            failed_document_ids: Vec::new(),
            dry_run,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn record_success(&mut self, saved_bytes: u64) {
        self.converted_count += 1;
        self.space_saved_estimate_bytes += saved_bytes;
    }

    pub fn record_failure(&mut self, document_id: &str, detail: &str) {
        self.errors
            .push(format!("Failed to convert {}: {}", document_id, detail));
        self.failed_document_ids.push(document_id.to_string());
    }

    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn failed_count(&self) -> usize {
        self.failed_document_ids.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn space_saved_display(&self) -> String {
        format_bytes(self.space_saved_estimate_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_successes_and_failures() {
        let mut result = ConversionResult::new(false);
        result.record_success(40);
        result.record_success(0);
        result.record_failure("doc-9", "timeout");
        result.finish();

        assert_eq!(result.converted_count, 2);
        assert_eq!(result.space_saved_estimate_bytes, 40);
        assert_eq!(result.errors, vec!["Failed to convert doc-9: timeout".to_string()]);
        assert_eq!(result.failed_document_ids, vec!["doc-9".to_string()]);
        assert_eq!(result.failed_count(), 1);
        assert!(result.completed_at.is_some());
        assert_eq!(result.space_saved_display(), "40.00 Bytes");
    }
}
