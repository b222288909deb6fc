use serde::Serialize;
use std::fmt;

use crate::logic::format_bytes;
use crate::model::{ConversionResult, Id};

/// Advisory progress emitted while a conversion runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Dry run: the document matched but nothing was submitted
    WouldConvert { document_id: Id, references: usize },
    Converted { document_id: Id, references: usize },
    Failed { document_id: Id, error: String },
    BatchCompleted {
        batch: usize,
        batches: usize,
        processed: usize,
        total: usize,
    },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::WouldConvert {
                document_id,
                references,
            } => write!(
                f,
                "[dry run] would convert {} reference(s) in {}",
                references, document_id
            ),
            ProgressEvent::Converted {
                document_id,
                references,
            } => write!(f, "Converted {} reference(s) in {}", references, document_id),
            ProgressEvent::Failed { document_id, error } => {
                write!(f, "Failed to convert {}: {}", document_id, error)
            }
            ProgressEvent::BatchCompleted {
                batch,
                batches,
                processed,
                total,
            } => write!(
                f,
                "Batch {}/{} done, processed {}/{}",
                batch, batches, processed, total
            ),
        }
    }
}

/// Notification hooks for a converter. Hooks are informational only.
pub trait ConversionObserver: Send + Sync {
    fn on_progress(&self, _event: &ProgressEvent) {}
    fn on_complete(&self, _result: &ConversionResult) {}
    fn on_error(&self, _message: &str) {}
}

/// Ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}

/// Writes notifications to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ConversionObserver for LogObserver {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Failed { .. } => log::warn!("{}", event),
            ProgressEvent::BatchCompleted { .. } => log::info!("{}", event),
            _ => log::debug!("{}", event),
        }
    }

    fn on_complete(&self, result: &ConversionResult) {
        log::info!(
            "{}Converted {} document(s), {} error(s), estimated savings {}",
            if result.dry_run { "[dry run] " } else { "" },
            result.converted_count,
            result.errors.len(),
            format_bytes(result.space_saved_estimate_bytes)
        );
    }

    fn on_error(&self, message: &str) {
        log::error!("{}", message);
    }
}
