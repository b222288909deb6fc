use serde_json::Value;
use std::num::NonZeroUsize;

use crate::logic::observer::{ConversionObserver, ProgressEvent};
use crate::model::{
    ConversionMode, ConversionResult, ReferenceGroup, BYTES_SAVED_PER_REFERENCE, WEAK_FIELD,
};
use crate::store::traits::{DocumentStore, Patch};

/// Build the patch that converts every occurrence in `group`.
///
/// Strong to weak sets `<path>._weak = true`. Weak to strong unsets `<path>._weak`, so
/// the marker is absent afterwards rather than `false`.
pub fn build_patch(group: &ReferenceGroup, mode: ConversionMode) -> Patch {
    group
        .occurrences
        .iter()
        .fold(Patch::new(group.document_id()), |patch, occurrence| {
            let marker = occurrence.path.key(WEAK_FIELD);
            match mode {
                ConversionMode::StrongToWeak => patch.set(marker, Value::Bool(true)),
                ConversionMode::WeakToStrong => patch.unset(marker),
            }
        })
}

/// Estimated bytes saved by converting `references` occurrences in the given direction
pub fn estimated_savings(mode: ConversionMode, references: usize) -> u64 {
    match mode {
        ConversionMode::StrongToWeak => references as u64 * BYTES_SAVED_PER_REFERENCE,
        ConversionMode::WeakToStrong => 0,
    }
}

/// Applies conversions group by group in fixed-size batches.
///
/// Mutations are issued one at a time; a failing document is recorded in the result
/// and never stops the run.
pub struct ConversionPipeline<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    observer: &'a dyn ConversionObserver,
}

impl<'a, S: DocumentStore + ?Sized> ConversionPipeline<'a, S> {
    pub fn new(store: &'a S, observer: &'a dyn ConversionObserver) -> Self {
        Self { store, observer }
    }

    pub async fn run(
        &self,
        groups: &[ReferenceGroup],
        mode: ConversionMode,
        batch_size: NonZeroUsize,
        dry_run: bool,
    ) -> ConversionResult {
        let mut result = ConversionResult::new(dry_run);
        let total = groups.len();
        let batches = total.div_ceil(batch_size.get());
        let mut processed = 0;

        log::info!(
            "Converting {} document(s) ({}) in {} batch(es) of up to {}{}",
            total,
            mode,
            batches,
            batch_size,
            if dry_run { " [dry run]" } else { "" }
        );

        for (index, batch) in groups.chunks(batch_size.get()).enumerate() {
            for group in batch {
                self.convert_group(group, mode, dry_run, &mut result).await;
                processed += 1;
            }

            self.observer.on_progress(&ProgressEvent::BatchCompleted {
                batch: index + 1,
                batches,
                processed,
                total,
            });
        }

        result.finish();
        self.observer.on_complete(&result);
        result
    }

    async fn convert_group(
        &self,
        group: &ReferenceGroup,
        mode: ConversionMode,
        dry_run: bool,
        result: &mut ConversionResult,
    ) {
        let references = group.occurrences.len();

        let Some(document_id) = group.document.id() else {
            result.record_failure("<unknown>", "document has no _id");
            return;
        };

        if dry_run {
            result.record_success(estimated_savings(mode, references));
            self.observer.on_progress(&ProgressEvent::WouldConvert {
                document_id: document_id.to_string(),
                references,
            });
            return;
        }

        match self.store.commit(build_patch(group, mode)).await {
            Ok(()) => {
                result.record_success(estimated_savings(mode, references));
                self.observer.on_progress(&ProgressEvent::Converted {
                    document_id: document_id.to_string(),
                    references,
                });
            }
            Err(e) => {
                let detail = format!("{:#}", e);
                result.record_failure(document_id, &detail);
                self.observer.on_progress(&ProgressEvent::Failed {
                    document_id: document_id.to_string(),
                    error: detail,
                });
            }
        }
    }
}
