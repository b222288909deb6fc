use crate::config::ConverterConfig;
use crate::error::ConverterError;
use crate::logic::{find_references, resolve_query};
use crate::model::{total_references, ReferenceGroup};
use crate::store::traits::DocumentStore;

/// Fetch the documents selected by `config` and keep those holding convertible references.
///
/// Issues exactly one query. Store order is preserved in the returned groups.
pub async fn scan_documents<S: DocumentStore + ?Sized>(
    store: &S,
    config: &ConverterConfig,
) -> Result<Vec<ReferenceGroup>, ConverterError> {
    config.validate()?;

    let query = resolve_query(config);
    log::info!("Scanning ({}) with query: {}", config.mode, query);

    let documents = store
        .fetch(&query)
        .await
        .map_err(|e| ConverterError::query(&e))?;
    let fetched = documents.len();

    let mut groups = Vec::new();
    for document in documents {
        let occurrences = find_references(document.as_value(), config.mode);
        if occurrences.is_empty() {
            continue;
        }
        if document.id().is_none() {
            log::warn!(
                "Skipping document without an _id ({} reference(s) found)",
                occurrences.len()
            );
            continue;
        }
        groups.extend(ReferenceGroup::new(document, occurrences));
    }

    log::info!(
        "Scanned {} document(s): {} with {} reference(s) to convert",
        fetched,
        groups.len(),
        total_references(&groups)
    );

    Ok(groups)
}
